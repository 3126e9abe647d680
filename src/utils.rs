use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid edit for field {field}: {reason}")]
    InvalidEdit { field: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 初始化日志输出
///
/// `RUST_LOG` 优先；未设置时普通模式为 `info`，详细模式为 `debug`
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化（如测试中）时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
