/// 后端访问层 - trait 定义
use thiserror::Error;

/// 后端请求错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// 服务端返回非成功状态
    #[error("HTTP {code} {text}")]
    Status { code: u16, text: String },

    /// 网络或读取失败
    #[error("Connection failed: {0}")]
    Connection(String),
}

/// 作业后端 trait
///
/// # 职责
/// - 列出某个设置文件中可用的作业名称
/// - 获取某个作业的原始配置文本
/// - 不负责解析，仅负责 IO
///
/// # 实现示例
/// ```rust,ignore
/// struct StaticBackend;
/// impl JobBackend for StaticBackend {
///     fn fetch_names(&self, _settings_file: &str) -> Result<Vec<String>, BackendError> {
///         Ok(vec!["nightly".to_string()])
///     }
///     fn fetch_content(&self, _job: &str, _settings_file: &str) -> Result<String, BackendError> {
///         Ok("retries: 3".to_string())
///     }
/// }
/// ```
pub trait JobBackend {
    /// 获取候选作业名称
    ///
    /// # 参数
    /// * `settings_file` - 设置文件名（如 `data_load_settings.json`）
    fn fetch_names(&self, settings_file: &str) -> Result<Vec<String>, BackendError>;

    /// 获取作业的配置文本
    ///
    /// # 参数
    /// * `job_name` - 作业名称
    /// * `settings_file` - 设置文件名
    ///
    /// # 返回
    /// 返回原始文本；空内容由调用方判定为"未找到"
    fn fetch_content(&self, job_name: &str, settings_file: &str) -> Result<String, BackendError>;
}

impl<T: JobBackend + ?Sized> JobBackend for Box<T> {
    fn fetch_names(&self, settings_file: &str) -> Result<Vec<String>, BackendError> {
        (**self).fetch_names(settings_file)
    }

    fn fetch_content(&self, job_name: &str, settings_file: &str) -> Result<String, BackendError> {
        (**self).fetch_content(job_name, settings_file)
    }
}
