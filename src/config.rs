/// 编辑器配置
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::EditorError;

/// 默认的后端地址
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// 默认的候选名称显示上限
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// 编辑器配置
///
/// 可从 JSON 文件加载，缺失的字段使用默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// 后端服务地址（不含末尾斜杠）
    pub server_url: String,
    /// 候选作业名称的最大数量
    pub suggestion_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
        }
    }
}

impl EditorConfig {
    /// 从 JSON 配置文件加载
    ///
    /// # 错误
    /// 读取失败返回 `IoError`，内容不是合法配置返回 `JsonError`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EditorError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        tracing::debug!("已加载配置文件: {:?}", path.as_ref());
        let server_url = config.server_url.clone();
        Ok(config.with_server_url(server_url))
    }

    /// 设置后端地址，去掉末尾的 `/`
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.server_url = url.trim_end_matches('/').to_string();
        self
    }

    /// 设置候选名称上限
    pub fn with_suggestion_limit(mut self, limit: usize) -> Self {
        self.suggestion_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.server_url, "http://127.0.0.1:8000");
        assert_eq!(config.suggestion_limit, 10);
    }

    #[test]
    fn test_trailing_slash_removed() {
        let config = EditorConfig::default().with_server_url("http://localhost:9000/");
        assert_eq!(config.server_url, "http://localhost:9000");
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.json");
        std::fs::write(&path, r#"{"server_url": "http://jobs.internal:8080/"}"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.server_url, "http://jobs.internal:8080");
        assert_eq!(config.suggestion_limit, DEFAULT_SUGGESTION_LIMIT);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = EditorConfig::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(EditorError::IoError(_))));

        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"suggestion_limit": "many"}"#).unwrap();
        assert!(matches!(EditorConfig::load(&path), Err(EditorError::JsonError(_))));
    }
}
