/// HTTP 后端实现
///
/// - `GET {server}/names?filename=<settings>` → JSON 字符串数组
/// - `GET {server}/<job>?filename=<settings>` → 原始文本
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::traits::{BackendError, JobBackend};
use crate::config::EditorConfig;

/// 路径段中需要编码的字符（保留 RFC 3986 非保留字符）
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// 基于 ureq 的同步 HTTP 后端
#[derive(Debug, Clone)]
pub struct HttpJobBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpJobBackend {
    /// 创建 HTTP 后端
    ///
    /// # 参数
    /// * `base_url` - 服务地址，如 `http://127.0.0.1:8000`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            agent: ureq::AgentBuilder::new().build(),
        }
    }

    /// 从配置创建
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.server_url.clone())
    }

    /// 服务地址
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 请求 `{server}/<segment>?filename=<settings>`，`segment` 按路径段编码
    fn get_text(&self, segment: &str, settings_file: &str) -> Result<String, BackendError> {
        let url = format!(
            "{}/{}",
            self.base_url,
            utf8_percent_encode(segment, PATH_SEGMENT)
        );
        tracing::debug!("GET {}?filename={}", url, settings_file);

        let response = match self.agent.get(&url).query("filename", settings_file).call() {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                return Err(BackendError::Status {
                    code,
                    text: response.status_text().to_string(),
                });
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(BackendError::Connection(transport.to_string()));
            }
        };

        response
            .into_string()
            .map_err(|e| BackendError::Connection(e.to_string()))
    }
}

impl JobBackend for HttpJobBackend {
    fn fetch_names(&self, settings_file: &str) -> Result<Vec<String>, BackendError> {
        let body = self.get_text("names", settings_file)?;
        serde_json::from_str(&body).map_err(|e| BackendError::Connection(e.to_string()))
    }

    fn fetch_content(&self, job_name: &str, settings_file: &str) -> Result<String, BackendError> {
        self.get_text(job_name, settings_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let backend = HttpJobBackend::new("http://localhost:8000/");
        assert_eq!(backend.base_url(), "http://localhost:8000");

        let backend = HttpJobBackend::from_config(&EditorConfig::default());
        assert_eq!(backend.base_url(), "http://127.0.0.1:8000");
    }

    #[test]
    fn test_connection_refused() {
        // 绑定后立即释放端口，确保无人监听
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let backend = HttpJobBackend::new(format!("http://127.0.0.1:{}", port));

        let result = backend.fetch_names("data_load_settings.json");
        assert!(matches!(result, Err(BackendError::Connection(_))));
    }
}
