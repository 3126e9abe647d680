/// 本地设置文件后端
///
/// 目录中存放各作业类型的设置文件（JSON 对象，键为作业名称）。
/// 名称列表为顶层键（保持文件顺序），作业内容为对应条目的格式化 JSON；
/// 字符串条目原样返回。
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use super::traits::{BackendError, JobBackend};

/// 基于本地目录的后端
#[derive(Debug, Clone)]
pub struct FsJobBackend {
    dir: PathBuf,
}

impl FsJobBackend {
    /// 创建本地后端
    ///
    /// # 参数
    /// * `dir` - 设置文件所在目录
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 设置文件所在目录
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_settings(&self, settings_file: &str) -> Result<Map<String, Value>, BackendError> {
        let path = self.dir.join(settings_file);
        tracing::debug!("读取设置文件 {:?}", path);

        let text = std::fs::read_to_string(&path)
            .map_err(|e| BackendError::Connection(format!("{}: {}", path.display(), e)))?;

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(BackendError::Connection(format!(
                "{}: 顶层不是 JSON 对象",
                path.display()
            ))),
            Err(e) => Err(BackendError::Connection(format!("{}: {}", path.display(), e))),
        }
    }
}

impl JobBackend for FsJobBackend {
    fn fetch_names(&self, settings_file: &str) -> Result<Vec<String>, BackendError> {
        Ok(self.load_settings(settings_file)?.keys().cloned().collect())
    }

    fn fetch_content(&self, job_name: &str, settings_file: &str) -> Result<String, BackendError> {
        let settings = self.load_settings(settings_file)?;
        let content = match settings.get(job_name) {
            None => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(entry) => serde_json::to_string_pretty(entry)
                .map_err(|e| BackendError::Connection(e.to_string()))?,
        };
        Ok(content)
    }
}
