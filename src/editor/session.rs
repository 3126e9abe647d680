/// 会话控制器模块
///
/// 以显式状态结构体管理一次编辑会话：作业类型、候选名称、作业名称、
/// 错误提示、已加载内容与编辑追踪器。所有状态只通过本模块的方法修改。
use thiserror::Error;

use super::tracker::EditTracker;
use crate::config::EditorConfig;
use crate::io::{BackendError, JobBackend};
use crate::job::JobType;

/// 未加载作业时的默认输出文件名
pub const DEFAULT_FILE_NAME: &str = "updated-task.sql";

/// 作业加载错误
///
/// `Display` 文本即界面上的错误提示
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Please enter a job name")]
    EmptyJobName,

    #[error("\"{0}\" is not a valid job name. Please select from the suggestions.")]
    UnknownJobName(String),

    #[error("No task data found for \"{0}\"")]
    NotFound(String),

    #[error("Failed to load task data: {0}")]
    Transport(String),

    #[error("Failed to connect to the server. Please check your connection.")]
    Connection,
}

/// 界面状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// 尚未选择作业类型
    SelectJobType,
    /// 已选择类型，尚未加载内容
    AwaitingLoad,
    /// 已加载内容，但没有可编辑字段
    NoFields,
    /// 正在编辑
    Editing,
}

/// 编辑会话
///
/// # 使用示例
///
/// ```rust,ignore
/// use job_config_editor::{EditorConfig, JobSession};
/// use job_config_editor::io::HttpJobBackend;
///
/// let config = EditorConfig::default();
/// let mut session = JobSession::new(HttpJobBackend::from_config(&config), config);
/// session.select_job_type("Data Load");
/// session.set_job_name("nightly_load");
/// session.load_task()?;
/// ```
pub struct JobSession<B: JobBackend> {
    backend: B,
    config: EditorConfig,
    job_type: Option<JobType>,
    available_names: Vec<String>,
    job_name: String,
    load_error: Option<String>,
    task_content: Option<String>,
    file_name: String,
    tracker: Option<EditTracker>,
}

impl<B: JobBackend> JobSession<B> {
    /// 创建新的会话
    pub fn new(backend: B, config: EditorConfig) -> Self {
        Self {
            backend,
            config,
            job_type: None,
            available_names: Vec::new(),
            job_name: String::new(),
            load_error: None,
            task_content: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            tracker: None,
        }
    }

    /// 选择作业类型
    ///
    /// 清空作业名称、内容与错误提示，并重新获取候选名称。
    /// 无法识别的类型名称使会话回到"未选择"状态。
    pub fn select_job_type(&mut self, label: &str) -> Option<JobType> {
        self.job_name.clear();
        self.task_content = None;
        self.tracker = None;
        self.load_error = None;
        self.job_type = label.parse::<JobType>().ok();

        match self.job_type {
            Some(_) => self.refresh_names(),
            None => self.available_names.clear(),
        }

        self.job_type
    }

    /// 重新获取候选作业名称
    ///
    /// 请求失败时视为没有可用名称
    pub fn refresh_names(&mut self) {
        let Some(settings_file) = self.settings_file() else {
            self.available_names.clear();
            return;
        };

        self.available_names = match self.backend.fetch_names(settings_file) {
            Ok(names) => {
                tracing::debug!("获取到 {} 个作业名称", names.len());
                names
            }
            Err(e) => {
                tracing::warn!("获取作业名称失败: {}", e);
                Vec::new()
            }
        };
    }

    /// 设置作业名称（同时清除错误提示）
    pub fn set_job_name(&mut self, name: impl Into<String>) {
        self.job_name = name.into();
        self.load_error = None;
    }

    /// 当前作业名称匹配的候选名称（不区分大小写的子串匹配）
    pub fn suggestions(&self) -> Vec<&str> {
        let query = self.job_name.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let query = self.job_name.to_lowercase();
        self.available_names
            .iter()
            .filter(|name| name.to_lowercase().contains(&query))
            .take(self.config.suggestion_limit)
            .map(|name| name.as_str())
            .collect()
    }

    /// 加载当前作业的配置
    ///
    /// # 错误
    /// - 作业名称为空或未选择类型 → `EmptyJobName`
    /// - 名称不在候选列表中 → `UnknownJobName`
    /// - 返回内容为空 → `NotFound`
    /// - 非成功状态 → `Transport`；网络失败 → `Connection`
    ///
    /// 失败时只设置错误提示，已加载的内容保持不变。
    pub fn load_task(&mut self) -> Result<(), LoadError> {
        let result = self.fetch_task();
        match &result {
            Ok(()) => self.load_error = None,
            Err(e) => {
                tracing::warn!("加载作业失败: {}", e);
                self.load_error = Some(e.to_string());
            }
        }
        result
    }

    fn fetch_task(&mut self) -> Result<(), LoadError> {
        let settings_file = match self.settings_file() {
            Some(file) if !self.job_name.trim().is_empty() => file,
            _ => return Err(LoadError::EmptyJobName),
        };

        if !self.available_names.contains(&self.job_name) {
            return Err(LoadError::UnknownJobName(self.job_name.clone()));
        }

        let content = self
            .backend
            .fetch_content(&self.job_name, settings_file)
            .map_err(|e| match e {
                BackendError::Status { text, .. } => LoadError::Transport(text),
                BackendError::Connection(_) => LoadError::Connection,
            })?;

        if content.trim().is_empty() {
            return Err(LoadError::NotFound(self.job_name.clone()));
        }

        self.open_content(content);
        self.file_name = format!("{}.sql", self.job_name);
        Ok(())
    }

    /// 载入新的文件内容
    ///
    /// 字段表、工作值与已提交值全部重建
    pub fn open_content(&mut self, content: String) {
        let tracker = EditTracker::from_content(&content);
        tracing::info!("已载入内容，解析出 {} 个字段", tracker.len());
        self.tracker = Some(tracker);
        self.task_content = Some(content);
    }

    /// 界面状态
    pub fn view_state(&self) -> ViewState {
        match (&self.job_type, &self.tracker) {
            (None, None) => ViewState::SelectJobType,
            (_, None) => ViewState::AwaitingLoad,
            (_, Some(tracker)) if tracker.is_empty() => ViewState::NoFields,
            (_, Some(_)) => ViewState::Editing,
        }
    }

    /// 当前作业类型
    pub fn job_type(&self) -> Option<JobType> {
        self.job_type
    }

    /// 当前设置文件
    pub fn settings_file(&self) -> Option<&'static str> {
        self.job_type.map(|job_type| job_type.settings_file())
    }

    /// 候选作业名称
    pub fn available_names(&self) -> &[String] {
        &self.available_names
    }

    /// 当前作业名称
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// 错误提示
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// 已加载的原始内容
    pub fn task_content(&self) -> Option<&str> {
        self.task_content.as_deref()
    }

    /// 输出文件名
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// 编辑追踪器
    pub fn tracker(&self) -> Option<&EditTracker> {
        self.tracker.as_ref()
    }

    /// 编辑追踪器（可变）
    pub fn tracker_mut(&mut self) -> Option<&mut EditTracker> {
        self.tracker.as_mut()
    }

    /// 配置
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }
}
