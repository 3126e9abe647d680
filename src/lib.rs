//! 作业配置编辑器库
//!
//! 将作业配置文件（JSON 或 `name: value ; comment` 行格式）解析为带类型的可编辑字段，
//! 追踪用户编辑相对已提交基线的变更，并按原始格式导出已提交的值。
pub mod config;
pub mod editor;
pub mod format;
pub mod io;
pub mod job;
pub mod parser;
pub mod utils;
pub mod value;

// 重新导出主要结构
pub use config::EditorConfig;
pub use editor::{CommitOutcome, EditTracker, JobSession, LoadError, ViewState};
pub use format::{format_for_input, InputDisplay, InputKind};
pub use job::JobType;
pub use parser::{parse_fields, Field, FieldMap, ParseMode};
pub use utils::{init_logging, EditorError};
pub use value::{coerce, normalize, parse_local_datetime, render_canonical, FieldValue};
