/// 编辑器层模块
///
/// 该模块提供有状态的编辑接口，支持变更检测、提交与恢复检测。
/// 遵循"修改-提交分离"原则，用户输入只更新工作值，需要显式调用提交。
///
/// # 架构设计
///
/// - **tracker**: 编辑追踪器，管理工作值与已提交基线
/// - **session**: 会话控制器，管理作业选择、加载与错误提示
///
/// # 使用示例
///
/// ```rust,ignore
/// use job_config_editor::{EditTracker, CommitOutcome};
///
/// let mut tracker = EditTracker::from_content("retries: 3 ; max attempts");
/// tracker.set_working_value("retries", "5")?;
///
/// match tracker.commit() {
///     CommitOutcome::NothingToUpdate => println!("No changes to update!"),
///     CommitOutcome::Committed { updated, .. } => println!("更新了 {} 个字段", updated.len()),
/// }
/// ```
pub mod session;
pub mod tracker;

// === 导出公共接口 ===
pub use session::{JobSession, LoadError, ViewState, DEFAULT_FILE_NAME};
pub use tracker::{CommitOutcome, EditTracker};
