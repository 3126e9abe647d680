/// 后端访问层模块
///
/// 该模块定义作业名称与配置内容的获取接口，会话控制器只依赖 trait，
/// 便于替换为 HTTP、本地目录或测试用的内存实现。
///
/// # 架构设计
///
/// - **traits**: `JobBackend` trait 与错误类型
/// - **http_io**: 基于 HTTP 的默认实现
/// - **fs_io**: 基于本地设置文件的实现
///
/// # 使用示例
///
/// ```rust,ignore
/// use job_config_editor::io::{HttpJobBackend, JobBackend};
///
/// let backend = HttpJobBackend::new("http://127.0.0.1:8000");
/// let names = backend.fetch_names("data_load_settings.json")?;
/// ```
pub mod fs_io;
pub mod http_io;
pub mod traits;

// === 导出 trait 定义 ===
pub use traits::{BackendError, JobBackend};

// === 导出默认实现 ===
pub use fs_io::FsJobBackend;
pub use http_io::HttpJobBackend;
