//! 通用工具模块
pub mod fs;
pub mod path_manager;
pub mod proxy_toggler;

// 导出核心接口
pub use self::path_manager::PacPathManager;
pub use self::proxy_toggler::{NoopProxyToggler, SystemProxyToggler};
