//! 管理模块：PAC 目录初始化、按类型编译、系统代理刷新
pub mod assets;
pub mod manager;

// 导出核心接口
pub use self::manager::PacManager;
