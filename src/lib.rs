//! rspac - PAC（Proxy Auto-Config）规则编译工具
//! 拉取 gfwlist、合并用户规则，并将本地代理端点写入 PAC 模板

// 导出全局错误类型
pub use self::error::{RspacError, RspacResult};

// 导出配置模块
pub use self::config::{
    ConfigManager, CustomConfigBuilder, FetchFallback, GlobalConfig, RetryPolicy, SystemProxyMode,
};

// 导出规则模块核心接口
pub use self::rule::{RuleCacheManager, RuleFetcher, RuleList, RuleLoader, RuleMerger, RuleSource};

// 导出编译模块核心接口
pub use self::compiler::{PacCompiler, PacTemplate, ProxyEndpoints};

// 导出管理模块核心接口
pub use self::manager::PacManager;

// 导出工具模块核心接口
pub use self::utils::{NoopProxyToggler, PacPathManager, SystemProxyToggler};

// 取消令牌，供调用方中断规则拉取
pub use tokio_util::sync::CancellationToken;

// 声明所有子模块
pub mod config;
pub mod error;
pub mod rule;
pub mod compiler;
pub mod manager;
pub mod utils;
