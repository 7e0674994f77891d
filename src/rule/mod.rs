//! 规则模块：负责规则的拉取、缓存、合并与数据模型定义
pub mod model;
pub mod fetcher;
pub mod merger;
pub mod cache;
pub mod loader;

#[cfg(test)]
mod test_support;

// 导出核心接口
pub use self::model::{RuleList, RuleSource};
pub use self::fetcher::RuleFetcher;
pub use self::merger::RuleMerger;
pub use self::cache::RuleCacheManager;
pub use self::loader::RuleLoader;
