//! 规则加载管理器
//! 负责拉取基础规则、读取用户规则并合并，远程拉取成功后刷新本地缓存

use std::io::ErrorKind;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::RuleCacheManager;
use super::fetcher::RuleFetcher;
use super::merger::RuleMerger;
use super::model::{RuleList, RuleSource};
use crate::config::{FetchFallback, GlobalConfig};
use crate::error::{RspacError, RspacResult};
use crate::utils::PacPathManager;

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 加载合并后的规则列表
    pub async fn load(config: &GlobalConfig, cancel: &CancellationToken) -> RspacResult<RuleList> {
        let paths = PacPathManager::default();

        // 1. 拉取基础列表（按配置的失败策略处理）
        let (source, raw_base) = Self::fetch_base_list(config, cancel).await?;

        // 2. 读取用户规则（文件缺失视为空列表）
        let raw_user = Self::read_user_rules(config).await?;

        // 3. 解码、过滤、合并
        let rules = RuleMerger::merge(&raw_base, &raw_user)?;

        // 4. 远程数据解码成功后才刷新缓存
        if source.is_remote() && config.refresh_cache {
            let cache_path = paths.gfwlist_cache_path(config);
            if let Err(e) = RuleCacheManager::save_raw(&cache_path, &raw_base).await {
                warn!("规则缓存刷新失败：{}", e);
            }
        }

        debug!("规则加载完成，来源 [{}]，共 {} 条", source, rules.len());
        Ok(rules)
    }

    /// 拉取基础列表，返回实际使用的规则源与原始字节
    async fn fetch_base_list(
        config: &GlobalConfig,
        cancel: &CancellationToken,
    ) -> RspacResult<(RuleSource, Vec<u8>)> {
        let fetcher = RuleFetcher::new(config);
        let source = config.rule_source;

        match fetcher.fetch(source, config.socks_port, cancel).await {
            Ok(data) => Ok((source, data)),
            Err(RspacError::FetchError(e))
                if source.is_remote() && config.fetch_fallback == FetchFallback::LocalCache =>
            {
                warn!("远程规则源 [{}] 拉取失败：{}，改用本地缓存", source, e);
                let data = fetcher
                    .fetch(RuleSource::LocalCache, config.socks_port, cancel)
                    .await?;
                Ok((RuleSource::LocalCache, data))
            }
            Err(e) => Err(e),
        }
    }

    /// 读取用户规则原始字节
    async fn read_user_rules(config: &GlobalConfig) -> RspacResult<Vec<u8>> {
        let path = PacPathManager::default().user_rule_path(config);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("用户规则文件不存在：{}，按空列表处理", path.display());
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}
