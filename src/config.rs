//! 全局配置管理,存储所有可配置项
//! 配置在启动时加载一次，以值对象形式传入各个组件，不存在隐藏的全局状态

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::compiler::ProxyEndpoints;
use crate::error::{RspacError, RspacResult};
use crate::rule::RuleSource;

/// 官方 gfwlist 仓库
pub const DEFAULT_REMOTE_A_URL: &str =
    "https://raw.githubusercontent.com/gfwlist/gfwlist/master/gfwlist.txt";
/// Loukky 维护的 gfwlist 分支
pub const DEFAULT_REMOTE_B_URL: &str =
    "https://raw.githubusercontent.com/Loukky/gfwlist-by-loukky/master/gfwlist.txt";

/// 系统代理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemProxyMode {
    #[default]
    Direct, // 不设置系统代理
    Pac,    // 系统代理指向 PAC 文件
    Global, // 全局代理
}

/// 重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryPolicy {
    Never,     // 不重试
    Times(u8), // 固定次数重试（不含第一次）
}

impl RetryPolicy {
    /// 最大重试次数（0表示不重试）
    pub fn max_retries(&self) -> usize {
        match self {
            RetryPolicy::Never => 0,
            RetryPolicy::Times(n) => *n as usize,
        }
    }
}

/// 远程规则拉取失败后的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchFallback {
    /// 直接中止本次编译
    #[default]
    Abort,
    /// 退回到本地缓存的 gfwlist
    LocalCache,
}

/// 全局配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    // PAC 工作目录（模板、缓存、用户规则、输出文件）
    pub pac_dir: PathBuf,
    // 本地 SOCKS5 监听端口
    pub socks_port: u16,
    // 本地 HTTP 代理监听端口
    pub http_port: u16,
    // PAC 文件对外服务端口
    pub pac_port: u16,
    // 规则源选择器（0/1/2）
    #[serde(rename = "gfwlist_url")]
    pub rule_source: RuleSource,
    pub remote_a_url: String,
    pub remote_b_url: String,
    pub system_proxy_mode: SystemProxyMode,
    // 代理服务当前是否开启
    pub proxy_enabled: bool,
    // 超时配置（单位：秒）
    pub http_timeout: u64,
    pub retry: RetryPolicy,
    pub fetch_fallback: FetchFallback,
    // 远程拉取成功后是否刷新本地缓存
    pub refresh_cache: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            pac_dir: PathBuf::from(".config/rspac/pac"),
            socks_port: 1080,
            http_port: 1081,
            pac_port: 8070,
            rule_source: RuleSource::RemoteA,
            remote_a_url: DEFAULT_REMOTE_A_URL.to_string(),
            remote_b_url: DEFAULT_REMOTE_B_URL.to_string(),
            system_proxy_mode: SystemProxyMode::Direct,
            proxy_enabled: false,
            http_timeout: 30,
            retry: RetryPolicy::Times(2),
            fetch_fallback: FetchFallback::Abort,
            refresh_cache: true,
        }
    }
}

impl GlobalConfig {
    /// 本次编译使用的代理端点
    pub fn endpoints(&self) -> ProxyEndpoints {
        ProxyEndpoints {
            socks_port: self.socks_port,
            http_port: self.http_port,
        }
    }

    /// 远程规则源对应的 URL，本地缓存返回 None
    pub fn remote_url(&self, source: RuleSource) -> Option<&str> {
        match source {
            RuleSource::RemoteA => Some(&self.remote_a_url),
            RuleSource::RemoteB => Some(&self.remote_b_url),
            RuleSource::LocalCache => None,
        }
    }

    /// 是否需要在编译后重新应用系统代理
    pub fn should_reload_system_proxy(&self) -> bool {
        self.proxy_enabled && self.system_proxy_mode == SystemProxyMode::Pac
    }

    /// 校验配置项
    pub fn validate(&self) -> RspacResult<()> {
        for (name, raw) in [("remote_a_url", &self.remote_a_url), ("remote_b_url", &self.remote_b_url)] {
            let url = Url::parse(raw)?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(RspacError::ConfigError(format!(
                    "{} 仅支持 http/https：{}",
                    name, raw
                )));
            }
        }
        if self.socks_port == 0 || self.http_port == 0 {
            return Err(RspacError::ConfigError("代理端口不能为 0".to_string()));
        }
        if self.http_timeout == 0 {
            return Err(RspacError::ConfigError("http_timeout 必须大于 0".to_string()));
        }
        Ok(())
    }
}

/// 配置管理器
pub struct ConfigManager;

impl ConfigManager {
    /// 获取默认配置
    pub fn get_default() -> GlobalConfig {
        GlobalConfig::default()
    }

    /// 从 JSON 文件加载配置（缺省字段使用默认值）
    pub fn load(path: &Path) -> RspacResult<GlobalConfig> {
        let content = fs::read_to_string(path).map_err(|e| {
            RspacError::ConfigError(format!("读取配置文件 {} 失败：{}", path.display(), e))
        })?;
        let config = Self::from_json(&content)?;
        debug!("配置加载完成：{}", path.display());
        Ok(config)
    }

    /// 从 JSON 文本解析配置
    pub fn from_json(content: &str) -> RspacResult<GlobalConfig> {
        let config: GlobalConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 自定义配置
    pub fn custom() -> CustomConfigBuilder {
        CustomConfigBuilder::new()
    }
}

/// 配置构建器（便于自定义配置）
#[derive(Debug, Clone, Default)]
pub struct CustomConfigBuilder {
    config: GlobalConfig,
}

impl CustomConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pac_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pac_dir = path.into();
        self
    }

    pub fn socks_port(mut self, port: u16) -> Self {
        self.config.socks_port = port;
        self
    }

    pub fn http_port(mut self, port: u16) -> Self {
        self.config.http_port = port;
        self
    }

    pub fn pac_port(mut self, port: u16) -> Self {
        self.config.pac_port = port;
        self
    }

    pub fn rule_source(mut self, source: RuleSource) -> Self {
        self.config.rule_source = source;
        self
    }

    pub fn remote_urls(mut self, remote_a: impl Into<String>, remote_b: impl Into<String>) -> Self {
        self.config.remote_a_url = remote_a.into();
        self.config.remote_b_url = remote_b.into();
        self
    }

    pub fn system_proxy_mode(mut self, mode: SystemProxyMode) -> Self {
        self.config.system_proxy_mode = mode;
        self
    }

    pub fn proxy_enabled(mut self, enabled: bool) -> Self {
        self.config.proxy_enabled = enabled;
        self
    }

    pub fn http_timeout(mut self, timeout: u64) -> Self {
        self.config.http_timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn fetch_fallback(mut self, fallback: FetchFallback) -> Self {
        self.config.fetch_fallback = fallback;
        self
    }

    pub fn refresh_cache(mut self, refresh: bool) -> Self {
        self.config.refresh_cache = refresh;
        self
    }

    pub fn build(self) -> GlobalConfig {
        self.config
    }
}
