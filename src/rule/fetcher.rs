//! Rule source fetcher module
//! 规则源拉取工具
//! 核心特性：
//! 1. 远程源经本地 SOCKS5 代理（127.0.0.1:端口）发起 GET 请求
//! 2. 显式超时 + 有限次数重试，不会无限期阻塞
//! 3. 调用方可通过 CancellationToken 随时取消
//! 4. 输出始终是未解码的原始字节，解码交给合并器

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::{Client, Proxy};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cache::RuleCacheManager;
use super::model::RuleSource;
use crate::config::{GlobalConfig, RetryPolicy};
use crate::error::{RspacError, RspacResult};
use crate::utils::path_manager::PacPathManager;

const USER_AGENT: &str = concat!("rspac/", env!("CARGO_PKG_VERSION"));
const RETRY_DELAY: Duration = Duration::from_secs(1);
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 规则源拉取器
#[derive(Debug, Clone)]
pub struct RuleFetcher {
    remote_a_url: String,
    remote_b_url: String,
    cache_path: PathBuf,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RuleFetcher {
    pub fn new(config: &GlobalConfig) -> Self {
        Self {
            remote_a_url: config.remote_a_url.clone(),
            remote_b_url: config.remote_b_url.clone(),
            cache_path: PacPathManager::default().gfwlist_cache_path(config),
            timeout: Duration::from_secs(config.http_timeout),
            retry: config.retry,
        }
    }

    /// 拉取指定规则源的原始字节
    ///
    /// # 参数
    /// - `source`: 规则源
    /// - `proxy_port`: 本地 SOCKS5 代理端口（仅远程源使用）
    /// - `cancel`: 取消令牌，触发后立即返回 `Cancelled`
    pub async fn fetch(
        &self,
        source: RuleSource,
        proxy_port: u16,
        cancel: &CancellationToken,
    ) -> RspacResult<Vec<u8>> {
        if cancel.is_cancelled() {
            return Err(RspacError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("规则源 [{}] 拉取已取消", source);
                Err(RspacError::Cancelled)
            }
            result = self.fetch_source(source, proxy_port) => result,
        }
    }

    async fn fetch_source(&self, source: RuleSource, proxy_port: u16) -> RspacResult<Vec<u8>> {
        let url = match source {
            RuleSource::RemoteA => &self.remote_a_url,
            RuleSource::RemoteB => &self.remote_b_url,
            RuleSource::LocalCache => return RuleCacheManager::load_raw(&self.cache_path).await,
        };

        debug!("开始拉取规则源 [{}]，URL：{}，代理端口：{}", source, url, proxy_port);
        let client = self.build_client(proxy_port)?;
        let data = self
            .simple_retry(self.retry.max_retries(), || Self::fetch_remote(&client, url))
            .await?;
        debug!("规则源 [{}] 拉取成功，{} 字节", source, data.len());
        Ok(data)
    }

    /// 构建走本地 SOCKS5 代理的 HTTP 客户端
    /// socks5h：域名交由代理端解析
    fn build_client(&self, proxy_port: u16) -> RspacResult<Client> {
        let proxy = Proxy::all(format!("socks5h://127.0.0.1:{}", proxy_port))
            .map_err(|e| RspacError::FetchError(format!("代理地址无效：{}", e)))?;

        Client::builder()
            .proxy(proxy)
            .timeout(self.timeout)
            .connect_timeout(self.timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .map_err(|e| RspacError::FetchError(format!("HTTP 客户端初始化失败：{}", e)))
    }

    /// 通用异步重试逻辑
    /// 保留最后一次错误信息，两次尝试之间固定间隔 1 秒
    async fn simple_retry<F, Fut, T>(&self, max_retries: usize, mut func: F) -> RspacResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RspacResult<T>>,
    {
        let mut last_err: Option<RspacError> = None;

        for attempt in 0..=max_retries {
            match func().await {
                Ok(res) => return Ok(res),
                Err(e) => {
                    if attempt < max_retries {
                        warn!(
                            "请求失败：{}，准备重试（{}/{}）",
                            e,
                            attempt + 1,
                            max_retries
                        );
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                    last_err = Some(e);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| RspacError::FetchError("重试次数已耗尽".to_string())))
    }

    /// 单次 GET 请求
    async fn fetch_remote(client: &Client, url: &str) -> RspacResult<Vec<u8>> {
        let response = client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| RspacError::FetchError(format!("请求 {} 失败：{}", url, e)))?;

        if !response.status().is_success() {
            return Err(RspacError::FetchError(format!(
                "URL {} 返回状态码 {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RspacError::FetchError(format!("读取响应体失败：{}", e)))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::rule::test_support::StubProxy;
    use tempfile::tempdir;

    /// 获取一个当前无人监听的本地端口
    fn unused_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[tokio::test]
    async fn test_unreachable_proxy_is_fetch_error() {
        let config = ConfigManager::custom()
            .remote_urls("http://rules.invalid/gfwlist.txt", "http://rules.invalid/b.txt")
            .retry(RetryPolicy::Never)
            .http_timeout(5)
            .build();
        let fetcher = RuleFetcher::new(&config);

        let result = fetcher
            .fetch(RuleSource::RemoteA, unused_port(), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(RspacError::FetchError(_))));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let fetcher = RuleFetcher::new(&ConfigManager::get_default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = fetcher.fetch(RuleSource::RemoteB, 1080, &cancel).await;
        assert!(matches!(result, Err(RspacError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_silent_proxy() {
        // 代理端口接受连接但从不应答，只能靠取消令牌结束
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ConfigManager::custom()
            .remote_urls("http://rules.invalid/gfwlist.txt", "http://rules.invalid/b.txt")
            .retry(RetryPolicy::Never)
            .http_timeout(30)
            .build();
        let fetcher = RuleFetcher::new(&config);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let result = fetcher.fetch(RuleSource::RemoteA, port, &cancel).await;
        assert!(matches!(result, Err(RspacError::Cancelled)));
    }

    #[tokio::test]
    async fn test_local_cache_source_reads_file() {
        let dir = tempdir().unwrap();
        let config = ConfigManager::custom().pac_dir(dir.path()).build();
        std::fs::write(dir.path().join("gfwlist.txt"), "ZXhhbXBsZS5jb20=").unwrap();

        let fetcher = RuleFetcher::new(&config);
        let data = fetcher
            .fetch(RuleSource::LocalCache, 1080, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(data, b"ZXhhbXBsZS5jb20=");
    }

    #[tokio::test]
    async fn test_remote_fetch_through_socks5() {
        let proxy = StubProxy::start("200 OK", "ISBjCnJlbW90ZS5jb20K").await;
        let config = ConfigManager::custom()
            .remote_urls("http://rules.test/a.txt", "http://rules.test/b.txt")
            .retry(RetryPolicy::Never)
            .http_timeout(5)
            .build();
        let fetcher = RuleFetcher::new(&config);

        let data = fetcher
            .fetch(RuleSource::RemoteB, proxy.port, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(data, b"ISBjCnJlbW90ZS5jb20K");
        assert_eq!(proxy.requests(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_retried_then_fetch_error() {
        let proxy = StubProxy::start("404 Not Found", "missing").await;
        let config = ConfigManager::custom()
            .remote_urls("http://rules.test/a.txt", "http://rules.test/b.txt")
            .retry(RetryPolicy::Times(1))
            .http_timeout(5)
            .build();
        let fetcher = RuleFetcher::new(&config);

        let result = fetcher
            .fetch(RuleSource::RemoteA, proxy.port, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(RspacError::FetchError(ref e)) if e.contains("404")));
        assert_eq!(proxy.requests(), 2);
    }
}
