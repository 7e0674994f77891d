//! PAC 管理器：整合规则加载、模板编译与系统代理刷新
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::assets::{DEFAULT_GFWLIST, DEFAULT_USER_RULE, install_if_missing, template_contents};
use crate::compiler::{PacCompiler, PacTemplate};
use crate::config::{GlobalConfig, SystemProxyMode};
use crate::error::{RspacError, RspacResult};
use crate::rule::{RuleList, RuleLoader};
use crate::utils::{NoopProxyToggler, PacPathManager, SystemProxyToggler};

/// PAC 管理器
#[derive(Clone)]
pub struct PacManager {
    config: GlobalConfig,
    paths: PacPathManager,
    toggler: Arc<dyn SystemProxyToggler>,
}

impl PacManager {
    /// 创建管理器（不切换系统代理）
    pub fn new(config: GlobalConfig) -> RspacResult<Self> {
        Self::with_toggler(config, Arc::new(NoopProxyToggler))
    }

    /// 创建管理器并指定系统代理切换器
    /// 配置无论来自文件还是构建器，都在这里统一校验
    pub fn with_toggler(
        config: GlobalConfig,
        toggler: Arc<dyn SystemProxyToggler>,
    ) -> RspacResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            paths: PacPathManager,
            toggler,
        })
    }

    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// 初始化 PAC 目录
    /// 1. 安装内置资源
    /// 2. 首次运行（尚无 proxy.pac）时编译一次 GFWLIST
    pub async fn init(&self, cancel: &CancellationToken) -> RspacResult<()> {
        self.install_assets().await?;

        if !self.pac_file_path().exists() {
            // 首次编译失败不影响初始化，后续可再次切换类型重试
            if let Err(e) = self.compile(PacTemplate::GfwList, cancel).await {
                warn!("首次生成 PAC 文件失败：{}", e);
            }
        }
        Ok(())
    }

    /// 创建 PAC 目录并安装缺失的内置模板、用户规则文件与 gfwlist 缓存
    pub async fn install_assets(&self) -> RspacResult<()> {
        tokio::fs::create_dir_all(&self.config.pac_dir).await.map_err(|e| {
            RspacError::WriteError(format!(
                "创建 PAC 目录 {} 失败：{}",
                self.config.pac_dir.display(),
                e
            ))
        })?;

        let mut installed = 0;
        for template in PacTemplate::ALL {
            let path = self.paths.template_path(&self.config, template);
            if install_if_missing(&path, template_contents(template)).await? {
                installed += 1;
            }
        }
        install_if_missing(&self.user_rule_path(), DEFAULT_USER_RULE).await?;
        install_if_missing(&self.gfwlist_cache_path(), DEFAULT_GFWLIST).await?;
        debug!("PAC 目录就绪：{}，新安装模板{}个", self.config.pac_dir.display(), installed);
        Ok(())
    }

    /// 按类型字符串重新生成 PAC 文件
    /// 未知类型直接返回错误，不产生任何副作用
    pub async fn compile_type(&self, type_name: &str, cancel: &CancellationToken) -> RspacResult<PacTemplate> {
        let template: PacTemplate = type_name.parse()?;
        self.compile(template, cancel).await?;
        Ok(template)
    }

    /// 使用指定模板重新生成 PAC 文件
    pub async fn compile(&self, template: PacTemplate, cancel: &CancellationToken) -> RspacResult<()> {
        let rules = if template.embeds_rules() {
            Some(self.load_rules(cancel).await?)
        } else {
            None
        };

        let template_path = self.paths.template_path(&self.config, template);
        let pac_path = self.pac_file_path();
        PacCompiler::compile(&template_path, &pac_path, &self.config.endpoints(), rules.as_ref()).await?;
        info!("PAC 文件已更新：{}（{}）", pac_path.display(), template);

        self.reload_system_proxy();
        Ok(())
    }

    /// 加载合并后的规则列表
    pub async fn load_rules(&self, cancel: &CancellationToken) -> RspacResult<RuleList> {
        RuleLoader::load(&self.config, cancel).await
    }

    /// 重新设置系统代理，迫使系统/浏览器重新加载 PAC 文件
    /// 切换失败只记录日志
    fn reload_system_proxy(&self) {
        if !self.config.should_reload_system_proxy() {
            return;
        }
        for mode in [SystemProxyMode::Direct, SystemProxyMode::Pac] {
            if let Err(e) = self.toggler.set_system_proxy(mode) {
                warn!("系统代理切换到 {:?} 失败：{}", mode, e);
            }
        }
    }

    /// PAC 文件的访问地址
    pub fn pac_url(&self) -> String {
        format!("http://127.0.0.1:{}/proxy.pac", self.config.pac_port)
    }

    pub fn pac_file_path(&self) -> PathBuf {
        self.paths.pac_file_path(&self.config)
    }

    pub fn user_rule_path(&self) -> PathBuf {
        self.paths.user_rule_path(&self.config)
    }

    pub fn gfwlist_cache_path(&self) -> PathBuf {
        self.paths.gfwlist_cache_path(&self.config)
    }
}
