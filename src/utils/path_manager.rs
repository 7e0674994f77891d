use std::path::PathBuf;

use crate::compiler::PacTemplate;
use crate::config::GlobalConfig;

/// PAC 工作目录路径管理器
#[derive(Debug, Default, Clone, Copy)]
pub struct PacPathManager;

impl PacPathManager {
    /// gfwlist 本地缓存（PAC目录/gfwlist.txt）
    pub fn gfwlist_cache_path(&self, config: &GlobalConfig) -> PathBuf {
        config.pac_dir.join("gfwlist.txt")
    }

    /// 用户规则文件（PAC目录/user-rule.txt）
    pub fn user_rule_path(&self, config: &GlobalConfig) -> PathBuf {
        config.pac_dir.join("user-rule.txt")
    }

    /// 编译输出的 PAC 文件（PAC目录/proxy.pac）
    pub fn pac_file_path(&self, config: &GlobalConfig) -> PathBuf {
        config.pac_dir.join("proxy.pac")
    }

    /// 模板文件路径
    pub fn template_path(&self, config: &GlobalConfig, template: PacTemplate) -> PathBuf {
        config.pac_dir.join(template.file_name())
    }
}
