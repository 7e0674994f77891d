//! 内置资源：编译期固化的 PAC 模板与默认用户规则

use std::path::Path;

use tracing::debug;

use crate::compiler::PacTemplate;
use crate::error::{RspacError, RspacResult};
use crate::utils::fs::write_atomic_async;

/// 默认用户规则文件内容
pub const DEFAULT_USER_RULE: &str = include_str!("../../assets/user-rule.txt");

/// 内置 gfwlist（base64），首次运行时作为本地缓存，离线也能生成 PAC
pub const DEFAULT_GFWLIST: &str = include_str!("../../assets/gfwlist.txt");

/// 内置模板内容
pub fn template_contents(template: PacTemplate) -> &'static str {
    match template {
        PacTemplate::Lan => include_str!("../../assets/rspac_lanip.pac"),
        PacTemplate::White => include_str!("../../assets/rspac_white.pac"),
        PacTemplate::WhiteAdvanced => include_str!("../../assets/rspac_white_advanced.pac"),
        PacTemplate::WhiteR => include_str!("../../assets/rspac_white_r.pac"),
        PacTemplate::Cnip => include_str!("../../assets/rspac_cnip.pac"),
        PacTemplate::GfwList => include_str!("../../assets/rspac_gfw.pac"),
    }
}

/// 文件不存在时写入内置内容，已存在的文件（可能被用户修改过）保持不变
/// 返回是否发生了写入
pub async fn install_if_missing(path: &Path, contents: &str) -> RspacResult<bool> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    write_atomic_async(path.to_path_buf(), contents.as_bytes().to_vec())
        .await
        .map_err(|e| {
            RspacError::WriteError(format!("安装内置资源 {} 失败：{}", path.display(), e))
        })?;
    debug!("已安装内置资源：{}", path.display());
    Ok(true)
}
