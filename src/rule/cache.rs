//! 规则缓存管理
//! 仅处理 gfwlist 原始 base64 文本的本地读写，不做解码

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::error::{RspacError, RspacResult};
use crate::utils::fs::write_atomic_async;

/// 规则缓存管理器
pub struct RuleCacheManager;

impl RuleCacheManager {
    /// 从本地缓存读取原始规则字节
    /// 缓存文件缺失视为拉取失败
    pub async fn load_raw(cache_path: &Path) -> RspacResult<Vec<u8>> {
        match tokio::fs::read(cache_path).await {
            Ok(data) => {
                debug!("读取本地缓存成功：{}，{} 字节", cache_path.display(), data.len());
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(RspacError::FetchError(format!(
                "本地缓存不存在：{}",
                cache_path.display()
            ))),
            Err(e) => Err(RspacError::FetchError(format!(
                "读取本地缓存 {} 失败：{}",
                cache_path.display(),
                e
            ))),
        }
    }

    /// 将远程拉取的原始规则写入本地缓存（原子替换）
    pub async fn save_raw(cache_path: &Path, data: &[u8]) -> RspacResult<()> {
        write_atomic_async(cache_path.to_path_buf(), data.to_vec())
            .await
            .map_err(|e| {
                RspacError::WriteError(format!("写入缓存 {} 失败：{}", cache_path.display(), e))
            })?;
        debug!("规则缓存已更新：{}，{} 字节", cache_path.display(), data.len());
        Ok(())
    }
}
