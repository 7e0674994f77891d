//! 文件写入工具
//! 先写入同目录临时文件，再原子重命名覆盖目标，读者永远看不到缺失或写了一半的文件

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// 原子写入文件
///
/// # 参数
/// - `path`: 目标文件路径（父目录需已存在）
/// - `contents`: 完整文件内容
///
/// # 功能特性
/// 1. 临时文件与目标位于同一目录，保证 rename 为原子操作
/// 2. 写入失败时临时文件随 drop 自动删除，旧文件保持不变
/// 3. unix 下权限统一为 0644（属主读写，其他人只读）
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    set_shared_read_permissions(tmp.path())?;

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// 在阻塞线程池中执行 [`write_atomic`]，供异步调用方使用
pub async fn write_atomic_async(path: PathBuf, contents: Vec<u8>) -> io::Result<()> {
    tokio::task::spawn_blocking(move || write_atomic(&path, &contents))
        .await
        .map_err(io::Error::other)?
}

#[cfg(unix)]
fn set_shared_read_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_shared_read_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
