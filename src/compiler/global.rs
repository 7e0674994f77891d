//! 全局输出路径锁管理
//! 同一输出文件的编译串行执行，不同文件互不阻塞
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// 输出路径 -> 异步互斥锁
static OUTPUT_LOCKS: Lazy<Mutex<HashMap<PathBuf, Arc<tokio::sync::Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// 获取输出路径对应的锁（相对路径按当前目录展开后作为键）
/// 只被表本身引用的锁已无人持有或等待，顺带清理
pub(crate) fn output_lock(path: &Path) -> Arc<tokio::sync::Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = OUTPUT_LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    locks.entry(key).or_default().clone()
}
