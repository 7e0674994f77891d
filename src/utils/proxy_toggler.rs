//! 系统代理切换接口
//! 真正修改操作系统/浏览器代理设置的逻辑由宿主程序实现

use tracing::debug;

use crate::config::SystemProxyMode;
use crate::error::RspacResult;

/// 系统代理切换器
pub trait SystemProxyToggler: Send + Sync {
    /// 将系统代理设置为指定模式
    fn set_system_proxy(&self, mode: SystemProxyMode) -> RspacResult<()>;
}

/// 空实现：仅记录日志，不修改系统设置
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProxyToggler;

impl SystemProxyToggler for NoopProxyToggler {
    fn set_system_proxy(&self, mode: SystemProxyMode) -> RspacResult<()> {
        debug!("忽略系统代理切换请求：{:?}", mode);
        Ok(())
    }
}
