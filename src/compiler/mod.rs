//! 编译模块：将 PAC 模板渲染为最终 PAC 文件
pub mod compiler;
pub mod global;
pub mod template;

pub use self::compiler::PacCompiler;
pub use self::template::{PacTemplate, ProxyEndpoints, render};
