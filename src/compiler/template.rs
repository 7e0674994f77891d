//! PAC 模板定义与占位符替换

use std::fmt;
use std::str::FromStr;

use crate::error::{RspacError, RspacResult};
use crate::rule::RuleList;

pub const TOKEN_SOCKS5: &str = "__SOCKS5__";
pub const TOKEN_SOCKS: &str = "__SOCKS__";
pub const TOKEN_PROXY: &str = "__PROXY__";
pub const TOKEN_RULES: &str = "__RULES__";

/// 本地代理监听地址
const LOOPBACK: &str = "127.0.0.1";

/// PAC 模板类型
/// 外部以类型字符串指定，与模板文件一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacTemplate {
    Lan,
    White,
    WhiteAdvanced,
    WhiteR,
    Cnip,
    GfwList,
}

impl PacTemplate {
    pub const ALL: [PacTemplate; 6] = [
        PacTemplate::Lan,
        PacTemplate::White,
        PacTemplate::WhiteAdvanced,
        PacTemplate::WhiteR,
        PacTemplate::Cnip,
        PacTemplate::GfwList,
    ];

    /// 类型字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            PacTemplate::Lan => "LAN",
            PacTemplate::White => "WHITE",
            PacTemplate::WhiteAdvanced => "WHITE_ADVANCED",
            PacTemplate::WhiteR => "WHITE_R",
            PacTemplate::Cnip => "CNIP",
            PacTemplate::GfwList => "GFWLIST",
        }
    }

    /// PAC 目录中的模板文件名
    pub fn file_name(&self) -> &'static str {
        match self {
            PacTemplate::Lan => "rspac_lanip.pac",
            PacTemplate::White => "rspac_white.pac",
            PacTemplate::WhiteAdvanced => "rspac_white_advanced.pac",
            PacTemplate::WhiteR => "rspac_white_r.pac",
            PacTemplate::Cnip => "rspac_cnip.pac",
            PacTemplate::GfwList => "rspac_gfw.pac",
        }
    }

    /// 是否需要嵌入合并后的规则列表
    /// 其余模板的规则直接写在模板逻辑里
    pub fn embeds_rules(&self) -> bool {
        matches!(self, PacTemplate::GfwList)
    }
}

impl FromStr for PacTemplate {
    type Err = RspacError;

    fn from_str(s: &str) -> RspacResult<Self> {
        PacTemplate::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| RspacError::UnknownTemplateType(s.to_string()))
    }
}

impl fmt::Display for PacTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单次编译使用的代理端点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyEndpoints {
    pub socks_port: u16,
    pub http_port: u16,
}

impl ProxyEndpoints {
    pub fn socks5_directive(&self) -> String {
        format!("SOCKS5 {}:{}", LOOPBACK, self.socks_port)
    }

    pub fn socks_directive(&self) -> String {
        format!("SOCKS {}:{}", LOOPBACK, self.socks_port)
    }

    pub fn http_directive(&self) -> String {
        format!("PROXY {}:{}", LOOPBACK, self.http_port)
    }
}

/// 替换模板文本中的占位符
///
/// `__SOCKS5__` 先于 `__SOCKS__` 替换；`__RULES__` 仅在传入规则列表时替换，且放在最后，
/// 规则内容中出现的占位符字样不会被二次替换。模板中缺失的占位符直接跳过。
pub fn render(template_text: &str, endpoints: &ProxyEndpoints, rules: Option<&RuleList>) -> RspacResult<String> {
    let mut text = template_text
        .replace(TOKEN_SOCKS5, &endpoints.socks5_directive())
        .replace(TOKEN_SOCKS, &endpoints.socks_directive())
        .replace(TOKEN_PROXY, &endpoints.http_directive());

    if let Some(rules) = rules {
        text = text.replace(TOKEN_RULES, &rules.to_json()?);
    }

    Ok(text)
}
