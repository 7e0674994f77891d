//! 规则数据模型

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{RspacError, RspacResult};

/// 规则源
/// 配置中以选择器数字表示：0=RemoteA，1=RemoteB，2=LocalCache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RuleSource {
    #[default]
    RemoteA,    // gfwlist 官方仓库
    RemoteB,    // gfwlist 社区分支
    LocalCache, // 本地缓存的 gfwlist.txt
}

impl RuleSource {
    pub fn is_remote(&self) -> bool {
        !matches!(self, RuleSource::LocalCache)
    }
}

impl TryFrom<u8> for RuleSource {
    type Error = RspacError;

    fn try_from(selector: u8) -> RspacResult<Self> {
        match selector {
            0 => Ok(RuleSource::RemoteA),
            1 => Ok(RuleSource::RemoteB),
            2 => Ok(RuleSource::LocalCache),
            other => Err(RspacError::UnknownRuleSource(other)),
        }
    }
}

impl From<RuleSource> for u8 {
    fn from(source: RuleSource) -> Self {
        match source {
            RuleSource::RemoteA => 0,
            RuleSource::RemoteB => 1,
            RuleSource::LocalCache => 2,
        }
    }
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleSource::RemoteA => write!(f, "RemoteA"),
            RuleSource::RemoteB => write!(f, "RemoteB"),
            RuleSource::LocalCache => write!(f, "LocalCache"),
        }
    }
}

/// 合并后的有序规则列表
/// 不去重，保留基础列表在前、用户列表在后的原始顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleList(Vec<String>);

impl RuleList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// 紧凑 JSON 数组，用于替换 `__RULES__`
    pub fn to_json(&self) -> RspacResult<String> {
        Ok(serde_json::to_string(&self.0)?)
    }
}

impl From<Vec<String>> for RuleList {
    fn from(rules: Vec<String>) -> Self {
        Self(rules)
    }
}

impl Extend<String> for RuleList {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for RuleList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
