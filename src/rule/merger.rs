//! 规则合并器
//! 负责解码基础列表（base64）与用户列表（纯文本），过滤注释/分节行后按顺序拼接

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

use super::model::RuleList;
use crate::error::{RspacError, RspacResult};

/// 发布的 gfwlist 可能省略结尾填充，解码时不强制要求 `=`
const GFWLIST_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// 规则合并器
pub struct RuleMerger;

impl RuleMerger {
    /// 合并基础列表与用户列表
    ///
    /// # 参数
    /// - `raw_base_list`: base64 编码的 gfwlist 原始字节
    /// - `raw_user_list`: 用户规则文件的原始字节（UTF-8 文本）
    ///
    /// # 返回值
    /// 过滤后的基础规则在前、用户规则在后，保留各自原始顺序与重复项
    pub fn merge(raw_base_list: &[u8], raw_user_list: &[u8]) -> RspacResult<RuleList> {
        let base_text = Self::decode_base_list(raw_base_list)?;
        let user_text = String::from_utf8_lossy(raw_user_list);

        let mut rules = RuleList::new();
        rules.extend(Self::filter_lines(&base_text));
        let base_count = rules.len();
        rules.extend(Self::filter_lines(&user_text));

        debug!(
            "规则合并完成：基础规则{}条，用户规则{}条",
            base_count,
            rules.len() - base_count
        );
        Ok(rules)
    }

    /// 解码 base64 基础列表（忽略换行等空白字符）
    pub fn decode_base_list(raw: &[u8]) -> RspacResult<String> {
        let compact: Vec<u8> = raw
            .iter()
            .copied()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();

        let decoded = GFWLIST_BASE64
            .decode(&compact)
            .map_err(|e| RspacError::DecodeError(format!("base64 解码失败：{}", e)))?;

        Ok(String::from_utf8_lossy(&decoded).into_owned())
    }

    /// 按行切分并过滤：空行、`!` 注释行、`[` 分节行
    pub fn filter_lines(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| Self::is_rule_line(line))
            .map(str::to_string)
    }

    fn is_rule_line(line: &str) -> bool {
        !line.is_empty() && !line.starts_with('!') && !line.starts_with('[')
    }
}
