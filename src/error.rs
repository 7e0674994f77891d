//! 全局错误类型定义

use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use std::path::PathBuf;
use thiserror::Error;
use url::ParseError as UrlParseError;

#[derive(Error, Debug)]
pub enum RspacError {
    // 规则相关错误
    #[error("规则拉取失败：{0}")]
    FetchError(String),
    #[error("规则解码失败：{0}")]
    DecodeError(String),
    #[error("未知的规则源选择器：{0}")]
    UnknownRuleSource(u8),

    // 模板/编译相关错误
    #[error("模板文件不存在：{}", .0.display())]
    TemplateMissing(PathBuf),
    #[error("未知的 PAC 类型：{0}")]
    UnknownTemplateType(String),
    #[error("PAC 文件写入失败：{0}")]
    WriteError(String),

    // 配置相关错误
    #[error("配置无效：{0}")]
    ConfigError(String),

    // 任务被调用方取消
    #[error("操作已取消")]
    Cancelled,

    // 序列化/反序列化错误
    #[error("JSON解析失败：{0}")]
    JsonError(#[from] SerdeJsonError),

    // 基础错误
    #[error("IO操作失败：{0}")]
    IoError(#[from] IoError),
    #[error("URL解析失败：{0}")]
    UrlError(#[from] UrlParseError),
}

// 全局Result类型
pub type RspacResult<T> = Result<T, RspacError>;
