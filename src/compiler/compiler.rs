//! PAC 编译器核心
//! 读取模板、替换占位符，并以原子替换的方式写出 PAC 文件

use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;

use tracing::debug;

use super::global::output_lock;
use super::template::{ProxyEndpoints, render};
use crate::error::{RspacError, RspacResult};
use crate::rule::RuleList;
use crate::utils::fs::write_atomic_async;

/// PAC 编译器
pub struct PacCompiler;

impl PacCompiler {
    /// 编译 PAC 文件
    ///
    /// # 参数
    /// - `template_path`: 模板文件
    /// - `output_path`: 输出文件（存在则整体替换）
    /// - `endpoints`: 代理端点
    /// - `rules`: 需要嵌入的规则列表，仅 GFW 模板传入
    ///
    /// 任何一步失败都不会改动已有的输出文件
    pub async fn compile(
        template_path: &Path,
        output_path: &Path,
        endpoints: &ProxyEndpoints,
        rules: Option<&RuleList>,
    ) -> RspacResult<()> {
        let start = Instant::now();
        let lock = output_lock(output_path);
        let _guard = lock.lock().await;

        // 1. 读取模板
        let template_text = match tokio::fs::read_to_string(template_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RspacError::TemplateMissing(template_path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        // 2. 替换占位符
        let pac_text = render(&template_text, endpoints, rules)?;

        // 3. 临时文件 + 原子重命名
        write_atomic_async(output_path.to_path_buf(), pac_text.into_bytes())
            .await
            .map_err(|e| RspacError::WriteError(format!("{}：{}", output_path.display(), e)))?;

        debug!(
            "PAC 编译完成：{} -> {}，嵌入规则{}条，耗时{:?}",
            template_path.display(),
            output_path.display(),
            rules.map_or(0, RuleList::len),
            start.elapsed()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ENDPOINTS: ProxyEndpoints = ProxyEndpoints {
        socks_port: 1080,
        http_port: 8080,
    };

    #[tokio::test]
    async fn test_compile_replaces_existing_output() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("rspac_gfw.pac");
        let output = dir.path().join("proxy.pac");
        fs::write(&template, "var proxy = \"__SOCKS5__\";\nvar rules = __RULES__;").unwrap();
        fs::write(&output, "stale pac contents").unwrap();

        let rules = RuleList::from(vec!["a.com".to_string(), "b.com".to_string()]);
        PacCompiler::compile(&template, &output, &ENDPOINTS, Some(&rules))
            .await
            .unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            "var proxy = \"SOCKS5 127.0.0.1:1080\";\nvar rules = [\"a.com\",\"b.com\"];"
        );
        // 模板本身保持不变
        assert!(fs::read_to_string(&template).unwrap().contains("__RULES__"));
    }

    #[tokio::test]
    async fn test_compile_is_idempotent() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("rspac_white.pac");
        let output = dir.path().join("proxy.pac");
        fs::write(&template, "return \"__PROXY__; __SOCKS__; DIRECT\";").unwrap();

        PacCompiler::compile(&template, &output, &ENDPOINTS, None).await.unwrap();
        let first = fs::read(&output).unwrap();
        PacCompiler::compile(&template, &output, &ENDPOINTS, None).await.unwrap();
        let second = fs::read(&output).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_template_keeps_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("proxy.pac");
        fs::write(&output, "previous").unwrap();

        let result =
            PacCompiler::compile(&dir.path().join("absent.pac"), &output, &ENDPOINTS, None).await;

        assert!(matches!(result, Err(RspacError::TemplateMissing(_))));
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[tokio::test]
    async fn test_unwritable_output_is_write_error() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("rspac_lanip.pac");
        fs::write(&template, "__PROXY__").unwrap();

        let output = dir.path().join("no-such-dir").join("proxy.pac");
        let result = PacCompiler::compile(&template, &output, &ENDPOINTS, None).await;

        assert!(matches!(result, Err(RspacError::WriteError(_))));
    }

    #[tokio::test]
    async fn test_concurrent_compiles_never_interleave() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("rspac_gfw.pac");
        let output = dir.path().join("proxy.pac");
        fs::write(&template, "__SOCKS5__|__RULES__").unwrap();

        let mut handles = Vec::new();
        for port in 2000..2016u16 {
            let template = template.clone();
            let output = output.clone();
            handles.push(tokio::spawn(async move {
                let endpoints = ProxyEndpoints {
                    socks_port: port,
                    http_port: port,
                };
                let rules = RuleList::from(vec![format!("host{}.com", port); 64]);
                PacCompiler::compile(&template, &output, &endpoints, Some(&rules)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let text = fs::read_to_string(&output).unwrap();
        let port: u16 = text
            .strip_prefix("SOCKS5 127.0.0.1:")
            .and_then(|rest| rest.split('|').next())
            .and_then(|p| p.parse().ok())
            .unwrap();
        let rules = RuleList::from(vec![format!("host{}.com", port); 64]);
        assert_eq!(text, format!("SOCKS5 127.0.0.1:{}|{}", port, rules.to_json().unwrap()));
    }
}
