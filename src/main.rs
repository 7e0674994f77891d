//! rspac 命令行入口
//!
//! 用法示例：
//! rspac -c config.json init
//! rspac -c config.json compile GFWLIST
//! rspac rules
//! rspac url

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rspac::{CancellationToken, ConfigManager, GlobalConfig, PacManager, PacTemplate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rspac", version, about = "PAC rule compiler / PAC 规则编译工具")]
struct Cli {
    /// JSON 配置文件路径（缺省使用内置默认配置）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 初始化 PAC 目录（安装模板，首次运行时生成 proxy.pac）
    Init,
    /// 按类型重新生成 proxy.pac：LAN / WHITE / WHITE_ADVANCED / WHITE_R / CNIP / GFWLIST
    Compile {
        #[arg(value_name = "TYPE")]
        pac_type: String,
    },
    /// 输出合并后的规则列表（JSON）
    Rules,
    /// 输出 PAC 文件访问地址
    Url,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    let manager = PacManager::new(config).context("配置校验失败")?;

    // Ctrl-C 取消正在进行的拉取
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("收到中断信号，正在取消");
            on_signal.cancel();
        }
    });

    match cli.command {
        Command::Init => {
            manager.init(&cancel).await.context("初始化 PAC 目录失败")?;
            info!("PAC 目录：{}", manager.config().pac_dir.display());
        }
        Command::Compile { pac_type } => {
            let template = compile_pac(&manager, &pac_type, &cancel).await?;
            println!("{} -> {}", template, manager.pac_file_path().display());
        }
        Command::Rules => {
            let rules = manager.load_rules(&cancel).await.context("加载规则失败")?;
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Command::Url => {
            println!("{}", manager.pac_url());
        }
    }

    Ok(())
}

/// 先解析类型再安装资源，未知类型不会在磁盘上留下任何文件
async fn compile_pac(
    manager: &PacManager,
    pac_type: &str,
    cancel: &CancellationToken,
) -> Result<PacTemplate> {
    let template: PacTemplate = pac_type.parse()?;
    manager.install_assets().await.context("初始化 PAC 目录失败")?;
    manager
        .compile(template, cancel)
        .await
        .with_context(|| format!("生成 {} 类型 PAC 失败", template))?;
    Ok(template)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> Result<GlobalConfig> {
    match path {
        Some(path) => ConfigManager::load(path)
            .with_context(|| format!("加载配置文件 {} 失败", path.display())),
        None => Ok(ConfigManager::get_default()),
    }
}
