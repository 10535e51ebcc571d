//! # Sortline CLI
//!
//! 分拣线相机同步命令行工具。
//!
//! ```bash
//! # 写入默认配置
//! sortline-cli config init --port COM2
//!
//! # 运行同步循环（Ctrl-C 停止）
//! sortline-cli run --acquire-cmd "detect-shape --camera 0"
//!
//! # 无硬件调试
//! sortline-cli simulate -n 20 --seed 42
//!
//! # 单项操作
//! sortline-cli status
//! sortline-cli light on
//! sortline-cli laser rg
//! sortline-cli target 25000 --wait 10
//! sortline-cli pusher 2 18000 --midpoint
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod acquirer;
mod commands;
mod config;
mod utils;

use commands::{
    ConfigCommand, LaserCommand, LightCommand, PusherCommand, RunCommand, SimulateCommand,
    StatusCommand, TargetCommand,
};
use config::{CliConfig, resolve_config_path};

/// Sortline CLI - 分拣线相机同步工具
#[derive(Parser, Debug)]
#[command(name = "sortline-cli")]
#[command(about = "Command-line interface for sorting-line camera synchronization", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 <config_dir>/sortline/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 运行同步循环
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 使用模拟控制器运行同步循环
    Simulate {
        #[command(flatten)]
        args: SimulateCommand,
    },

    /// 读取控制器状态
    Status {
        #[command(flatten)]
        args: StatusCommand,
    },

    /// 照明开关
    Light {
        #[command(flatten)]
        args: LightCommand,
    },

    /// 激光开关
    Laser {
        #[command(flatten)]
        args: LaserCommand,
    },

    /// 设置皮带目标位置
    Target {
        #[command(flatten)]
        args: TargetCommand,
    },

    /// 设置推杆动作位置
    Pusher {
        #[command(flatten)]
        args: PusherCommand,
    },

    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sortline_cli=info".parse()?)
                .add_directive("sortline_client=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let path = resolve_config_path(cli.config.as_deref())?;
    let load = || CliConfig::load(&path);

    match cli.command {
        Commands::Run { args } => args.execute(&load()?),
        Commands::Simulate { args } => args.execute(&load()?),
        Commands::Status { args } => args.execute(&load()?),
        Commands::Light { args } => args.execute(&load()?),
        Commands::Laser { args } => args.execute(&load()?),
        Commands::Target { args } => args.execute(&load()?),
        Commands::Pusher { args } => args.execute(&load()?),
        Commands::Config(cmd) => cmd.execute(&path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "sortline-cli",
            "--config",
            "/tmp/sortline.toml",
            "run",
            "--port",
            "COM2",
            "--max-cycles",
            "100",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/sortline.toml")));
        match cli.command {
            Commands::Run { args } => {
                assert_eq!(args.port.port.as_deref(), Some("COM2"));
                assert_eq!(args.max_cycles, Some(100));
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_pusher_range() {
        assert!(Cli::try_parse_from(["sortline-cli", "pusher", "2", "18000"]).is_ok());
        assert!(Cli::try_parse_from(["sortline-cli", "pusher", "4", "18000"]).is_err());
    }
}
