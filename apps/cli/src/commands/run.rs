//! run 命令
//!
//! 连接控制器，下发启动配置，运行同步循环直到 Ctrl-C 或达到周期上限

use anyhow::{Context, Result};
use clap::Args;
use sortline_client::{ControllerSession, ImageAcquirer, LoopConfig, run_loop};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::acquirer::{CommandAcquirer, LoggingAcquirer};
use crate::config::CliConfig;
use crate::utils::{PortArgs, print_summary};

#[derive(Args, Debug)]
pub struct RunCommand {
    #[command(flatten)]
    pub port: PortArgs,

    /// 最多执行的周期数
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// 允许的最大连续总线错误数（超过则退出）
    #[arg(long)]
    pub max_errors: Option<u32>,

    /// 采集程序（覆盖配置，如 "detect-shape --camera 0"；按空白拆分，不支持引号）
    #[arg(long)]
    pub acquire_cmd: Option<String>,

    /// 跳过启动配置下发
    #[arg(long)]
    pub skip_setup: bool,
}

impl RunCommand {
    fn acquirer(&self, config: &CliConfig) -> Result<Box<dyn ImageAcquirer>> {
        let from_flag = match self.acquire_cmd.as_deref() {
            Some(line) => CommandAcquirer::from_command_line(line)?,
            None => None,
        };
        if let Some(acquirer) = from_flag {
            return Ok(Box::new(acquirer));
        }
        Ok(match &config.acquisition.command {
            Some(program) => Box::new(CommandAcquirer::new(
                program.clone(),
                config.acquisition.args.clone(),
            )),
            None => Box::new(LoggingAcquirer::default()),
        })
    }

    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut acquirer = self.acquirer(config)?;
        let mut line = self.port.open_line(config)?;

        if !self.skip_setup {
            line.apply_setup(&config.line).context("下发启动配置失败")?;
        }

        let mut session = ControllerSession::new(config.sync.clone());
        session.prime(&mut line).context("读取光电开关寄存器失败")?;

        let stop = Arc::new(AtomicBool::new(false));
        let handler_stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            handler_stop.store(true, Ordering::Relaxed);
        })
        .context("无法注册 Ctrl-C 处理")?;

        let loop_config = LoopConfig {
            poll_interval: config.sync.poll_interval(),
            max_cycles: self.max_cycles,
            max_consecutive_errors: self.max_errors,
        };

        println!("🚀 同步循环已启动（Ctrl-C 停止）");
        let summary = run_loop(&mut session, &mut line, acquirer.as_mut(), &stop, &loop_config)?;

        if !session.queue().is_empty() {
            info!("{} objects still pending at shutdown", session.queue().len());
        }
        print_summary(&summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortline_client::ShapeLabel;

    fn command(acquire_cmd: Option<&str>) -> RunCommand {
        RunCommand {
            port: PortArgs::default(),
            max_cycles: None,
            max_errors: None,
            acquire_cmd: acquire_cmd.map(str::to_string),
            skip_setup: false,
        }
    }

    #[test]
    fn test_default_acquirer_logs_only() {
        let mut acquirer = command(None).acquirer(&CliConfig::default()).unwrap();
        assert_eq!(acquirer.acquire_and_process(), ShapeLabel::Unknown);
    }

    #[cfg(unix)]
    #[test]
    fn test_acquire_cmd_overrides_config() {
        let mut config = CliConfig::default();
        config.acquisition.command = Some("false".to_string());

        let mut acquirer = command(Some("echo square")).acquirer(&config).unwrap();
        assert_eq!(acquirer.acquire_and_process(), ShapeLabel::Square);
    }

    #[test]
    fn test_quoted_acquire_cmd_is_an_error() {
        assert!(command(Some("detect \"a b\"")).acquirer(&CliConfig::default()).is_err());
    }
}
