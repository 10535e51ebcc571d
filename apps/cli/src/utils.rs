//! 命令共用的工具函数

use crate::config::CliConfig;
use anyhow::{Context, Result};
use clap::Args;
use sortline_client::{RunSummary, ShapeLabel};
use sortline_driver::{SortingLine, SortingLineBuilder};
use sortline_serial::SerialPortTransport;
use std::time::Duration;

/// 串口参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct PortArgs {
    /// 串口名称（如 COM2、/dev/ttyUSB0）
    #[arg(short, long)]
    pub port: Option<String>,

    /// 波特率
    #[arg(long)]
    pub baud: Option<u32>,
}

impl PortArgs {
    /// 打开分拣线控制器
    pub fn open_line(&self, config: &CliConfig) -> Result<SortingLine<SerialPortTransport>> {
        let port = self
            .port
            .clone()
            .or_else(|| config.serial.port.clone())
            .context("未指定串口：使用 --port 或在配置文件中设置 serial.port")?;

        let line = SortingLineBuilder::new()
            .port(port.clone())
            .baud_rate(self.baud.unwrap_or(config.serial.baud_rate))
            .timeout(Duration::from_millis(config.serial.timeout_ms))
            .build()
            .with_context(|| format!("无法连接分拣线控制器: {}", port))?;

        Ok(line)
    }
}

/// 打印循环汇总
pub fn print_summary(summary: &RunSummary) {
    let stats = &summary.stats;
    println!();
    println!("📊 运行结果:");
    println!("  周期数: {}", summary.cycles);
    println!("  耗时: {:.2} 秒", summary.elapsed.as_secs_f64());
    println!("  检测物体: {}", stats.objects_detected);
    println!("  完成采集: {}", stats.objects_acquired);
    println!("  总线错误周期: {}", stats.bus_errors);
    println!(
        "  总线事务: {} (失败率 {:.2}%)",
        summary.metrics.transactions(),
        summary.metrics.failure_rate() * 100.0
    );

    if !stats.labels.is_empty() {
        println!("  形状统计:");
        for label in ShapeLabel::ALL {
            let count = stats.label_count(label);
            if count > 0 {
                println!("    {:<15} {}", label.to_string(), count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_line_requires_port() {
        let args = PortArgs::default();
        let result = args.open_line(&CliConfig::default());
        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("--port"));
    }

    #[test]
    fn test_open_line_reports_port() {
        let args = PortArgs {
            port: Some("/dev/sortline-does-not-exist".to_string()),
            baud: None,
        };
        let result = args.open_line(&CliConfig::default());
        let message = format!("{:#}", result.err().unwrap());
        assert!(message.contains("/dev/sortline-does-not-exist"));
    }
}
