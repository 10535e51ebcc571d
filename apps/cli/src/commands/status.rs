//! status 命令
//!
//! 一次性读取皮带位置、光电开关寄存器和到位标志

use anyhow::Result;
use clap::Args;

use crate::config::CliConfig;
use crate::utils::PortArgs;

#[derive(Args, Debug)]
pub struct StatusCommand {
    #[command(flatten)]
    pub port: PortArgs,
}

impl StatusCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut line = self.port.open_line(config)?;

        let current = line.current_position()?;
        let begin = line.object_beginning_position()?;
        let end = line.object_end_position()?;
        let in_position = line.in_position()?;

        println!("📍 分拣线状态:");
        println!("  当前位置: {}", current);
        println!("  物体起始寄存器: {}", begin);
        println!("  物体结束寄存器: {}", end);
        println!("  到位: {}", if in_position { "是" } else { "否" });

        let metrics = line.metrics();
        println!("  总线事务: {} (失败 {})", metrics.transactions(), metrics.failures());
        Ok(())
    }
}
