//! 执行器命令：照明、激光、目标位置、推杆

use anyhow::{Result, bail};
use clap::{Args, ValueEnum};
use sortline_driver::{LaserChannel, LaserMask, Pusher};

use crate::config::CliConfig;
use crate::utils::PortArgs;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        self == Switch::On
    }
}

/// 解析激光掩码：`off`、通道字母组合（如 `rg`、`rgb`）或 0-7 的数字
pub fn parse_laser_mask(s: &str) -> Result<LaserMask, String> {
    let s = s.trim().to_ascii_lowercase();
    if s == "off" || s == "none" {
        return Ok(LaserMask::OFF);
    }
    if let Ok(value) = s.parse::<u8>() {
        if value > 7 {
            return Err(format!("激光掩码超出范围 (0-7): {}", value));
        }
        return Ok(LaserMask(value));
    }

    let mut mask = 0u8;
    for c in s.chars() {
        let channel = match c {
            'r' => LaserChannel::Red,
            'g' => LaserChannel::Green,
            'b' => LaserChannel::Blue,
            _ => return Err(format!("无效的激光通道: {:?}（可用 r/g/b）", c)),
        };
        mask |= channel.bit();
    }
    Ok(LaserMask(mask))
}

/// 照明开关
#[derive(Args, Debug)]
pub struct LightCommand {
    #[arg(value_enum)]
    pub state: Switch,

    #[command(flatten)]
    pub port: PortArgs,
}

impl LightCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut line = self.port.open_line(config)?;
        line.set_light(self.state.is_on())?;
        println!("✅ 照明: {:?}", self.state);
        Ok(())
    }
}

/// 激光开关
#[derive(Args, Debug)]
pub struct LaserCommand {
    /// 掩码：off、r/g/b 组合或 0-7
    #[arg(value_parser = parse_laser_mask)]
    pub mask: LaserMask,

    #[command(flatten)]
    pub port: PortArgs,
}

impl LaserCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut line = self.port.open_line(config)?;
        line.set_lasers(self.mask)?;
        println!(
            "✅ 激光: R={} G={} B={}",
            self.mask.contains(LaserChannel::Red),
            self.mask.contains(LaserChannel::Green),
            self.mask.contains(LaserChannel::Blue)
        );
        Ok(())
    }
}

/// 设置皮带目标位置
#[derive(Args, Debug)]
pub struct TargetCommand {
    /// 目标位置（编码器脉冲）
    pub position: u32,

    /// 下发后等待到位（超时秒数）
    #[arg(long)]
    pub wait: Option<u64>,

    #[command(flatten)]
    pub port: PortArgs,
}

impl TargetCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut line = self.port.open_line(config)?;
        line.set_target_position(self.position)?;
        println!("✅ 目标位置: {}", self.position);

        if let Some(timeout) = self.wait {
            let deadline = std::time::Instant::now() + std::time::Duration::from_secs(timeout);
            loop {
                if line.in_position()? {
                    println!("✅ 已到位: {}", line.current_position()?);
                    break;
                }
                if std::time::Instant::now() >= deadline {
                    bail!("等待到位超时（{} 秒）", timeout);
                }
                spin_sleep::sleep(config.sync.poll_interval());
            }
        }
        Ok(())
    }
}

/// 设置推杆动作位置
#[derive(Args, Debug)]
pub struct PusherCommand {
    /// 推杆编号（1-3）
    #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
    pub number: u8,

    /// 动作位置（编码器脉冲）
    pub position: u32,

    /// 将位置视为物体中点，叠加配置中的推杆偏移
    #[arg(long)]
    pub midpoint: bool,

    #[command(flatten)]
    pub port: PortArgs,
}

impl PusherCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let Some(pusher) = Pusher::from_number(self.number) else {
            bail!("无效的推杆编号: {}", self.number);
        };

        let mut line = self.port.open_line(config)?;
        if self.midpoint {
            let offsets = &config.sync.extensions.pusher_offsets;
            line.dispatch_pusher(pusher, self.position, offsets)?;
            println!(
                "✅ 推杆 {}: 中点 {} + 偏移 {}",
                self.number,
                self.position,
                offsets.offset(pusher)
            );
        } else {
            line.set_pusher_position(pusher, self.position)?;
            println!("✅ 推杆 {}: {}", self.number, self.position);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_laser_mask() {
        assert_eq!(parse_laser_mask("off"), Ok(LaserMask::OFF));
        assert_eq!(parse_laser_mask("r"), Ok(LaserMask::RED));
        assert_eq!(parse_laser_mask("GB"), Ok(LaserMask(0x06)));
        assert_eq!(parse_laser_mask("rgb"), Ok(LaserMask(0x07)));
        assert_eq!(parse_laser_mask("5"), Ok(LaserMask(0x05)));
        assert!(parse_laser_mask("8").is_err());
        assert!(parse_laser_mask("x").is_err());
    }
}
