//! 配置管理命令

use anyhow::{Result, bail};
use clap::Subcommand;
use std::path::Path;

use crate::config::CliConfig;

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示生效的配置（TOML）
    Show,

    /// 检查配置文件
    Check,

    /// 写入默认配置文件
    Init {
        /// 默认串口
        #[arg(short, long)]
        port: Option<String>,

        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn execute(self, path: &Path) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show_(path),
            ConfigCommand::Check => Self::check_(path),
            ConfigCommand::Init { port, force } => Self::init_(path, port, force),
        }
    }

    fn show_(path: &Path) -> Result<()> {
        let config = CliConfig::load(path)?;
        println!("# {}", path.display());
        print!("{}", config.to_toml()?);
        Ok(())
    }

    fn check_(path: &Path) -> Result<()> {
        println!("配置文件: {}", path.display());
        if !path.exists() {
            println!("  (文件不存在，使用默认配置)");
        }

        let config = CliConfig::load(path)?;
        println!("  串口: {:?}", config.serial.port);
        println!("  相机偏移: {}", config.sync.camera_offset);
        println!("  前进量: {}", config.sync.look_ahead);
        println!("  稳定时间: {} ms", config.sync.settle_delay_ms);

        let warnings = config.warnings();
        if warnings.is_empty() {
            println!("✅ 配置正常");
        } else {
            for warning in warnings {
                println!("⚠️  {}", warning);
            }
        }
        Ok(())
    }

    fn init_(path: &Path, port: Option<String>, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
        }

        let mut config = CliConfig::default();
        config.serial.port = port;
        config.save(path)?;
        println!("✅ 已写入默认配置: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_then_refuse_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        ConfigCommand::Init {
            port: Some("COM2".to_string()),
            force: false,
        }
        .execute(&path)
        .unwrap();
        assert_eq!(
            CliConfig::load(&path).unwrap().serial.port.as_deref(),
            Some("COM2")
        );

        let again = ConfigCommand::Init {
            port: None,
            force: false,
        }
        .execute(&path);
        assert!(again.is_err());

        ConfigCommand::Init {
            port: None,
            force: true,
        }
        .execute(&path)
        .unwrap();
        assert_eq!(CliConfig::load(&path).unwrap().serial.port, None);
    }

    #[test]
    fn test_show_and_check_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        ConfigCommand::Show.execute(&path).unwrap();
        ConfigCommand::Check.execute(&path).unwrap();
    }
}
