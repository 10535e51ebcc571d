//! CLI 配置文件
//!
//! TOML 格式，默认位于 `<config_dir>/sortline/config.toml`，缺省字段使用默认值。
//!
//! ```toml
//! [serial]
//! port = "COM2"
//!
//! [sync]
//! camera_offset = 3000
//! settle_delay_ms = 500
//!
//! [sync.extensions]
//! pusher_dispatch = true
//!
//! [acquisition]
//! command = "detect-shape"
//! args = ["--camera", "0"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sortline_client::SyncConfig;
use sortline_driver::LineSetup;
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("sortline");
    path.push("config.toml");
    Ok(path)
}

/// `--config` 优先，否则使用默认路径
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// 串口名称（如 "COM2"、"/dev/ttyUSB0"）
    pub port: Option<String>,
    pub baud_rate: u32,
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud_rate: 57_600,
            timeout_ms: 30,
        }
    }
}

/// 外部图像采集程序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// 每次采集执行的程序，标准输出最后一行为形状标签
    pub command: Option<String>,
    pub args: Vec<String>,
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub serial: SerialConfig,
    /// 启动时下发给控制器的参数
    pub line: LineSetup,
    pub sync: SyncConfig,
    pub acquisition: AcquisitionConfig,
}

impl CliConfig {
    /// 加载配置（文件不存在时返回默认配置）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        let content = self.to_toml()?;
        fs::write(path, content).with_context(|| format!("写入配置文件失败: {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置失败")
    }

    /// 检查可疑配置，返回警告列表
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.serial.port.is_none() {
            warnings.push("未设置串口（serial.port），run/status 需要 --port".to_string());
        }
        if self.serial.timeout_ms == 0 {
            warnings.push("serial.timeout_ms 为 0，所有响应都会被判定为短读".to_string());
        }
        if self.sync.look_ahead == 0 {
            warnings.push("sync.look_ahead 为 0，空闲时皮带不会前进".to_string());
        }
        if self.sync.camera_offset == 0 {
            warnings.push("sync.camera_offset 为 0，物体会停在光电开关处采集".to_string());
        }
        if self.acquisition.command.is_none() {
            warnings.push("未配置采集程序（acquisition.command），采集结果均为 unknown".to_string());
        }

        warnings
    }
}
