//! 同步参数

use sortline_driver::PusherOffsets;
use std::time::Duration;

/// 同步循环参数
///
/// 默认值与现场调试确定的机械参数一致。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    /// 光电开关到相机视野中心的距离（编码器脉冲）
    pub camera_offset: u32,
    /// 空闲时目标位置领先当前位置的距离
    pub look_ahead: u32,
    /// 开灯后到采集前的稳定时间
    pub settle_delay_ms: u64,
    /// 轮询周期
    pub poll_interval_ms: u64,
    /// 可选扩展
    pub extensions: ExtensionConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            camera_offset: 3000,
            look_ahead: 500,
            settle_delay_ms: 500,
            poll_interval_ms: 30,
            extensions: ExtensionConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 可选扩展（默认全部关闭）
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtensionConfig {
    /// 采集完成后按轮转顺序给推杆下发动作位置
    pub pusher_dispatch: bool,
    /// 推杆相对光电开关的物理偏移
    pub pusher_offsets: PusherOffsets,
    /// 主采集后追加无照明及红、绿、蓝激光下的多次曝光
    pub rgb_exposures: bool,
    /// 每次追加曝光前的等待时间
    pub exposure_delay_ms: u64,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            pusher_dispatch: false,
            pusher_offsets: PusherOffsets::default(),
            rgb_exposures: false,
            exposure_delay_ms: 500,
        }
    }
}

impl ExtensionConfig {
    pub fn exposure_delay(&self) -> Duration {
        Duration::from_millis(self.exposure_delay_ms)
    }
}
