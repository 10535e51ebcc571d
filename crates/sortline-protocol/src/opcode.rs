//! 操作码定义
//!
//! 控制器寄存器编号。读命令和写命令共用同一编号空间，
//! 但同一编号在读/写方向上的含义可能不同（例如 30/31）。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 控制器操作码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Opcode {
    /// 分拣线模式（特殊设置，保持 0）
    Mode = 5,
    /// 皮带速度
    Speed = 7,
    /// 分拣器动作时间
    SorterTime = 13,
    /// 分拣器 1 位置（旧接口）
    Sorter1Position = 14,
    /// 分拣器 2 位置（旧接口）
    Sorter2Position = 15,
    /// 分拣器 3 位置（旧接口）
    Sorter3Position = 16,
    /// 初始化
    Init = 23,
    /// 定位容差
    PositioningTolerance = 25,
    /// 反馈源选择（0 = 编码器, 1 = 伺服）
    FeedbackSource = 26,
    /// 位置高 16 位（写：目标位置；读：当前位置）
    PositionHigh = 30,
    /// 位置低 16 位（写：目标位置；读：当前位置）
    PositionLow = 31,
    /// 到位标志（只读）
    InPosition = 32,
    /// 物体起始位置高 16 位（只读）
    ObjectBeginHigh = 34,
    /// 物体起始位置低 16 位（只读）
    ObjectBeginLow = 35,
    /// 物体结束位置高 16 位（只读）
    ObjectEndHigh = 36,
    /// 物体结束位置低 16 位（只读）
    ObjectEndLow = 37,
    Pusher1High = 40,
    Pusher1Low = 41,
    Pusher2High = 42,
    Pusher2Low = 43,
    Pusher3High = 44,
    Pusher3Low = 45,
    /// 照明开关
    Light = 46,
    /// 红色激光
    LaserRed = 47,
    /// 绿色激光
    LaserGreen = 48,
    /// 蓝色激光
    LaserBlue = 49,
}

impl Opcode {
    /// 原始编号
    pub fn code(self) -> u8 {
        self.into()
    }

    /// 32 位寄存器对的低半部分
    ///
    /// 只对 `*High` 操作码返回 `Some`。
    pub fn low_half(self) -> Option<Opcode> {
        use Opcode::*;
        match self {
            PositionHigh => Some(PositionLow),
            ObjectBeginHigh => Some(ObjectBeginLow),
            ObjectEndHigh => Some(ObjectEndLow),
            Pusher1High => Some(Pusher1Low),
            Pusher2High => Some(Pusher2Low),
            Pusher3High => Some(Pusher3Low),
            _ => None,
        }
    }
}
