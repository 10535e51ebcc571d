//! 分拣线执行器与启动配置类型

use sortline_protocol::Opcode;

/// 位置反馈源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u16)]
pub enum FeedbackSource {
    /// 皮带编码器
    Encoder = 0,
    /// 伺服电机编码器（默认）
    #[default]
    Servo = 1,
}

/// 推杆编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pusher {
    One,
    Two,
    Three,
}

impl Pusher {
    pub const ALL: [Pusher; 3] = [Pusher::One, Pusher::Two, Pusher::Three];

    /// 推杆位置寄存器对的高半部分
    pub fn opcode(self) -> Opcode {
        match self {
            Pusher::One => Opcode::Pusher1High,
            Pusher::Two => Opcode::Pusher2High,
            Pusher::Three => Opcode::Pusher3High,
        }
    }

    /// 对应分拣器的位置寄存器
    pub fn sorter_opcode(self) -> Opcode {
        match self {
            Pusher::One => Opcode::Sorter1Position,
            Pusher::Two => Opcode::Sorter2Position,
            Pusher::Three => Opcode::Sorter3Position,
        }
    }

    /// 0 起始的序号
    pub fn index(self) -> usize {
        match self {
            Pusher::One => 0,
            Pusher::Two => 1,
            Pusher::Three => 2,
        }
    }

    /// 从 1 起始的编号创建
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Pusher::One),
            2 => Some(Pusher::Two),
            3 => Some(Pusher::Three),
            _ => None,
        }
    }

    /// 轮转顺序中的下一个推杆
    pub fn next(self) -> Self {
        match self {
            Pusher::One => Pusher::Two,
            Pusher::Two => Pusher::Three,
            Pusher::Three => Pusher::One,
        }
    }
}

/// 推杆相对光电开关的物理偏移（编码器脉冲）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct PusherOffsets(pub [u32; 3]);

impl Default for PusherOffsets {
    fn default() -> Self {
        Self([7600, 11_000, 14_400])
    }
}

impl PusherOffsets {
    pub fn offset(&self, pusher: Pusher) -> u32 {
        self.0[pusher.index()]
    }
}

/// 激光通道
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserChannel {
    Red,
    Green,
    Blue,
}

impl LaserChannel {
    pub const ALL: [LaserChannel; 3] = [LaserChannel::Red, LaserChannel::Green, LaserChannel::Blue];

    pub fn opcode(self) -> Opcode {
        match self {
            LaserChannel::Red => Opcode::LaserRed,
            LaserChannel::Green => Opcode::LaserGreen,
            LaserChannel::Blue => Opcode::LaserBlue,
        }
    }

    /// 在 [`LaserMask`] 中对应的位
    pub fn bit(self) -> u8 {
        match self {
            LaserChannel::Red => 0x01,
            LaserChannel::Green => 0x02,
            LaserChannel::Blue => 0x04,
        }
    }
}

/// RGB 激光位掩码（bit 0 = 红, bit 1 = 绿, bit 2 = 蓝）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaserMask(pub u8);

impl LaserMask {
    pub const OFF: LaserMask = LaserMask(0);
    pub const RED: LaserMask = LaserMask(0x01);
    pub const GREEN: LaserMask = LaserMask(0x02);
    pub const BLUE: LaserMask = LaserMask(0x04);

    pub fn contains(self, channel: LaserChannel) -> bool {
        self.0 & channel.bit() == channel.bit()
    }

    /// 单通道掩码
    pub fn only(channel: LaserChannel) -> Self {
        LaserMask(channel.bit())
    }
}

/// 启动时下发给控制器的配置
///
/// 默认值与控制器调试时确定的参数一致。
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSetup {
    /// 皮带速度
    pub speed: u16,
    /// 分拣线模式（特殊设置，保持 0）
    pub mode: u16,
    /// 分拣器动作时间
    pub sorter_time: u16,
    /// 分拣器 1/2/3 固定位置（`None` 表示不下发，由推杆命令逐个设置）
    pub sorter_positions: Option<[u16; 3]>,
    /// 初始化命令参数
    pub init_code: u16,
    /// 位置反馈源
    pub feedback: FeedbackSource,
    /// 定位容差（`None` 表示沿用控制器当前值）
    pub positioning_tolerance: Option<u16>,
    /// 启动后照明状态
    pub light_on: bool,
}

impl Default for LineSetup {
    fn default() -> Self {
        Self {
            speed: 30,
            mode: 0,
            sorter_time: 200,
            sorter_positions: None,
            init_code: 2,
            feedback: FeedbackSource::Servo,
            positioning_tolerance: None,
            light_on: false,
        }
    }
}
