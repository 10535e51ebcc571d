//! 同步核心的数据类型

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 一个物体在皮带坐标系下的起止位置
///
/// 由边界检测器在观察到后沿时创建，创建后不可变。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectRecord {
    pub beginning_position: u32,
    pub end_position: u32,
}

impl ObjectRecord {
    pub fn new(beginning_position: u32, end_position: u32) -> Self {
        Self {
            beginning_position,
            end_position,
        }
    }

    /// 物体中点（在 u64 中求和，避免 u32 溢出）
    pub fn midpoint(&self) -> u32 {
        ((u64::from(self.beginning_position) + u64::from(self.end_position)) / 2) as u32
    }

    /// 物体长度（编码器脉冲）
    pub fn length(&self) -> u32 {
        self.end_position.wrapping_sub(self.beginning_position)
    }
}

/// 最近一次看到的起始/结束寄存器原始值
///
/// 仅用于变化检测：控制器每出现一个新边沿就会替换寄存器值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundaryLatch {
    pub last_begin: u32,
    pub last_end: u32,
}

/// 检测器当前等待的边沿
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanningState {
    /// 等待物体前沿
    #[default]
    OutOfObject,
    /// 已看到前沿，等待后沿
    InObject,
}

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionState {
    #[default]
    Idle,
    /// 已为队首物体下发目标位置，等待到位
    WaitingOnObject,
}

/// 图像处理返回的形状标签
///
/// 同步核心只关心采集是否完成，不解释标签内容。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeLabel {
    NoShape,
    Unknown,
    Triangle,
    Square,
    Rectangle,
    Pentagon,
    Hexagon,
    Circle,
    OvalRectangle,
}

impl ShapeLabel {
    pub const ALL: [ShapeLabel; 9] = [
        ShapeLabel::NoShape,
        ShapeLabel::Unknown,
        ShapeLabel::Triangle,
        ShapeLabel::Square,
        ShapeLabel::Rectangle,
        ShapeLabel::Pentagon,
        ShapeLabel::Hexagon,
        ShapeLabel::Circle,
        ShapeLabel::OvalRectangle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeLabel::NoShape => "no shape",
            ShapeLabel::Unknown => "unknown",
            ShapeLabel::Triangle => "triangle",
            ShapeLabel::Square => "square",
            ShapeLabel::Rectangle => "rectangle",
            ShapeLabel::Pentagon => "pentagon",
            ShapeLabel::Hexagon => "hexagon",
            ShapeLabel::Circle => "circle",
            ShapeLabel::OvalRectangle => "oval rectangle",
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 无法识别的形状标签
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized shape label: {0:?}")]
pub struct ParseShapeLabelError(pub String);

impl FromStr for ShapeLabel {
    type Err = ParseShapeLabelError;

    /// 忽略首尾空白和大小写；`_`、`-` 视为空格
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        ShapeLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == normalized)
            .ok_or_else(|| ParseShapeLabelError(s.to_string()))
    }
}
