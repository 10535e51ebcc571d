//! 驱动层模块
//!
//! 在串口传输之上实现分拣线控制器的总线事务：
//! - 请求/响应事务（写确认、读校验、短读检测）
//! - 32 位位置的高低半字拆分访问
//! - 照明、激光、推杆等执行器命令
//! - 启动配置下发
//! - 事务指标统计
//!
//! 协议没有请求 ID，也没有重试，每个事务独占总线直到响应完整或超时。

#[cfg(feature = "serialport")]
mod builder;
mod error;
mod line;
pub mod metrics;
pub mod setup;

#[cfg(feature = "serialport")]
pub use builder::SortingLineBuilder;
pub use error::BusError;
pub use line::SortingLine;
pub use metrics::{BusMetrics, BusMetricsSnapshot};
pub use setup::{FeedbackSource, LaserChannel, LaserMask, LineSetup, Pusher, PusherOffsets};
