//! Sortline SDK - 分拣线相机同步 Rust SDK
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 命令帧编码、响应解析与校验
//! - **传输层** (`serial`): 串口抽象，以及 Mock 与模拟控制器
//! - **驱动层** (`driver`): 请求/响应事务、位置读写、执行器命令
//! - **客户端层** (`client`): 边界检测、采集调度、同步循环
//!
//! # 快速开始
//!
//! ```rust
//! use sortline_sdk::prelude::*;
//! ```

pub use sortline_client as client;
pub use sortline_driver as driver;
pub use sortline_protocol as protocol;
pub use sortline_serial as serial;

pub mod prelude;

// 常用类型
pub use client::{ControllerSession, ImageAcquirer, ShapeLabel, SyncConfig, run_loop};
pub use driver::{BusError, LineSetup, SortingLine};
pub use protocol::ProtocolError;
pub use serial::{SerialError, SerialTransport};

#[cfg(feature = "serialport")]
pub use driver::SortingLineBuilder;
