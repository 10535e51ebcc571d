//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use sortline_sdk::prelude::*;
//! ```

// 客户端层
pub use crate::client::{
    AcquisitionState, BoundaryEvent, ControllerSession, ImageAcquirer, LoopConfig, LoopError,
    ObjectRecord, RunSummary, ShapeLabel, SyncConfig, TickOutcome, run_loop,
};

// 驱动层
pub use crate::driver::{
    FeedbackSource, LaserChannel, LaserMask, LineSetup, Pusher, PusherOffsets, SortingLine,
};
#[cfg(feature = "serialport")]
pub use crate::driver::SortingLineBuilder;

// 传输层
pub use crate::serial::SerialTransport;

// 错误类型
pub use crate::driver::BusError;
pub use crate::protocol::ProtocolError;
pub use crate::serial::SerialError;
