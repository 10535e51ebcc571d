//! 分拣线同步核心
//!
//! 本模块把运动控制器的位置信息和光电开关事件与固定安装的相机同步：
//! - 边界检测状态机（寄存器值变化即边沿）
//! - 待采集物体 FIFO 队列
//! - 采集调度（物体中点移到相机下方，空闲时持续前进）
//! - 单周期 `tick` 与带停止标志的同步循环
//!
//! # 使用场景
//!
//! ```no_run
//! use sortline_client::{ControllerSession, LoopConfig, ShapeLabel, SyncConfig, run_loop};
//! use sortline_driver::{LineSetup, SortingLineBuilder};
//! use std::sync::atomic::AtomicBool;
//!
//! let mut line = SortingLineBuilder::new().port("COM2").build().unwrap();
//! line.apply_setup(&LineSetup::default()).unwrap();
//!
//! let mut session = ControllerSession::new(SyncConfig::default());
//! session.prime(&mut line).unwrap();
//!
//! let stop = AtomicBool::new(false);
//! let mut acquirer = || ShapeLabel::Unknown;
//! run_loop(&mut session, &mut line, &mut acquirer, &stop, &LoopConfig::default()).unwrap();
//! ```

pub mod acquisition;
pub mod config;
pub mod detector;
pub mod queue;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod types;

pub use acquisition::ImageAcquirer;
pub use config::{ExtensionConfig, SyncConfig};
pub use detector::{BoundaryDetector, BoundaryEvent};
pub use queue::PendingQueue;
pub use runner::{LoopConfig, LoopError, RunSummary, run_loop};
pub use scheduler::{AcquisitionScheduler, TargetPlan};
pub use session::{Acquisition, ControllerSession, TickOutcome, TickResult};
pub use stats::SessionStats;
pub use types::*;
