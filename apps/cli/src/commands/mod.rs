//! 命令定义和实现

pub mod actuate;
pub mod config;
pub mod run;
pub mod simulate;
pub mod status;

pub use actuate::{LaserCommand, LightCommand, PusherCommand, TargetCommand};
pub use config::ConfigCommand;
pub use run::RunCommand;
pub use simulate::SimulateCommand;
pub use status::StatusCommand;
