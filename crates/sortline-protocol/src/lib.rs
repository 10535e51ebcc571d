//! # Sortline Protocol
//!
//! 分拣线运动控制器串口协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `opcode`: 操作码定义
//! - `nibble`: 16 位数值的半字节拆分
//! - `codec`: 命令帧构建与响应帧解析（含校验和）
//!
//! ## 帧格式
//!
//! 协议是 7-bit clean 的：除同步字节 `0xFF` 外，负载字节只使用 bit 0-6。
//!
//! ```text
//! 写命令 (7 字节):  FF | opcode+0x80 | n0 | n1 | n2 | n3 | checksum
//! 读命令 (3 字节):  FF | opcode+0xC0 | (opcode+0xC0) & 0x7F
//! 响应   (6 字节):  xx | b1 | b2 | b3 | b4 | b5
//! ```
//!
//! 每次交互都是一问一答，协议中没有请求 ID，因此同一时刻只能有一个未完成的请求。

pub mod codec;
pub mod nibble;
pub mod opcode;

// 重新导出常用类型
pub use codec::*;
pub use nibble::*;
pub use opcode::*;

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 写命令的应答不是确认模式（bytes[1] == 10 && bytes[2] == 10）
    #[error("Controller rejected write command (ack bytes: {b1}, {b2})")]
    Nack { b1: u8, b2: u8 },

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Invalid sync byte: 0x{byte:02X}")]
    InvalidSync { byte: u8 },

    #[error("Invalid opcode: {opcode}")]
    InvalidOpcode { opcode: u8 },

    #[error("Invalid frame length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
