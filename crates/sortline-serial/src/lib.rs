//! # Sortline Serial Transport Layer
//!
//! 串口硬件抽象层，提供统一的字节流收发接口。
//!
//! 上层只依赖 [`SerialTransport`] 的读写约定：
//! - `write_all` 写出完整命令帧
//! - `read` 最多阻塞一个超时周期，返回实际到达的字节数（可能少于请求值，也可能为 0）

use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "serialport")]
pub mod port;

#[cfg(feature = "serialport")]
pub use port::SerialPortTransport;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;

#[cfg(any(test, feature = "mock"))]
pub mod sim;

#[cfg(any(test, feature = "mock"))]
pub use sim::{SimFault, SimulatedLine};

/// 默认波特率（控制器固定 57600 8N1）
pub const DEFAULT_BAUD_RATE: u32 = 57_600;

/// 默认读超时
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(30);

/// 串口层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not open serial port {port}: {message}")]
    Open { port: String, message: String },
}

/// 字节流传输
///
/// 协议没有请求 ID，调用方必须保证同一时刻只有一个未完成的请求/响应对。
pub trait SerialTransport {
    /// 写出全部字节
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError>;

    /// 读取最多 `buf.len()` 字节，超时返回已到达的字节数（可能为 0）
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;

    /// 读满缓冲区，或在某次读取返回 0 字节（超时）时停止
    ///
    /// 返回实际读取的字节数。
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }

    /// 丢弃输入缓冲区中残留的字节
    ///
    /// 返回丢弃的字节数。
    fn flush_input(&mut self) -> Result<usize, SerialError> {
        let mut scratch = [0u8; 16];
        let mut dropped = 0;
        loop {
            let n = self.read(&mut scratch)?;
            if n == 0 {
                return Ok(dropped);
            }
            dropped += n;
        }
    }
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        (**self).write_all(data)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        (**self).read(buf)
    }
}
