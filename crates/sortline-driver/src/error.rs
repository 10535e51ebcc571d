//! 总线错误类型定义

use sortline_protocol::ProtocolError;
use sortline_serial::SerialError;
use thiserror::Error;

/// 总线事务错误
///
/// `TransportOpenFailed` 只会在启动时出现（控制器不可达，致命）；
/// 其余错误都是单次事务级别的，调用方在下一个周期重新采样即可。
#[derive(Error, Debug)]
pub enum BusError {
    /// 控制器拒绝了写命令
    #[error("Controller rejected write command")]
    Nack,

    /// 读响应校验和不匹配
    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// 超时前收到的字节数不足一个完整响应
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// 无法打开串口
    #[error("Failed to open transport: {0}")]
    TransportOpenFailed(String),

    /// 串口 IO 错误
    #[error("Transport error: {0}")]
    Io(#[from] SerialError),

    /// 其他协议错误（帧格式）
    #[error("Protocol error: {0}")]
    Protocol(ProtocolError),
}

impl From<ProtocolError> for BusError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::Nack { .. } => BusError::Nack,
            ProtocolError::ChecksumMismatch { expected, actual } => {
                BusError::ChecksumMismatch { expected, actual }
            },
            other => BusError::Protocol(other),
        }
    }
}

impl BusError {
    /// 是否为单次事务级错误（下一个周期可自行恢复）
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            BusError::Nack | BusError::ChecksumMismatch { .. } | BusError::ShortRead { .. }
        )
    }
}
