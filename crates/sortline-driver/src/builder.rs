//! Builder 模式实现
//!
//! 提供链式构造基于真实串口的 `SortingLine` 的便捷方式。

use crate::error::BusError;
use crate::line::SortingLine;
use sortline_serial::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, SerialPortTransport};
use std::time::Duration;
use tracing::info;

/// SortingLine Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use sortline_driver::SortingLineBuilder;
///
/// let line = SortingLineBuilder::new()
///     .port("COM2")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SortingLineBuilder {
    /// 串口名称（如 "COM2" 或 "/dev/ttyUSB0"）
    port: Option<String>,
    /// 波特率（默认 57600）
    baud_rate: u32,
    /// 单次响应的读超时（默认 30ms）
    timeout: Duration,
}

impl Default for SortingLineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SortingLineBuilder {
    pub fn new() -> Self {
        Self {
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// 设置串口（必需）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 设置波特率（可选，默认 57600）
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// 设置读超时（可选，默认 30ms）
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 打开串口并创建 `SortingLine`
    ///
    /// # Errors
    /// - `BusError::TransportOpenFailed`: 未指定串口或串口无法打开
    pub fn build(self) -> Result<SortingLine<SerialPortTransport>, BusError> {
        let port = self
            .port
            .ok_or_else(|| BusError::TransportOpenFailed("no serial port specified".into()))?;

        let transport = SerialPortTransport::open_with(&port, self.baud_rate, self.timeout)
            .map_err(|e| BusError::TransportOpenFailed(e.to_string()))?;

        info!(
            "Opened {} at {} baud (timeout {:?})",
            port, self.baud_rate, self.timeout
        );
        Ok(SortingLine::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = SortingLineBuilder::new();
        assert_eq!(builder.baud_rate, 57_600);
        assert_eq!(builder.timeout, Duration::from_millis(30));
        assert!(builder.port.is_none());
    }

    #[test]
    fn test_build_without_port_fails() {
        let result = SortingLineBuilder::new().build();
        assert!(matches!(result, Err(BusError::TransportOpenFailed(_))));
    }

    #[test]
    fn test_build_missing_device_fails() {
        let result = SortingLineBuilder::new()
            .port("/dev/sortline-does-not-exist")
            .build();
        assert!(matches!(result, Err(BusError::TransportOpenFailed(_))));
    }
}
