//! `serialport` 后端
//!
//! 8 数据位、无校验、1 停止位；打开后拉高 DTR/RTS（控制器依赖这两根线上电）。

use crate::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT, SerialError, SerialTransport};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// 基于 `serialport` crate 的串口传输
pub struct SerialPortTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialPortTransport {
    /// 以默认参数（57600 8N1, 30ms 超时）打开串口
    pub fn open(path: &str) -> Result<Self, SerialError> {
        Self::open_with(path, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT)
    }

    /// 打开串口
    pub fn open_with(path: &str, baud_rate: u32, timeout: Duration) -> Result<Self, SerialError> {
        let open_error = |e: serialport::Error| SerialError::Open {
            port: path.to_string(),
            message: e.to_string(),
        };

        let mut port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(open_error)?;

        port.write_data_terminal_ready(true).map_err(open_error)?;
        port.write_request_to_send(true).map_err(open_error)?;

        debug!("Opened serial port {} @ {} baud", path, baud_rate);

        Ok(Self {
            port,
            name: path.to_string(),
        })
    }

    /// 串口名称
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SerialTransport for SerialPortTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        trace!("TX {:02X?}", data);
        Write::write_all(&mut self.port, data)?;
        Write::flush(&mut self.port)?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match Read::read(&mut self.port, buf) {
            Ok(n) => {
                trace!("RX {:02X?}", &buf[..n]);
                Ok(n)
            },
            // 超时不是错误：返回 0 字节，由上层判断是否短读
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(SerialError::Io(e)),
        }
    }
}
