//! 脚本化 Mock 传输
//!
//! 预先排入响应字节，记录所有写出的帧。读不到数据时表现为超时（返回 0）。

use crate::{SerialError, SerialTransport};
use sortline_protocol::{encode_ack, encode_read_response};
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    written: Vec<Vec<u8>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 排入原始响应字节
    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.rx.extend(bytes.iter().copied());
        self
    }

    /// 排入一个写确认
    pub fn push_ack(&mut self) -> &mut Self {
        self.push_bytes(&encode_ack())
    }

    /// 排入一个 16 位读响应
    pub fn push_read(&mut self, value: u16) -> &mut Self {
        self.push_bytes(&encode_read_response(value))
    }

    /// 排入一个 32 位位置（高半字、低半字两次读响应）
    pub fn push_position(&mut self, position: u32) -> &mut Self {
        self.push_read((position >> 16) as u16);
        self.push_read((position & 0xFFFF) as u16)
    }

    /// 所有写出的帧（按写入顺序）
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// 清空写出记录
    pub fn clear_written(&mut self) {
        self.written.clear();
    }

    /// 尚未被读取的响应字节数
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }
}

impl SerialTransport for MockTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.written.push(data.to_vec());
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_full_short() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&[1, 2, 3, 4]);

        let mut buf = [0u8; 6];
        let n = mock.read_full(&mut buf).unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf[..4], &[1, 2, 3, 4]);
        assert_eq!(mock.pending_rx(), 0);
    }

    #[test]
    fn test_read_full_leaves_following_frames() {
        let mut mock = MockTransport::new();
        mock.push_ack().push_read(7);

        let mut buf = [0u8; 6];
        assert_eq!(mock.read_full(&mut buf).unwrap(), 6);
        assert_eq!(buf, encode_ack());
        assert_eq!(mock.pending_rx(), 6);
    }

    #[test]
    fn test_flush_input_drops_everything() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&[0u8; 40]);
        assert_eq!(mock.flush_input().unwrap(), 40);
        assert_eq!(mock.pending_rx(), 0);
    }

    #[test]
    fn test_written_frames_recorded() {
        let mut mock = MockTransport::new();
        mock.write_all(&[0xFF, 0xDE, 0x5E]).unwrap();
        mock.write_all(&[0xFF, 0xDF, 0x5F]).unwrap();
        assert_eq!(mock.written().len(), 2);
        assert_eq!(mock.written()[1], vec![0xFF, 0xDF, 0x5F]);

        mock.clear_written();
        assert!(mock.written().is_empty());
    }
}
