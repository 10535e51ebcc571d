//! 命令帧构建与响应帧解析
//!
//! 主机侧：`encode_write` / `encode_read` 构建命令帧，
//! `decode_write_ack` / `decode_read_value` 解析 6 字节响应。
//!
//! 控制器侧（模拟器和测试使用）：`parse_write_command` / `parse_read_command`
//! 解析命令帧，`encode_ack` / `encode_read_response` 构建响应。

use crate::ProtocolError;
use crate::nibble::NibbleWord;
use crate::opcode::Opcode;

/// 帧同步字节
pub const SYNC_BYTE: u8 = 0xFF;

/// 写命令标志（加在操作码上）
pub const WRITE_FLAG: u8 = 0x80;

/// 读命令标志（加在操作码上）
pub const READ_FLAG: u8 = 0xC0;

/// 写确认字节（响应 bytes[1] 和 bytes[2]）
pub const ACK_BYTE: u8 = 10;

/// 校验和掩码（协议 7-bit clean）
pub const CHECKSUM_MASK: u8 = 0x7F;

pub const WRITE_FRAME_LEN: usize = 7;
pub const READ_FRAME_LEN: usize = 3;
pub const RESPONSE_LEN: usize = 6;

/// 6 字节响应帧
pub type ResponseFrame = [u8; RESPONSE_LEN];

/// 写命令：操作码 + 16 位数值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriteCommand {
    pub opcode: u8,
    pub value: u16,
}

impl WriteCommand {
    pub fn new(opcode: Opcode, value: u16) -> Self {
        Self {
            opcode: opcode.code(),
            value,
        }
    }

    /// 转换为 7 字节线上帧
    pub fn to_bytes(self) -> [u8; WRITE_FRAME_LEN] {
        encode_write(self.opcode, self.value)
    }
}

/// 读命令：仅操作码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReadCommand {
    pub opcode: u8,
}

impl ReadCommand {
    pub fn new(opcode: Opcode) -> Self {
        Self {
            opcode: opcode.code(),
        }
    }

    /// 转换为 3 字节线上帧
    pub fn to_bytes(self) -> [u8; READ_FRAME_LEN] {
        encode_read(self.opcode)
    }
}

/// 命令类型（由命令帧第二个字节的高两位决定）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Write,
    Read,
}

impl CommandKind {
    /// 根据命令头字节判断命令类型
    ///
    /// 仅对操作码 < 64 有效（更大的操作码会与读标志重叠）。
    pub fn from_header(header: u8) -> Option<Self> {
        if header & READ_FLAG == READ_FLAG {
            Some(CommandKind::Read)
        } else if header & WRITE_FLAG == WRITE_FLAG {
            Some(CommandKind::Write)
        } else {
            None
        }
    }

    /// 该类型命令帧的总长度
    pub fn frame_len(self) -> usize {
        match self {
            CommandKind::Write => WRITE_FRAME_LEN,
            CommandKind::Read => READ_FRAME_LEN,
        }
    }
}

/// 写命令校验和：`(n0 + n1 + n2 + n3 + 0x80 + opcode) & 0x7F`
pub fn write_checksum(opcode: u8, nibbles: [u8; 4]) -> u8 {
    nibbles
        .iter()
        .fold(WRITE_FLAG.wrapping_add(opcode), |acc, n| acc.wrapping_add(*n))
        & CHECKSUM_MASK
}

/// 读响应校验和：`(b1 + b2 + b3 + b4) & 0x7F`
pub fn read_checksum(payload: [u8; 4]) -> u8 {
    payload.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)) & CHECKSUM_MASK
}

/// 构建写命令帧
///
/// `[0xFF, opcode+0x80, n0, n1, n2, n3, checksum]`
pub fn encode_write(opcode: u8, value: u16) -> [u8; WRITE_FRAME_LEN] {
    let [n0, n1, n2, n3] = NibbleWord::from(value).to_wire();
    [
        SYNC_BYTE,
        opcode.wrapping_add(WRITE_FLAG),
        n0,
        n1,
        n2,
        n3,
        write_checksum(opcode, [n0, n1, n2, n3]),
    ]
}

/// 构建读命令帧
///
/// `[0xFF, opcode+0xC0, (opcode+0xC0) & 0x7F]`
pub fn encode_read(opcode: u8) -> [u8; READ_FRAME_LEN] {
    let header = opcode.wrapping_add(READ_FLAG);
    [SYNC_BYTE, header, header & CHECKSUM_MASK]
}

/// 解析写命令应答
///
/// 仅当 `bytes[1] == 10 && bytes[2] == 10` 时视为确认。
pub fn decode_write_ack(response: &ResponseFrame) -> Result<(), ProtocolError> {
    if response[1] == ACK_BYTE && response[2] == ACK_BYTE {
        Ok(())
    } else {
        Err(ProtocolError::Nack {
            b1: response[1],
            b2: response[2],
        })
    }
}

/// 解析读响应中的 16 位数值
///
/// 数值由 bytes[1..=4] 按半字节宽度（`<< 4`）从高到低依次拼接，
/// bytes[1] 为最低位。字节值超过 0x0F 时高位会与相邻半字节重叠，
/// 这里保持控制器固件约定的拼接方式，不做掩码。
pub fn decode_read_value(response: &ResponseFrame) -> Result<u16, ProtocolError> {
    let payload = [response[1], response[2], response[3], response[4]];

    let mut value = u16::from(payload[3]);
    value = (value << 4) | u16::from(payload[2]);
    value = (value << 4) | u16::from(payload[1]);
    value = (value << 4) | u16::from(payload[0]);

    let expected = read_checksum(payload);
    if response[5] != expected {
        return Err(ProtocolError::ChecksumMismatch {
            expected,
            actual: response[5],
        });
    }

    Ok(value)
}

// ============================================================================
// 控制器侧
// ============================================================================

/// 解析写命令帧（控制器侧）
pub fn parse_write_command(frame: &[u8; WRITE_FRAME_LEN]) -> Result<WriteCommand, ProtocolError> {
    if frame[0] != SYNC_BYTE {
        return Err(ProtocolError::InvalidSync { byte: frame[0] });
    }
    if CommandKind::from_header(frame[1]) != Some(CommandKind::Write) {
        return Err(ProtocolError::InvalidOpcode { opcode: frame[1] });
    }

    let opcode = frame[1].wrapping_sub(WRITE_FLAG);
    let nibbles = [frame[2], frame[3], frame[4], frame[5]];
    let expected = write_checksum(opcode, nibbles);
    if frame[6] != expected {
        return Err(ProtocolError::ChecksumMismatch {
            expected,
            actual: frame[6],
        });
    }

    let value = nibbles
        .iter()
        .rev()
        .fold(0u16, |acc, n| (acc << 4) | u16::from(n & 0x0F));

    Ok(WriteCommand { opcode, value })
}

/// 解析读命令帧（控制器侧）
pub fn parse_read_command(frame: &[u8; READ_FRAME_LEN]) -> Result<ReadCommand, ProtocolError> {
    if frame[0] != SYNC_BYTE {
        return Err(ProtocolError::InvalidSync { byte: frame[0] });
    }
    if CommandKind::from_header(frame[1]) != Some(CommandKind::Read) {
        return Err(ProtocolError::InvalidOpcode { opcode: frame[1] });
    }

    let expected = frame[1] & CHECKSUM_MASK;
    if frame[2] != expected {
        return Err(ProtocolError::ChecksumMismatch {
            expected,
            actual: frame[2],
        });
    }

    Ok(ReadCommand {
        opcode: frame[1].wrapping_sub(READ_FLAG),
    })
}

/// 写确认响应
pub fn encode_ack() -> ResponseFrame {
    [SYNC_BYTE, ACK_BYTE, ACK_BYTE, 0, 0, 0]
}

/// 读响应：`[0xFF, n0, n1, n2, n3, checksum]`
pub fn encode_read_response(value: u16) -> ResponseFrame {
    let payload = NibbleWord::from(value).to_wire();
    [
        SYNC_BYTE,
        payload[0],
        payload[1],
        payload[2],
        payload[3],
        read_checksum(payload),
    ]
}
