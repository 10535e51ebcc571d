//! 半字节（nibble）拆分
//!
//! 写命令把 16 位数值拆成 4 个 4-bit 半字节，每个半字节单独占一个字节，
//! 顺序为低位在前（n0 = bit 0-3, n3 = bit 12-15）。

use bilge::prelude::*;

/// 16 位数值的半字节视图
///
/// bilge 默认使用 LSB first 位序，第一个字段对应 bit 0-3，与协议顺序一致。
#[bitsize(16)]
#[derive(FromBits, DebugBits, Clone, Copy, PartialEq, Eq)]
pub struct NibbleWord {
    pub n0: u4, // bit 0-3
    pub n1: u4, // bit 4-7
    pub n2: u4, // bit 8-11
    pub n3: u4, // bit 12-15
}

impl NibbleWord {
    /// 按线上顺序（n0..n3）返回 4 个半字节
    pub fn to_wire(self) -> [u8; 4] {
        [
            self.n0().value(),
            self.n1().value(),
            self.n2().value(),
            self.n3().value(),
        ]
    }
}

/// 合并两个 16 位寄存器为 32 位位置：`(high << 16) | low`
pub fn join_position(high: u16, low: u16) -> u32 {
    (u32::from(high) << 16) | u32::from(low)
}

/// 拆分 32 位位置为 `(high, low)`
pub fn split_position(position: u32) -> (u16, u16) {
    ((position >> 16) as u16, (position & 0xFFFF) as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_order_lsb_first() {
        let word = NibbleWord::from(0x1234u16);
        assert_eq!(word.to_wire(), [0x4, 0x3, 0x2, 0x1]);
        assert_eq!(u16::from(word), 0x1234);
    }

    #[test]
    fn test_nibble_extremes() {
        assert_eq!(NibbleWord::from(0u16).to_wire(), [0, 0, 0, 0]);
        assert_eq!(NibbleWord::from(0xFFFFu16).to_wire(), [0xF, 0xF, 0xF, 0xF]);
        assert_eq!(NibbleWord::from(0x000Fu16).to_wire(), [0xF, 0, 0, 0]);
        assert_eq!(NibbleWord::from(0xF000u16).to_wire(), [0, 0, 0, 0xF]);
    }

    #[test]
    fn test_join_split_position() {
        assert_eq!(join_position(0x0001, 0x86A0), 100_000);
        assert_eq!(split_position(100_000), (0x0001, 0x86A0));
        assert_eq!(split_position(u32::MAX), (0xFFFF, 0xFFFF));
        assert_eq!(join_position(0, 1500), 1500);
    }
}
