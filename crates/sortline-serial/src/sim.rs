//! 分拣线控制器模拟器
//!
//! 在进程内模拟运动控制器的寄存器行为，用于无硬件调试和集成测试：
//!
//! - 皮带单向运动：每次读取当前位置（高半字）时向目标位置前进最多 `step` 个脉冲
//! - 光电开关：物体前沿/后沿经过时分别锁存起始/结束寄存器
//! - 到位标志：`|current - target| <= tolerance`
//! - 照明、激光、推杆和配置寄存器记录最后一次写入值
//! - 一次性故障注入（截断、校验和损坏、NACK、无响应）
//!
//! 物体坐标是皮带坐标系下的编码器脉冲数，皮带停止时物体也随之停止。

use crate::{SerialError, SerialTransport};
use sortline_protocol::{
    CommandKind, Opcode, ResponseFrame, SYNC_BYTE, encode_ack, encode_read_response,
    join_position, parse_read_command, parse_write_command, split_position,
};
use std::collections::{BTreeMap, VecDeque};
use tracing::trace;

/// 一次性故障（作用于下一个响应）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// 只发送前 n 个字节
    Truncate(usize),
    /// 翻转校验和字节的最低位
    CorruptChecksum,
    /// 用非确认模式替换响应
    Nack,
    /// 不发送任何响应
    Silence,
}

/// 皮带上的物体
#[derive(Debug, Clone, Copy)]
struct PhysicalObject {
    leading: u32,
    trailing: u32,
    began: bool,
}

/// 分拣线控制器模拟器
#[derive(Debug)]
pub struct SimulatedLine {
    current: u32,
    target: u32,
    target_high: u16,
    step: u32,
    tolerance: u32,
    begin_register: u32,
    end_register: u32,
    objects: VecDeque<PhysicalObject>,
    light: bool,
    lasers: [bool; 3],
    pushers: [u32; 3],
    pusher_high: [u16; 3],
    registers: BTreeMap<u8, u16>,
    faults: VecDeque<SimFault>,
    incoming: Vec<u8>,
    rx: VecDeque<u8>,
    transactions: u64,
}

impl Default for SimulatedLine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedLine {
    /// 创建模拟器：皮带位于 0，每次位置查询前进 100 脉冲，到位容差 0
    pub fn new() -> Self {
        Self {
            current: 0,
            target: 0,
            target_high: 0,
            step: 100,
            tolerance: 0,
            begin_register: 0,
            end_register: 0,
            objects: VecDeque::new(),
            light: false,
            lasers: [false; 3],
            pushers: [0; 3],
            pusher_high: [0; 3],
            registers: BTreeMap::new(),
            faults: VecDeque::new(),
            incoming: Vec::new(),
            rx: VecDeque::new(),
            transactions: 0,
        }
    }

    /// 设置初始皮带位置（目标位置同步设置，皮带静止）
    pub fn with_position(mut self, position: u32) -> Self {
        self.current = position;
        self.target = position;
        self
    }

    /// 设置每次位置查询的最大前进量
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    /// 设置到位容差
    pub fn with_tolerance(mut self, tolerance: u32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// 设置光电开关寄存器的上电初值
    pub fn with_boundary_registers(mut self, begin: u32, end: u32) -> Self {
        self.begin_register = begin;
        self.end_register = end;
        self
    }

    /// 在皮带上放置一个物体
    ///
    /// `leading` 为前沿经过光电开关时的皮带位置，物体长度为 `length` 脉冲。
    /// 物体必须按前沿位置递增的顺序放置。
    pub fn place_object(&mut self, leading: u32, length: u32) -> &mut Self {
        self.objects.push_back(PhysicalObject {
            leading,
            trailing: leading.saturating_add(length),
            began: false,
        });
        self
    }

    /// 注入一次性故障（按注入顺序作用于后续响应）
    pub fn inject_fault(&mut self, fault: SimFault) -> &mut Self {
        self.faults.push_back(fault);
        self
    }

    pub fn position(&self) -> u32 {
        self.current
    }

    pub fn target(&self) -> u32 {
        self.target
    }

    pub fn begin_register(&self) -> u32 {
        self.begin_register
    }

    pub fn end_register(&self) -> u32 {
        self.end_register
    }

    pub fn light_on(&self) -> bool {
        self.light
    }

    /// 激光状态 `[red, green, blue]`
    pub fn lasers(&self) -> [bool; 3] {
        self.lasers
    }

    /// 推杆位置 `[pusher1, pusher2, pusher3]`
    pub fn pushers(&self) -> [u32; 3] {
        self.pushers
    }

    /// 其他寄存器（速度、模式等）最后一次写入值
    pub fn register(&self, opcode: Opcode) -> Option<u16> {
        self.registers.get(&opcode.code()).copied()
    }

    /// 尚未完全通过光电开关的物体数
    pub fn objects_on_belt(&self) -> usize {
        self.objects.len()
    }

    /// 已处理的命令数
    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    fn in_position(&self) -> bool {
        self.current.abs_diff(self.target) <= self.tolerance
    }

    /// 皮带前进一步并更新光电开关寄存器
    fn advance(&mut self) {
        if self.target > self.current {
            self.current += self.step.min(self.target - self.current);
        }

        while let Some(object) = self.objects.front_mut() {
            if !object.began && self.current >= object.leading {
                object.began = true;
                self.begin_register = object.leading;
            }
            if object.began && self.current >= object.trailing {
                self.end_register = object.trailing;
                self.objects.pop_front();
            } else {
                break;
            }
        }
    }

    fn handle_write(&mut self, frame: &[u8]) -> ResponseFrame {
        let Ok(frame) = <&[u8; 7]>::try_from(frame) else {
            return NACK;
        };
        let Ok(cmd) = parse_write_command(frame) else {
            return NACK;
        };
        let Ok(opcode) = Opcode::try_from(cmd.opcode) else {
            return NACK;
        };

        trace!("SIM write {:?} = {}", opcode, cmd.value);

        match opcode {
            Opcode::PositionHigh => self.target_high = cmd.value,
            Opcode::PositionLow => self.target = join_position(self.target_high, cmd.value),
            Opcode::Pusher1High => self.pusher_high[0] = cmd.value,
            Opcode::Pusher2High => self.pusher_high[1] = cmd.value,
            Opcode::Pusher3High => self.pusher_high[2] = cmd.value,
            Opcode::Pusher1Low => self.pushers[0] = join_position(self.pusher_high[0], cmd.value),
            Opcode::Pusher2Low => self.pushers[1] = join_position(self.pusher_high[1], cmd.value),
            Opcode::Pusher3Low => self.pushers[2] = join_position(self.pusher_high[2], cmd.value),
            Opcode::Light => self.light = cmd.value != 0,
            Opcode::LaserRed => self.lasers[0] = cmd.value != 0,
            Opcode::LaserGreen => self.lasers[1] = cmd.value != 0,
            Opcode::LaserBlue => self.lasers[2] = cmd.value != 0,
            Opcode::InPosition
            | Opcode::ObjectBeginHigh
            | Opcode::ObjectBeginLow
            | Opcode::ObjectEndHigh
            | Opcode::ObjectEndLow => return NACK,
            _ => {
                self.registers.insert(opcode.code(), cmd.value);
            },
        }

        encode_ack()
    }

    fn handle_read(&mut self, frame: &[u8]) -> ResponseFrame {
        let Ok(frame) = <&[u8; 3]>::try_from(frame) else {
            return NACK;
        };
        let Ok(cmd) = parse_read_command(frame) else {
            return NACK;
        };

        let value = match Opcode::try_from(cmd.opcode) {
            Ok(Opcode::PositionHigh) => {
                self.advance();
                split_position(self.current).0
            },
            Ok(Opcode::PositionLow) => split_position(self.current).1,
            Ok(Opcode::InPosition) => u16::from(self.in_position()),
            Ok(Opcode::ObjectBeginHigh) => split_position(self.begin_register).0,
            Ok(Opcode::ObjectBeginLow) => split_position(self.begin_register).1,
            Ok(Opcode::ObjectEndHigh) => split_position(self.end_register).0,
            Ok(Opcode::ObjectEndLow) => split_position(self.end_register).1,
            Ok(opcode) => self.register(opcode).unwrap_or(0),
            Err(_) => 0,
        };

        trace!("SIM read {} -> {}", cmd.opcode, value);
        encode_read_response(value)
    }

    fn respond(&mut self, mut response: ResponseFrame) {
        let len = match self.faults.pop_front() {
            None => response.len(),
            Some(SimFault::Truncate(n)) => n.min(response.len()),
            Some(SimFault::CorruptChecksum) => {
                response[5] ^= 0x01;
                response.len()
            },
            Some(SimFault::Nack) => {
                response = NACK;
                response.len()
            },
            Some(SimFault::Silence) => 0,
        };
        self.rx.extend(response[..len].iter().copied());
    }

    fn process_incoming(&mut self) {
        loop {
            // 丢弃同步字节之前的噪声
            let skip = self
                .incoming
                .iter()
                .position(|b| *b == SYNC_BYTE)
                .unwrap_or(self.incoming.len());
            self.incoming.drain(..skip);

            if self.incoming.len() < 2 {
                return;
            }

            let Some(kind) = CommandKind::from_header(self.incoming[1]) else {
                self.incoming.remove(0);
                continue;
            };

            let len = kind.frame_len();
            if self.incoming.len() < len {
                return;
            }

            let frame: Vec<u8> = self.incoming.drain(..len).collect();
            self.transactions += 1;
            let response = match kind {
                CommandKind::Write => self.handle_write(&frame),
                CommandKind::Read => self.handle_read(&frame),
            };
            self.respond(response);
        }
    }
}

const NACK: ResponseFrame = [SYNC_BYTE, 0, 0, 0, 0, 0];

impl SerialTransport for SimulatedLine {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.incoming.extend_from_slice(data);
        self.process_incoming();
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
    use sortline_protocol::{decode_read_value, decode_write_ack, encode_read, encode_write};

    fn read_value(sim: &mut SimulatedLine, opcode: Opcode) -> u16 {
        sim.write_all(&encode_read(opcode.code())).unwrap();
        let mut buf = [0u8; 6];
        assert_eq!(sim.read_full(&mut buf).unwrap(), 6);
        decode_read_value(&buf).unwrap()
    }

    fn write_value(sim: &mut SimulatedLine, opcode: Opcode, value: u16) {
        sim.write_all(&encode_write(opcode.code(), value)).unwrap();
        let mut buf = [0u8; 6];
        assert_eq!(sim.read_full(&mut buf).unwrap(), 6);
        decode_write_ack(&buf).unwrap();
    }

    fn set_target(sim: &mut SimulatedLine, target: u32) {
        let (high, low) = split_position(target);
        write_value(sim, Opcode::PositionHigh, high);
        write_value(sim, Opcode::PositionLow, low);
    }

    fn current(sim: &mut SimulatedLine) -> u32 {
        let high = read_value(sim, Opcode::PositionHigh);
        let low = read_value(sim, Opcode::PositionLow);
        join_position(high, low)
    }

    #[test]
    fn test_belt_moves_toward_target() {
        let mut sim = SimulatedLine::new().with_position(1000).with_step(100);
        set_target(&mut sim, 1250);

        assert_eq!(current(&mut sim), 1100);
        assert_eq!(current(&mut sim), 1200);
        assert_eq!(current(&mut sim), 1250);
        assert_eq!(current(&mut sim), 1250);
        assert_eq!(read_value(&mut sim, Opcode::InPosition), 1);
    }

    #[test]
    fn test_belt_never_moves_backwards() {
        let mut sim = SimulatedLine::new().with_position(5000);
        set_target(&mut sim, 4000);
        assert_eq!(current(&mut sim), 5000);
    }

    #[test]
    fn test_photocell_latches_edges() {
        let mut sim = SimulatedLine::new().with_position(0).with_step(100);
        sim.place_object(150, 100);
        set_target(&mut sim, 1000);

        current(&mut sim); // 100
        assert_eq!(sim.begin_register(), 0);
        current(&mut sim); // 200
        assert_eq!(sim.begin_register(), 150);
        assert_eq!(sim.end_register(), 0);
        current(&mut sim); // 300
        assert_eq!(sim.end_register(), 250);
        assert_eq!(sim.objects_on_belt(), 0);
    }

    #[test]
    fn test_actuator_registers() {
        let mut sim = SimulatedLine::new();
        write_value(&mut sim, Opcode::Light, 1);
        write_value(&mut sim, Opcode::LaserGreen, 1);
        write_value(&mut sim, Opcode::Pusher2High, 0);
        write_value(&mut sim, Opcode::Pusher2Low, 12_345);
        write_value(&mut sim, Opcode::Speed, 30);

        assert!(sim.light_on());
        assert_eq!(sim.lasers(), [false, true, false]);
        assert_eq!(sim.pushers(), [0, 12_345, 0]);
        assert_eq!(sim.register(Opcode::Speed), Some(30));
        assert_eq!(read_value(&mut sim, Opcode::Speed), 30);
    }

    #[test]
    fn test_fault_injection() {
        let mut sim = SimulatedLine::new();
        sim.inject_fault(SimFault::Truncate(4))
            .inject_fault(SimFault::CorruptChecksum);

        sim.write_all(&encode_read(Opcode::Speed.code())).unwrap();
        let mut buf = [0u8; 6];
        assert_eq!(sim.read_full(&mut buf).unwrap(), 4);

        sim.write_all(&encode_read(Opcode::Speed.code())).unwrap();
        assert_eq!(sim.read_full(&mut buf).unwrap(), 6);
        assert!(decode_read_value(&buf).is_err());

        // 故障只生效一次
        assert_eq!(read_value(&mut sim, Opcode::Speed), 0);
        assert_eq!(sim.transactions(), 3);
    }

    #[test]
    fn test_nack_for_read_only_register() {
        let mut sim = SimulatedLine::new();
        sim.write_all(&encode_write(Opcode::InPosition.code(), 1))
            .unwrap();
        let mut buf = [0u8; 6];
        assert_eq!(sim.read_full(&mut buf).unwrap(), 6);
        assert!(decode_write_ack(&buf).is_err());
    }

    #[test]
    fn test_noise_before_sync_is_skipped() {
        let mut sim = SimulatedLine::new().with_position(42);
        sim.write_all(&[0x00, 0x12]).unwrap();
        assert_eq!(current(&mut sim), 42);
    }
}
