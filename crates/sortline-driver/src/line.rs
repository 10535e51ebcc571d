//! 分拣线控制器访问
//!
//! 每次总线访问都是一个请求/响应事务：写出命令帧，然后在超时内读取 6 字节响应。
//! 事务失败不会自动重试，由调用方决定。

use crate::error::BusError;
use crate::metrics::{BusMetrics, BusMetricsSnapshot};
use crate::setup::{FeedbackSource, LaserChannel, LaserMask, LineSetup, Pusher, PusherOffsets};
use sortline_protocol::{
    Opcode, ProtocolError, RESPONSE_LEN, ReadCommand, ResponseFrame, WriteCommand, decode_read_value,
    decode_write_ack, join_position, split_position,
};
use sortline_serial::SerialTransport;
use std::sync::atomic::Ordering;
use tracing::{debug, info, trace};

/// 分拣线控制器
///
/// 独占一个串口传输。协议没有请求 ID，所有方法都需要 `&mut self`，
/// 从类型上保证同一时刻只有一个未完成的事务。
///
/// # Example
///
/// ```
/// use sortline_driver::SortingLine;
/// use sortline_serial::MockTransport;
///
/// let mut mock = MockTransport::new();
/// mock.push_position(20_000);
///
/// let mut line = SortingLine::new(mock);
/// assert_eq!(line.current_position().unwrap(), 20_000);
/// ```
pub struct SortingLine<T: SerialTransport> {
    transport: T,
    metrics: BusMetrics,
}

impl<T: SerialTransport> SortingLine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            metrics: BusMetrics::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// 获取指标快照
    pub fn metrics(&self) -> BusMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 执行一个事务：写出命令帧，读取完整响应
    fn transact(&mut self, frame: &[u8]) -> Result<ResponseFrame, BusError> {
        if let Err(e) = self.transport.write_all(frame) {
            self.metrics.io_errors.fetch_add(1, Ordering::Relaxed);
            return Err(e.into());
        }

        let mut response = [0u8; RESPONSE_LEN];
        let n = match self.transport.read_full(&mut response) {
            Ok(n) => n,
            Err(e) => {
                self.metrics.io_errors.fetch_add(1, Ordering::Relaxed);
                return Err(e.into());
            },
        };

        if n < RESPONSE_LEN {
            self.metrics.short_reads.fetch_add(1, Ordering::Relaxed);
            // 迟到的响应残片会错位到下一个事务，先清掉
            let dropped = self.transport.flush_input()?;
            debug!(
                "Short read: {} of {} bytes (dropped {} late bytes)",
                n, RESPONSE_LEN, dropped
            );
            return Err(BusError::ShortRead {
                expected: RESPONSE_LEN,
                actual: n,
            });
        }

        Ok(response)
    }

    /// 写寄存器
    pub fn write_register(&mut self, opcode: Opcode, value: u16) -> Result<(), BusError> {
        self.metrics.writes.fetch_add(1, Ordering::Relaxed);

        let frame = WriteCommand::new(opcode, value).to_bytes();
        let response = self.transact(&frame)?;
        if let Err(e) = decode_write_ack(&response) {
            self.metrics.nacks.fetch_add(1, Ordering::Relaxed);
            return Err(e.into());
        }

        trace!("write {:?} = {}", opcode, value);
        Ok(())
    }

    /// 读寄存器
    pub fn read_register(&mut self, opcode: Opcode) -> Result<u16, BusError> {
        self.metrics.reads.fetch_add(1, Ordering::Relaxed);

        let frame = ReadCommand::new(opcode).to_bytes();
        let response = self.transact(&frame)?;
        let value = decode_read_value(&response).inspect_err(|_| {
            self.metrics
                .checksum_mismatches
                .fetch_add(1, Ordering::Relaxed);
        })?;

        trace!("read {:?} -> {}", opcode, value);
        Ok(value)
    }

    /// 写 32 位位置（先高 16 位，后低 16 位）
    ///
    /// `high` 必须是寄存器对的高半部分，低半部分由 [`Opcode::low_half`] 确定。
    pub fn write_position(&mut self, high: Opcode, position: u32) -> Result<(), BusError> {
        let low = Self::low_register(high)?;
        let (high_word, low_word) = split_position(position);
        self.write_register(high, high_word)?;
        self.write_register(low, low_word)
    }

    /// 读 32 位位置（先高 16 位，后低 16 位）
    pub fn read_position(&mut self, high: Opcode) -> Result<u32, BusError> {
        let low = Self::low_register(high)?;
        let high_word = self.read_register(high)?;
        let low_word = self.read_register(low)?;
        Ok(join_position(high_word, low_word))
    }

    fn low_register(high: Opcode) -> Result<Opcode, BusError> {
        high.low_half().ok_or(BusError::Protocol(ProtocolError::InvalidOpcode {
            opcode: high.code(),
        }))
    }

    // ==================== 位置与事件 ====================

    /// 设置皮带目标位置
    pub fn set_target_position(&mut self, position: u32) -> Result<(), BusError> {
        self.write_position(Opcode::PositionHigh, position)
    }

    /// 读取当前皮带位置
    pub fn current_position(&mut self) -> Result<u32, BusError> {
        self.read_position(Opcode::PositionHigh)
    }

    /// 读取光电开关锁存的物体起始位置
    pub fn object_beginning_position(&mut self) -> Result<u32, BusError> {
        self.read_position(Opcode::ObjectBeginHigh)
    }

    /// 读取光电开关锁存的物体结束位置
    pub fn object_end_position(&mut self) -> Result<u32, BusError> {
        self.read_position(Opcode::ObjectEndHigh)
    }

    /// 皮带是否已到达目标位置（容差内）
    pub fn in_position(&mut self) -> Result<bool, BusError> {
        Ok(self.read_register(Opcode::InPosition)? == 1)
    }

    // ==================== 执行器 ====================

    /// 设置推杆动作位置（原始皮带坐标）
    pub fn set_pusher_position(&mut self, pusher: Pusher, position: u32) -> Result<(), BusError> {
        self.write_position(pusher.opcode(), position)
    }

    /// 让推杆在物体中点经过时动作（叠加推杆物理偏移）
    pub fn dispatch_pusher(
        &mut self,
        pusher: Pusher,
        midpoint: u32,
        offsets: &PusherOffsets,
    ) -> Result<(), BusError> {
        let position = midpoint.wrapping_add(offsets.offset(pusher));
        debug!("Pusher {:?} armed at {}", pusher, position);
        self.set_pusher_position(pusher, position)
    }

    pub fn set_light(&mut self, on: bool) -> Result<(), BusError> {
        self.write_register(Opcode::Light, u16::from(on))
    }

    pub fn set_laser(&mut self, channel: LaserChannel, on: bool) -> Result<(), BusError> {
        self.write_register(channel.opcode(), u16::from(on))
    }

    /// 按掩码设置全部三路激光（红、绿、蓝依次下发）
    pub fn set_lasers(&mut self, mask: LaserMask) -> Result<(), BusError> {
        for channel in LaserChannel::ALL {
            self.set_laser(channel, mask.contains(channel))?;
        }
        Ok(())
    }

    // ==================== 配置 ====================

    pub fn set_feedback(&mut self, source: FeedbackSource) -> Result<(), BusError> {
        self.write_register(Opcode::FeedbackSource, source as u16)
    }

    pub fn set_positioning_tolerance(&mut self, tolerance: u16) -> Result<(), BusError> {
        self.write_register(Opcode::PositioningTolerance, tolerance)
    }

    pub fn set_speed(&mut self, speed: u16) -> Result<(), BusError> {
        self.write_register(Opcode::Speed, speed)
    }

    pub fn set_mode(&mut self, mode: u16) -> Result<(), BusError> {
        self.write_register(Opcode::Mode, mode)
    }

    pub fn set_sorter_time(&mut self, time: u16) -> Result<(), BusError> {
        self.write_register(Opcode::SorterTime, time)
    }

    /// 设置分拣器固定位置
    pub fn set_sorter_position(&mut self, sorter: Pusher, position: u16) -> Result<(), BusError> {
        self.write_register(sorter.sorter_opcode(), position)
    }

    pub fn init(&mut self, code: u16) -> Result<(), BusError> {
        self.write_register(Opcode::Init, code)
    }

    /// 下发启动配置
    ///
    /// 顺序：速度、模式、分拣时间、（分拣器位置）、初始化、反馈源、（定位容差）、照明。
    pub fn apply_setup(&mut self, setup: &LineSetup) -> Result<(), BusError> {
        self.set_speed(setup.speed)?;
        self.set_mode(setup.mode)?;
        self.set_sorter_time(setup.sorter_time)?;
        if let Some(positions) = setup.sorter_positions {
            for sorter in Pusher::ALL {
                self.set_sorter_position(sorter, positions[sorter.index()])?;
            }
        }
        self.init(setup.init_code)?;
        self.set_feedback(setup.feedback)?;
        if let Some(tolerance) = setup.positioning_tolerance {
            self.set_positioning_tolerance(tolerance)?;
        }
        self.set_light(setup.light_on)?;

        info!(
            "Line configured: speed={}, sorter_time={}, feedback={:?}",
            setup.speed, setup.sorter_time, setup.feedback
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortline_protocol::{encode_ack, encode_read, encode_read_response, encode_write};
    use sortline_serial::{MockTransport, SimulatedLine};

    #[test]
    fn test_write_register_frames() {
        let mut mock = MockTransport::new();
        mock.push_ack();
        let mut line = SortingLine::new(mock);

        line.set_light(true).unwrap();
        assert_eq!(line.transport().written(), &[encode_write(46, 1).to_vec()]);
        assert_eq!(line.metrics().writes, 1);
    }

    #[test]
    fn test_set_target_position_splits_high_low() {
        let mut mock = MockTransport::new();
        mock.push_ack().push_ack();
        let mut line = SortingLine::new(mock);

        line.set_target_position(0x0001_86A0).unwrap();
        let written = line.transport().written();
        assert_eq!(written[0], encode_write(30, 0x0001).to_vec());
        assert_eq!(written[1], encode_write(31, 0x86A0).to_vec());
    }

    #[test]
    fn test_current_position_reads_high_then_low() {
        let mut mock = MockTransport::new();
        mock.push_position(0x0002_0003);
        let mut line = SortingLine::new(mock);

        assert_eq!(line.current_position().unwrap(), 0x0002_0003);
        let written = line.transport().written();
        assert_eq!(written[0], encode_read(30).to_vec());
        assert_eq!(written[1], encode_read(31).to_vec());
        assert_eq!(line.metrics().reads, 2);
    }

    #[test]
    fn test_position_pair_from_high_opcode() {
        let mut mock = MockTransport::new();
        mock.push_position(52_800);
        let mut line = SortingLine::new(mock);

        assert_eq!(line.read_position(Opcode::ObjectEndHigh).unwrap(), 52_800);
        let written = line.transport().written();
        assert_eq!(written[0], encode_read(36).to_vec());
        assert_eq!(written[1], encode_read(37).to_vec());
    }

    #[test]
    fn test_position_rejects_non_pair_opcode() {
        let mut line = SortingLine::new(MockTransport::new());

        assert!(matches!(
            line.read_position(Opcode::ObjectEndLow),
            Err(BusError::Protocol(ProtocolError::InvalidOpcode { opcode: 37 }))
        ));
        assert!(matches!(
            line.write_position(Opcode::Light, 1),
            Err(BusError::Protocol(ProtocolError::InvalidOpcode { opcode: 46 }))
        ));
        assert!(line.transport().written().is_empty());
        assert_eq!(line.metrics().transactions(), 0);
    }

    #[test]
    fn test_nack() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&[0xFF, 0, 0, 0, 0, 0]);
        let mut line = SortingLine::new(mock);

        assert!(matches!(line.set_speed(30), Err(BusError::Nack)));
        assert_eq!(line.metrics().nacks, 1);
    }

    #[test]
    fn test_short_read() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&encode_read_response(5)[..4]);
        let mut line = SortingLine::new(mock);

        match line.read_register(Opcode::InPosition) {
            Err(BusError::ShortRead { expected, actual }) => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 4);
            },
            other => panic!("Expected ShortRead, got {:?}", other),
        }
        assert_eq!(line.metrics().short_reads, 1);
    }

    #[test]
    fn test_no_response_is_short_read() {
        let mut line = SortingLine::new(MockTransport::new());
        assert!(matches!(
            line.set_light(false),
            Err(BusError::ShortRead { actual: 0, .. })
        ));
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut response = encode_read_response(1234);
        response[2] = response[2].wrapping_add(1);
        let mut mock = MockTransport::new();
        mock.push_bytes(&response);
        let mut line = SortingLine::new(mock);

        assert!(matches!(
            line.read_register(Opcode::Speed),
            Err(BusError::ChecksumMismatch { .. })
        ));
        assert_eq!(line.metrics().checksum_mismatches, 1);
    }

    #[test]
    fn test_in_position_flag() {
        let mut mock = MockTransport::new();
        mock.push_read(1).push_read(0).push_read(2);
        let mut line = SortingLine::new(mock);

        assert!(line.in_position().unwrap());
        assert!(!line.in_position().unwrap());
        // 只有 1 表示到位
        assert!(!line.in_position().unwrap());
    }

    #[test]
    fn test_set_lasers_mask() {
        let mut mock = MockTransport::new();
        mock.push_ack().push_ack().push_ack();
        let mut line = SortingLine::new(mock);

        line.set_lasers(LaserMask(0x05)).unwrap();
        let written = line.transport().written();
        assert_eq!(written[0], encode_write(47, 1).to_vec());
        assert_eq!(written[1], encode_write(48, 0).to_vec());
        assert_eq!(written[2], encode_write(49, 1).to_vec());
    }

    #[test]
    fn test_dispatch_pusher_adds_offset() {
        let sim = SimulatedLine::new();
        let mut line = SortingLine::new(sim);

        line.dispatch_pusher(Pusher::Two, 10_000, &PusherOffsets::default())
            .unwrap();
        assert_eq!(line.transport().pushers(), [0, 21_000, 0]);
    }

    #[test]
    fn test_apply_setup_against_simulator() {
        let mut line = SortingLine::new(SimulatedLine::new());
        let setup = LineSetup {
            positioning_tolerance: Some(5),
            ..LineSetup::default()
        };

        line.apply_setup(&setup).unwrap();
        let sim = line.transport();
        assert_eq!(sim.register(Opcode::Speed), Some(30));
        assert_eq!(sim.register(Opcode::Mode), Some(0));
        assert_eq!(sim.register(Opcode::SorterTime), Some(200));
        assert_eq!(sim.register(Opcode::Init), Some(2));
        assert_eq!(sim.register(Opcode::FeedbackSource), Some(1));
        assert_eq!(sim.register(Opcode::PositioningTolerance), Some(5));
        assert!(!sim.light_on());
        assert_eq!(line.metrics().writes, 7);
    }

    #[test]
    fn test_apply_setup_sorter_positions() {
        let mut line = SortingLine::new(SimulatedLine::new());
        let setup = LineSetup {
            sorter_positions: Some([7200, 10_200, 13_200]),
            ..LineSetup::default()
        };

        line.apply_setup(&setup).unwrap();
        let sim = line.transport();
        assert_eq!(sim.register(Opcode::Sorter1Position), Some(7200));
        assert_eq!(sim.register(Opcode::Sorter2Position), Some(10_200));
        assert_eq!(sim.register(Opcode::Sorter3Position), Some(13_200));
        assert_eq!(line.metrics().writes, 9);
    }

    #[test]
    fn test_ack_frame_with_noise_bytes() {
        let mut ack = encode_ack();
        ack[0] = 0x00;
        ack[4] = 0x33;
        let mut mock = MockTransport::new();
        mock.push_bytes(&ack);
        let mut line = SortingLine::new(mock);
        assert!(line.set_mode(0).is_ok());
    }
}
