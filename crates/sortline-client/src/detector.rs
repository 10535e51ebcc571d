//! 物体边界检测状态机
//!
//! 控制器把光电开关的前沿/后沿位置锁存在寄存器里，只有出现新边沿时寄存器值才变化。
//! 因此这里按"值是否变化"而不是电平做边沿检测；重复读取未变化的寄存器不会产生事件。
//!
//! 状态严格交替：`OutOfObject` 只看起始寄存器，`InObject` 只看结束寄存器。

use crate::types::{BoundaryLatch, ObjectRecord, ScanningState};
use sortline_driver::{BusError, SortingLine};
use sortline_serial::SerialTransport;
use tracing::info;

/// 边界事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryEvent {
    /// 物体前沿经过光电开关（仅用于诊断，此时还不创建记录）
    Began { position: u32 },
    /// 物体后沿经过光电开关，记录已完整
    Ended(ObjectRecord),
}

#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    state: ScanningState,
    latch: BoundaryLatch,
}

impl BoundaryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以给定锁存值创建（状态为 `OutOfObject`）
    pub fn with_latch(latch: BoundaryLatch) -> Self {
        Self {
            state: ScanningState::OutOfObject,
            latch,
        }
    }

    pub fn state(&self) -> ScanningState {
        self.state
    }

    pub fn latch(&self) -> BoundaryLatch {
        self.latch
    }

    /// 处理一次起始寄存器读数
    ///
    /// 仅在 `OutOfObject` 状态且读数与锁存值不同时返回新的起始位置。
    pub fn observe_begin(&mut self, begin: u32) -> Option<u32> {
        if self.state != ScanningState::OutOfObject || begin == self.latch.last_begin {
            return None;
        }

        self.state = ScanningState::InObject;
        self.latch.last_begin = begin;
        Some(begin)
    }

    /// 处理一次结束寄存器读数
    ///
    /// 仅在 `InObject` 状态且读数与锁存值不同时返回完整记录。
    pub fn observe_end(&mut self, end: u32) -> Option<ObjectRecord> {
        if self.state != ScanningState::InObject || end == self.latch.last_end {
            return None;
        }

        self.state = ScanningState::OutOfObject;
        self.latch.last_end = end;
        Some(ObjectRecord::new(self.latch.last_begin, end))
    }

    /// 读取当前状态关心的寄存器并检测边沿
    ///
    /// 总线错误直接返回，状态与锁存值保持不变，下个周期重新读取即可。
    pub fn poll<T: SerialTransport>(
        &mut self,
        line: &mut SortingLine<T>,
    ) -> Result<Option<BoundaryEvent>, BusError> {
        match self.state {
            ScanningState::OutOfObject => {
                let begin = line.object_beginning_position()?;
                Ok(self.observe_begin(begin).map(|position| {
                    info!("Object beginning at {}", position);
                    BoundaryEvent::Began { position }
                }))
            },
            ScanningState::InObject => {
                let end = line.object_end_position()?;
                Ok(self.observe_end(end).map(|record| {
                    info!("Object end at {} (began at {})", record.end_position, record.beginning_position);
                    BoundaryEvent::Ended(record)
                }))
            },
        }
    }

    /// 用控制器当前的寄存器值初始化锁存
    ///
    /// 启动时寄存器里可能残留上次运行的边沿位置，不初始化会被误判为新物体。
    pub fn prime<T: SerialTransport>(&mut self, line: &mut SortingLine<T>) -> Result<(), BusError> {
        let last_begin = line.object_beginning_position()?;
        let last_end = line.object_end_position()?;
        self.latch = BoundaryLatch {
            last_begin,
            last_end,
        };
        self.state = ScanningState::OutOfObject;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortline_serial::{MockTransport, SimulatedLine};

    /// 按脚本喂入 (起始, 结束) 寄存器读数，收集产生的记录
    fn run_script(readings: &[(u32, u32)]) -> (Vec<ObjectRecord>, Vec<ScanningState>) {
        let mut detector = BoundaryDetector::new();
        let mut records = Vec::new();
        let mut states = vec![detector.state()];

        for &(begin, end) in readings {
            match detector.state() {
                ScanningState::OutOfObject => {
                    detector.observe_begin(begin);
                },
                ScanningState::InObject => {
                    if let Some(record) = detector.observe_end(end) {
                        records.push(record);
                    }
                },
            }
            if states.last() != Some(&detector.state()) {
                states.push(detector.state());
            }
        }
        (records, states)
    }

    #[test]
    fn test_single_object() {
        // 起始 0 -> 1000，结束 1 -> 1500
        let mut detector = BoundaryDetector::with_latch(BoundaryLatch {
            last_begin: 0,
            last_end: 1,
        });
        assert_eq!(detector.observe_begin(0), None);
        assert_eq!(detector.observe_begin(1000), Some(1000));
        assert_eq!(detector.observe_end(1), None);
        assert_eq!(
            detector.observe_end(1500),
            Some(ObjectRecord::new(1000, 1500))
        );
    }

    #[test]
    fn test_scripted_sequence_and_alternation() {
        let readings = [
            (0, 0),
            (1000, 0),
            (1000, 0),
            (1000, 1500),
            (1000, 1500),
            (2600, 1500),
            (2600, 3100),
            (4000, 3100),
            (4000, 4700),
        ];
        let (records, states) = run_script(&readings);

        assert_eq!(
            records,
            vec![
                ObjectRecord::new(1000, 1500),
                ObjectRecord::new(2600, 3100),
                ObjectRecord::new(4000, 4700),
            ]
        );
        for pair in states.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        assert_eq!(states.first(), Some(&ScanningState::OutOfObject));
        assert_eq!(states.len(), 7);
    }

    #[test]
    fn test_end_ignored_while_out_of_object() {
        let mut detector = BoundaryDetector::new();
        assert_eq!(detector.observe_end(500), None);
        assert_eq!(detector.latch().last_end, 0);
        assert_eq!(detector.state(), ScanningState::OutOfObject);
    }

    #[test]
    fn test_begin_ignored_while_in_object() {
        let mut detector = BoundaryDetector::new();
        assert_eq!(detector.observe_begin(100), Some(100));
        assert_eq!(detector.observe_begin(200), None);
        assert_eq!(detector.latch().last_begin, 100);
    }

    #[test]
    fn test_unchanged_register_is_noop() {
        let mut detector = BoundaryDetector::with_latch(BoundaryLatch {
            last_begin: 700,
            last_end: 900,
        });
        assert_eq!(detector.observe_begin(700), None);
        assert_eq!(detector.state(), ScanningState::OutOfObject);
    }

    #[test]
    fn test_poll_short_read_keeps_latch() {
        let mut mock = MockTransport::new();
        mock.push_bytes(&[0xFF, 1, 2, 3]);
        let mut line = SortingLine::new(mock);
        let mut detector = BoundaryDetector::new();

        assert!(matches!(
            detector.poll(&mut line),
            Err(BusError::ShortRead { actual: 4, .. })
        ));
        assert_eq!(detector.latch(), BoundaryLatch::default());
        assert_eq!(detector.state(), ScanningState::OutOfObject);
    }

    #[test]
    fn test_prime_ignores_stale_registers() {
        let sim = SimulatedLine::new().with_boundary_registers(52_000, 52_800);
        let mut line = SortingLine::new(sim);
        let mut detector = BoundaryDetector::new();

        detector.prime(&mut line).unwrap();
        assert_eq!(
            detector.latch(),
            BoundaryLatch {
                last_begin: 52_000,
                last_end: 52_800
            }
        );
        assert_eq!(detector.poll(&mut line).unwrap(), None);
    }
}
