//! 同步控制会话
//!
//! `ControllerSession` 持有一个周期到下一个周期之间的全部状态（边界锁存、待采集队列、
//! 调度状态、推杆轮转位置和统计），`tick` 执行一个完整周期：
//!
//! 1. 读取当前皮带位置
//! 2. 边界检测（新的完整物体入队）
//! 3. 规划并下发目标位置
//! 4. 等待中则查询到位标志，到位后开灯、稳定、采集，并移除队首
//!
//! 任何总线错误都会结束当前周期并返回给调用方。皮带和控制器自身保存状态，
//! 下个周期重新采样即可恢复，不在周期内重试。

use crate::acquisition::ImageAcquirer;
use crate::config::SyncConfig;
use crate::detector::{BoundaryDetector, BoundaryEvent};
use crate::queue::PendingQueue;
use crate::scheduler::AcquisitionScheduler;
use crate::stats::SessionStats;
use crate::types::{AcquisitionState, ObjectRecord, ShapeLabel};
use sortline_driver::{BusError, LaserChannel, LaserMask, Pusher, SortingLine};
use sortline_serial::SerialTransport;
use tracing::{debug, info, warn};

/// 一次完成的采集
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acquisition {
    /// 被采集（并已出队）的物体
    pub record: ObjectRecord,
    /// 照明下主采集的结果
    pub label: ShapeLabel,
    /// 追加曝光的结果（启用多次曝光时：无照明、红、绿、蓝）
    pub exposures: Vec<(LaserMask, ShapeLabel)>,
    /// 已下发动作位置的推杆（启用推杆分发时）
    pub pusher: Option<Pusher>,
}

/// 单个周期的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickOutcome {
    pub current_position: u32,
    pub target_position: u32,
    pub event: Option<BoundaryEvent>,
    pub acquired: Option<Acquisition>,
    /// 周期结束时的调度状态
    pub state: AcquisitionState,
}

pub type TickResult = Result<TickOutcome, BusError>;

/// 同步控制会话
///
/// # Example
///
/// ```
/// use sortline_client::{ControllerSession, ShapeLabel, SyncConfig};
/// use sortline_driver::SortingLine;
/// use sortline_serial::SimulatedLine;
///
/// let mut line = SortingLine::new(SimulatedLine::new().with_position(20_000));
/// let mut session = ControllerSession::new(SyncConfig::default());
/// let mut acquirer = || ShapeLabel::Unknown;
///
/// let outcome = session.tick(&mut line, &mut acquirer).unwrap();
/// assert_eq!(outcome.target_position, outcome.current_position + 500);
/// ```
#[derive(Debug, Clone)]
pub struct ControllerSession {
    config: SyncConfig,
    detector: BoundaryDetector,
    queue: PendingQueue,
    scheduler: AcquisitionScheduler,
    state: AcquisitionState,
    next_pusher: Pusher,
    stats: SessionStats,
}

impl Default for ControllerSession {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl ControllerSession {
    pub fn new(config: SyncConfig) -> Self {
        let scheduler = AcquisitionScheduler::new(config.camera_offset, config.look_ahead);
        Self {
            config,
            detector: BoundaryDetector::new(),
            queue: PendingQueue::new(),
            scheduler,
            state: AcquisitionState::Idle,
            next_pusher: Pusher::One,
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn detector(&self) -> &BoundaryDetector {
        &self.detector
    }

    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// 下一次分发使用的推杆
    pub fn next_pusher(&self) -> Pusher {
        self.next_pusher
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// 用控制器寄存器的当前值初始化边界锁存（启动时调用一次）
    pub fn prime<T: SerialTransport>(&mut self, line: &mut SortingLine<T>) -> Result<(), BusError> {
        self.detector.prime(line)?;
        let latch = self.detector.latch();
        info!(
            "Boundary latch primed: begin={}, end={}",
            latch.last_begin, latch.last_end
        );
        Ok(())
    }

    /// 执行一个同步周期
    pub fn tick<T, A>(&mut self, line: &mut SortingLine<T>, acquirer: &mut A) -> TickResult
    where
        T: SerialTransport,
        A: ImageAcquirer + ?Sized,
    {
        self.stats.cycles += 1;
        let result = self.step(line, acquirer);
        if result.is_err() {
            self.stats.bus_errors += 1;
        }
        result
    }

    fn step<T, A>(&mut self, line: &mut SortingLine<T>, acquirer: &mut A) -> TickResult
    where
        T: SerialTransport,
        A: ImageAcquirer + ?Sized,
    {
        let current_position = line.current_position()?;

        let event = self.detector.poll(line)?;
        if let Some(BoundaryEvent::Ended(record)) = event {
            self.queue.push(record);
            self.stats.objects_detected += 1;
        }

        let plan = self.scheduler.plan_target(current_position, &self.queue);
        if plan.head.is_some() {
            self.state = AcquisitionState::WaitingOnObject;
        }
        line.set_target_position(plan.target)?;

        debug!(
            "tick: current={}, target={}, pending={}, state={:?}",
            current_position,
            plan.target,
            self.queue.len(),
            self.state
        );

        let mut acquired = None;
        if self.state == AcquisitionState::WaitingOnObject && line.in_position()? {
            acquired = self.acquire_head(line, acquirer, current_position)?;
        }

        Ok(TickOutcome {
            current_position,
            target_position: plan.target,
            event,
            acquired,
            state: self.state,
        })
    }

    /// 到位后采集队首物体
    ///
    /// 主采集完成后立即出队，之后的追加曝光和推杆命令失败不会导致重复采集。
    fn acquire_head<T, A>(
        &mut self,
        line: &mut SortingLine<T>,
        acquirer: &mut A,
        current_position: u32,
    ) -> Result<Option<Acquisition>, BusError>
    where
        T: SerialTransport,
        A: ImageAcquirer + ?Sized,
    {
        info!("Image acquisition at {}", current_position);
        line.set_light(true)?;
        spin_sleep::sleep(self.config.settle_delay());
        let label = acquirer.acquire_and_process();

        self.state = AcquisitionState::Idle;
        let Some(record) = self.queue.pop() else {
            warn!("Acquisition completed with an empty queue");
            return Ok(None);
        };
        self.stats.objects_acquired += 1;
        self.stats.record_label(label);
        info!(
            "Object [{}, {}] acquired: {}",
            record.beginning_position, record.end_position, label
        );

        let mut acquisition = Acquisition {
            record,
            label,
            exposures: Vec::new(),
            pusher: None,
        };

        if self.config.extensions.rgb_exposures {
            acquisition.exposures = self.rgb_exposures(line, acquirer)?;
        }

        if self.config.extensions.pusher_dispatch {
            let pusher = self.next_pusher;
            line.dispatch_pusher(
                pusher,
                record.midpoint(),
                &self.config.extensions.pusher_offsets,
            )?;
            self.next_pusher = pusher.next();
            acquisition.pusher = Some(pusher);
        }

        Ok(Some(acquisition))
    }

    /// 追加曝光：关灯采集一次，然后红、绿、蓝激光各采集一次，最后关闭激光
    fn rgb_exposures<T, A>(
        &mut self,
        line: &mut SortingLine<T>,
        acquirer: &mut A,
    ) -> Result<Vec<(LaserMask, ShapeLabel)>, BusError>
    where
        T: SerialTransport,
        A: ImageAcquirer + ?Sized,
    {
        let delay = self.config.extensions.exposure_delay();
        let mut exposures = Vec::with_capacity(4);

        line.set_light(false)?;
        spin_sleep::sleep(delay);
        exposures.push((LaserMask::OFF, acquirer.acquire_and_process()));

        for channel in LaserChannel::ALL {
            let mask = LaserMask::only(channel);
            line.set_lasers(mask)?;
            spin_sleep::sleep(delay);
            exposures.push((mask, acquirer.acquire_and_process()));
        }

        line.set_lasers(LaserMask::OFF)?;
        Ok(exposures)
    }
}
