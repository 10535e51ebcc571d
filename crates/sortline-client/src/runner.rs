//! 同步循环
//!
//! 按固定周期反复调用 [`ControllerSession::tick`]，直到停止标志置位或达到周期上限。
//! 单个周期的总线错误只记录警告并跳过；可选地在连续错误超过阈值时退出。

use crate::acquisition::ImageAcquirer;
use crate::session::ControllerSession;
use crate::stats::SessionStats;
use sortline_driver::{BusError, BusMetricsSnapshot, SortingLine};
use sortline_serial::SerialTransport;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// 循环配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    /// 轮询周期
    pub poll_interval: Duration,
    /// 最多执行的周期数（`None` 表示直到停止标志置位）
    pub max_cycles: Option<u64>,
    /// 允许的最大连续错误数（`None` 表示不限制）
    pub max_consecutive_errors: Option<u32>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(30),
            max_cycles: None,
            max_consecutive_errors: None,
        }
    }
}

/// 循环错误
#[derive(Debug, Error)]
pub enum LoopError {
    /// 连续错误超过阈值
    #[error("Consecutive bus failures: {count}, last error: {last_error}")]
    ConsecutiveFailures {
        count: u32,
        #[source]
        last_error: Box<BusError>,
    },
}

/// 循环结束时的汇总
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// 本次循环执行的周期数
    pub cycles: u64,
    pub elapsed: Duration,
    /// 会话累计统计
    pub stats: SessionStats,
    pub metrics: BusMetricsSnapshot,
}

/// 运行同步循环
///
/// 使用绝对时间锚点计算下一个周期的开始时间，周期耗时超过轮询周期时不睡眠并重置锚点。
pub fn run_loop<T, A>(
    session: &mut ControllerSession,
    line: &mut SortingLine<T>,
    acquirer: &mut A,
    stop: &AtomicBool,
    config: &LoopConfig,
) -> Result<RunSummary, LoopError>
where
    T: SerialTransport,
    A: ImageAcquirer + ?Sized,
{
    let start = Instant::now();
    let mut cycles = 0u64;
    let mut error_count = 0u32;
    let mut next_tick = Instant::now();

    info!(
        "Sync loop started (poll interval {:?}, max cycles {:?})",
        config.poll_interval, config.max_cycles
    );

    while !stop.load(Ordering::Relaxed) {
        if config.max_cycles.is_some_and(|max| cycles >= max) {
            break;
        }
        // 轮询周期超出 Instant 可表示范围时不再等待
        next_tick = next_tick
            .checked_add(config.poll_interval)
            .unwrap_or_else(Instant::now);
        cycles += 1;

        match session.tick(line, acquirer) {
            Ok(_) => {
                error_count = 0;
            },
            Err(e) => {
                error_count += 1;
                if config.max_consecutive_errors.is_some_and(|max| error_count > max) {
                    error!("Consecutive bus failures ({}): {}. Aborting.", error_count, e);
                    return Err(LoopError::ConsecutiveFailures {
                        count: error_count,
                        last_error: Box::new(e),
                    });
                }
                warn!("Bus error ({}): {}, skipping cycle", error_count, e);
            },
        }

        let now = Instant::now();
        if next_tick > now {
            spin_sleep::sleep(next_tick - now);
        } else {
            debug!(
                "Sync loop overrun by {:?}",
                now.duration_since(next_tick)
            );
            next_tick = now;
        }
    }

    let summary = RunSummary {
        cycles,
        elapsed: start.elapsed(),
        stats: session.stats().clone(),
        metrics: line.metrics(),
    };
    info!(
        "Sync loop stopped after {} cycles: {} detected, {} acquired, {} bus errors",
        summary.cycles,
        summary.stats.objects_detected,
        summary.stats.objects_acquired,
        summary.stats.bus_errors
    );
    Ok(summary)
}
