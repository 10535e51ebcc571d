//! 总线事务指标
//!
//! 原子计数器，`&self` 即可更新。

use std::sync::atomic::{AtomicU64, Ordering};

/// 总线事务计数器
#[derive(Debug, Default)]
pub struct BusMetrics {
    /// 写事务总数
    pub writes: AtomicU64,
    /// 读事务总数
    pub reads: AtomicU64,
    /// 写命令被拒绝次数
    pub nacks: AtomicU64,
    /// 读响应校验失败次数
    pub checksum_mismatches: AtomicU64,
    /// 短读次数（超时前响应不完整）
    pub short_reads: AtomicU64,
    /// 串口 IO 错误次数
    pub io_errors: AtomicU64,
}

impl BusMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> BusMetricsSnapshot {
        BusMetricsSnapshot {
            writes: self.writes.load(Ordering::Relaxed),
            reads: self.reads.load(Ordering::Relaxed),
            nacks: self.nacks.load(Ordering::Relaxed),
            checksum_mismatches: self.checksum_mismatches.load(Ordering::Relaxed),
            short_reads: self.short_reads.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BusMetricsSnapshot {
    pub writes: u64,
    pub reads: u64,
    pub nacks: u64,
    pub checksum_mismatches: u64,
    pub short_reads: u64,
    pub io_errors: u64,
}

impl BusMetricsSnapshot {
    /// 事务总数
    pub fn transactions(&self) -> u64 {
        self.writes + self.reads
    }

    /// 失败事务总数
    pub fn failures(&self) -> u64 {
        self.nacks + self.checksum_mismatches + self.short_reads + self.io_errors
    }

    /// 失败率（0.0 - 1.0），无事务时为 0
    pub fn failure_rate(&self) -> f64 {
        let total = self.transactions();
        if total == 0 {
            0.0
        } else {
            self.failures() as f64 / total as f64
        }
    }
}
