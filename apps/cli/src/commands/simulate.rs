//! simulate 命令
//!
//! 在进程内模拟控制器，随机放置物体并运行完整的同步循环，用于无硬件调试

use anyhow::{Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use sortline_client::{ControllerSession, LoopConfig, ShapeLabel, run_loop};
use sortline_driver::SortingLine;
use sortline_serial::SimulatedLine;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::config::CliConfig;
use crate::utils::print_summary;

/// 模拟起始位置（在第一个物体之前留出空闲段）
const START_POSITION: u32 = 10_000;

#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// 放置的物体数
    #[arg(short = 'n', long, default_value_t = 10)]
    pub objects: u32,

    /// 随机种子（复现同一组物体）
    #[arg(long)]
    pub seed: Option<u64>,

    /// 每次位置查询皮带最多前进的脉冲数（不应超过物体最小间隙，否则会丢失边沿）
    #[arg(long, default_value_t = 100)]
    pub step: u32,

    /// 按配置的稳定时间和轮询周期实时运行
    #[arg(long)]
    pub realtime: bool,

    /// 周期上限
    #[arg(long, default_value_t = 100_000)]
    pub max_cycles: u64,
}

impl SimulateCommand {
    pub fn execute(&self, config: &CliConfig) -> Result<()> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut sim = SimulatedLine::new()
            .with_position(START_POSITION)
            .with_step(self.step.max(1));
        let mut leading = START_POSITION;
        for _ in 0..self.objects {
            leading += rng.gen_range(1_200..3_000);
            sim.place_object(leading, rng.gen_range(300..1_000));
        }
        println!("🧪 模拟 {} 个物体，皮带起点 {}", self.objects, START_POSITION);

        let mut sync = config.sync.clone();
        if !self.realtime {
            sync.settle_delay_ms = 0;
            sync.poll_interval_ms = 0;
            sync.extensions.exposure_delay_ms = 0;
        }

        let mut line = SortingLine::new(sim);
        line.apply_setup(&config.line)?;
        let mut session = ControllerSession::new(sync.clone());
        session.prime(&mut line)?;

        let stop = Arc::new(AtomicBool::new(false));
        let handler_stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            handler_stop.store(true, Ordering::Relaxed);
        })
        .context("无法注册 Ctrl-C 处理")?;

        // 每个物体的采集次数（主采集 + 追加曝光）
        let calls_per_object: u64 = if sync.extensions.rgb_exposures { 5 } else { 1 };
        let expected_calls = u64::from(self.objects) * calls_per_object;
        let calls = AtomicU64::new(0);
        let mut acquirer = || {
            let label = *ShapeLabel::ALL.choose(&mut rng).unwrap_or(&ShapeLabel::Unknown);
            if calls.fetch_add(1, Ordering::Relaxed) + 1 >= expected_calls {
                stop.store(true, Ordering::Relaxed);
            }
            label
        };

        let loop_config = LoopConfig {
            poll_interval: if self.realtime {
                sync.poll_interval()
            } else {
                Duration::ZERO
            },
            max_cycles: Some(self.max_cycles),
            max_consecutive_errors: None,
        };

        if self.objects == 0 {
            stop.store(true, Ordering::Relaxed);
        }
        let summary = run_loop(&mut session, &mut line, &mut acquirer, &stop, &loop_config)?;

        let sim = line.transport();
        println!("  皮带终点: {}", sim.position());
        println!("  未通过光电开关的物体: {}", sim.objects_on_belt());
        print_summary(&summary);
        Ok(())
    }
}
