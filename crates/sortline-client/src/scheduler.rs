//! 采集调度：计算每个周期的皮带目标位置

use crate::queue::PendingQueue;
use crate::types::{AcquisitionState, ObjectRecord};

/// 一个周期的目标位置规划结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPlan {
    pub target: u32,
    /// 目标对应的队首物体（空队列时为 `None`）
    pub head: Option<ObjectRecord>,
}

impl TargetPlan {
    pub fn state(&self) -> AcquisitionState {
        if self.head.is_some() {
            AcquisitionState::WaitingOnObject
        } else {
            AcquisitionState::Idle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionScheduler {
    /// 光电开关到相机视野中心的距离（编码器脉冲）
    pub camera_offset: u32,
    /// 空闲时目标位置领先当前位置的距离
    pub look_ahead: u32,
}

impl Default for AcquisitionScheduler {
    fn default() -> Self {
        Self {
            camera_offset: 3000,
            look_ahead: 500,
        }
    }
}

impl AcquisitionScheduler {
    pub fn new(camera_offset: u32, look_ahead: u32) -> Self {
        Self {
            camera_offset,
            look_ahead,
        }
    }

    /// 规划目标位置
    ///
    /// - 队列非空：队首物体中点移到相机下方（`midpoint + camera_offset`）
    /// - 队列为空：`current + look_ahead`，保持皮带持续前进
    ///
    /// 只查看队首，不移除。编码器计数回绕时加法同样回绕。
    pub fn plan_target(&self, current: u32, queue: &PendingQueue) -> TargetPlan {
        match queue.head() {
            Some(head) => TargetPlan {
                target: head.midpoint().wrapping_add(self.camera_offset),
                head: Some(*head),
            },
            None => TargetPlan {
                target: current.wrapping_add(self.look_ahead),
                head: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_centers_head_under_camera() {
        let scheduler = AcquisitionScheduler::default();
        let mut queue = PendingQueue::new();
        queue.push(ObjectRecord::new(1000, 1500));
        queue.push(ObjectRecord::new(5000, 5600));

        let plan = scheduler.plan_target(20_000, &queue);
        assert_eq!(plan.target, 1250 + 3000);
        assert_eq!(plan.head, Some(ObjectRecord::new(1000, 1500)));
        assert_eq!(plan.state(), AcquisitionState::WaitingOnObject);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_idle_look_ahead() {
        let scheduler = AcquisitionScheduler::default();
        let plan = scheduler.plan_target(20_000, &PendingQueue::new());
        assert_eq!(plan.target, 20_500);
        assert_eq!(plan.state(), AcquisitionState::Idle);
    }

    #[test]
    fn test_wrapping_near_counter_limit() {
        let scheduler = AcquisitionScheduler::new(3000, 500);
        let plan = scheduler.plan_target(u32::MAX - 100, &PendingQueue::new());
        assert_eq!(plan.target, 399);

        let mut queue = PendingQueue::new();
        queue.push(ObjectRecord::new(u32::MAX - 1000, u32::MAX));
        let plan = scheduler.plan_target(0, &queue);
        assert_eq!(plan.target, (u32::MAX - 500).wrapping_add(3000));
    }
}
