//! 会话统计

use crate::types::ShapeLabel;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// 已执行的周期数（含失败周期）
    pub cycles: u64,
    /// 因总线错误中断的周期数
    pub bus_errors: u64,
    /// 检测到的完整物体数
    pub objects_detected: u64,
    /// 完成采集的物体数
    pub objects_acquired: u64,
    /// 主采集返回的形状标签分布
    pub labels: BTreeMap<ShapeLabel, u64>,
}

impl SessionStats {
    pub fn record_label(&mut self, label: ShapeLabel) {
        *self.labels.entry(label).or_insert(0) += 1;
    }

    pub fn label_count(&self, label: ShapeLabel) -> u64 {
        self.labels.get(&label).copied().unwrap_or(0)
    }
}
