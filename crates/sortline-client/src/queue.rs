//! 待采集物体队列
//!
//! 插入顺序即检测顺序，也是必须的采集顺序（皮带单向运动）。

use crate::types::ObjectRecord;
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    records: VecDeque<ObjectRecord>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加到队尾
    pub fn push(&mut self, record: ObjectRecord) {
        self.records.push_back(record);
    }

    /// 查看队首（不移除）
    pub fn head(&self) -> Option<&ObjectRecord> {
        self.records.front()
    }

    /// 移除队首
    pub fn pop(&mut self) -> Option<ObjectRecord> {
        self.records.pop_front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = PendingQueue::new();
        for i in 0..5u32 {
            queue.push(ObjectRecord::new(i * 1000, i * 1000 + 400));
        }

        assert_eq!(queue.len(), 5);
        assert_eq!(queue.head(), Some(&ObjectRecord::new(0, 400)));

        let popped: Vec<u32> = std::iter::from_fn(|| queue.pop())
            .map(|r| r.beginning_position)
            .collect();
        assert_eq!(popped, vec![0, 1000, 2000, 3000, 4000]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_head_does_not_remove() {
        let mut queue = PendingQueue::new();
        queue.push(ObjectRecord::new(10, 20));
        assert!(queue.head().is_some());
        assert!(queue.head().is_some());
        assert_eq!(queue.len(), 1);
    }
}
