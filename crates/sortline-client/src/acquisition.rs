//! 图像采集接口
//!
//! 皮带到位后同步调用一次，采集并处理一帧图像。
//! 实现者自行持有相机句柄，同步核心不关心其内部。

use crate::types::ShapeLabel;

/// 图像采集与处理
pub trait ImageAcquirer {
    /// 采集一帧并返回识别出的形状
    fn acquire_and_process(&mut self) -> ShapeLabel;
}

impl<F> ImageAcquirer for F
where
    F: FnMut() -> ShapeLabel,
{
    fn acquire_and_process(&mut self) -> ShapeLabel {
        self()
    }
}
