//! 宿主分配路径上的故障注入
//!
//! 每个注入点是一次性的：被触发一次后自动复位。

use core::sync::atomic::{AtomicBool, Ordering};

/// 注入点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
    /// 超级块分配
    AllocSuper,
    /// `new_inode`
    NewInode,
    /// `d_make_root`
    DMakeRoot,
}

const NR_POINTS: usize = 3;

/// 故障注入器
#[derive(Debug, Default)]
pub struct FaultInjector {
    armed: [AtomicBool; NR_POINTS],
}

impl FaultInjector {
    /// 创建未布置任何故障的注入器
    pub const fn new() -> Self {
        Self {
            armed: [const { AtomicBool::new(false) }; NR_POINTS],
        }
    }

    /// 令 `point` 的下一次调用失败
    pub fn arm(&self, point: FaultPoint) {
        self.armed[point as usize].store(true, Ordering::Release);
    }

    /// 撤销所有尚未触发的故障
    pub fn disarm_all(&self) {
        for flag in &self.armed {
            flag.store(false, Ordering::Release);
        }
    }

    /// 检查并消耗 `point` 上的故障
    pub(crate) fn should_fail(&self, point: FaultPoint) -> bool {
        self.armed[point as usize].swap(false, Ordering::AcqRel)
    }
}
