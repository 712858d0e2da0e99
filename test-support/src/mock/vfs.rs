//! VFS 宿主设施的 Mock 实现
//!
//! 页大小固定 4096，时钟固定在 [`MOCK_NOW`]，当前任务以 root 身份运行。

use uapi::time::TimeSpec;
use vfs::VfsOps;

/// Mock 时钟返回的时间
pub const MOCK_NOW: TimeSpec = TimeSpec {
    tv_sec: 1_700_000_000,
    tv_nsec: 500_000_000,
};

/// Mock 页大小
pub const MOCK_PAGE_SIZE: usize = 4096;

/// Mock 的 VFS 宿主设施
pub struct MockVfsOps;

impl MockVfsOps {
    /// 创建 Mock 实例
    pub const fn new() -> Self {
        Self
    }
}

impl Default for MockVfsOps {
    fn default() -> Self {
        Self::new()
    }
}

impl VfsOps for MockVfsOps {
    fn page_size(&self) -> usize {
        MOCK_PAGE_SIZE
    }

    fn timespec_now(&self) -> TimeSpec {
        MOCK_NOW
    }

    fn current_fsuid(&self) -> u32 {
        0
    }

    fn current_fsgid(&self) -> u32 {
        0
    }
}

/// 全局 Mock 实例
pub static MOCK_VFS_OPS: MockVfsOps = MockVfsOps::new();
