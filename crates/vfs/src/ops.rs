//! VFS 运行时操作 trait 定义和注册
//!
//! 此模块定义了 VFS 层需要的外部依赖接口（页大小、时钟、当前凭据），
//! 由宿主内核在启动时实现并注册；测试中由 `test-support` 提供 Mock 实现。

use core::sync::atomic::{AtomicUsize, Ordering};
use uapi::time::TimeSpec;

/// VFS 运行时操作
pub trait VfsOps: Send + Sync {
    // ========== 配置 ==========

    /// 获取页大小
    fn page_size(&self) -> usize;

    /// 获取页大小的位数（`1 << page_shift == page_size`）
    fn page_shift(&self) -> u8 {
        self.page_size().trailing_zeros() as u8
    }

    // ========== 时间 ==========

    /// 获取当前时间
    fn timespec_now(&self) -> TimeSpec;

    // ========== 凭据 ==========

    /// 当前任务的文件系统 UID
    fn current_fsuid(&self) -> u32;

    /// 当前任务的文件系统 GID
    fn current_fsgid(&self) -> u32;
}

// ========== VfsOps 注册 ==========

static VFS_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static VFS_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册 VFS 操作实现
///
/// # Safety
/// 必须在单线程环境下调用，且只能调用一次
pub unsafe fn register_vfs_ops(ops: &'static dyn VfsOps) {
    let ptr = ops as *const dyn VfsOps;
    // SAFETY: 将 fat pointer 拆分为 data 和 vtable 两部分存储
    let (data, vtable) =
        unsafe { core::mem::transmute::<*const dyn VfsOps, (usize, usize)>(ptr) };
    VFS_OPS_DATA.store(data, Ordering::Release);
    VFS_OPS_VTABLE.store(vtable, Ordering::Release);
}

/// 获取已注册的 VFS 操作实现
///
/// # Panics
/// 如果尚未调用 [`register_vfs_ops`] 注册实现，则 panic
#[inline]
pub fn vfs_ops() -> &'static dyn VfsOps {
    let data = VFS_OPS_DATA.load(Ordering::Acquire);
    let vtable = VFS_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("vfs: VfsOps not registered");
    }
    // SAFETY: 重组 fat pointer
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn VfsOps>((data, vtable)) }
}
