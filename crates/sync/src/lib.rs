//! 同步原语
//!
//! 向宿主 VFS 模型和文件系统驱动提供基本的锁。
//!
//! 驱动本身不创建线程，但宿主可能在不同线程上并发地挂载/卸载不同实例，
//! 因此文件系统类型表、活动超级块列表等共享结构都用 [`SpinLock`] 保护。

#![no_std]

mod raw_spin_lock;
mod spin_lock;

pub use raw_spin_lock::RawSpinLock;
pub use spin_lock::{SpinLock, SpinLockGuard};

#[cfg(test)]
mod tests;
