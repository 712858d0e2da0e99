//! 宿主虚拟文件系统层
//!
//! 此 crate 模拟文件系统驱动所依赖的宿主 VFS，包括：
//!
//! - [`Vfs`] - 文件系统类型表、挂载分派、无设备挂载原语
//! - [`FileSystemType`] trait - 驱动向宿主注册的类型接口
//! - [`SuperBlock`] / [`SuperOperations`] - 每次挂载的元数据及其回调
//! - [`Inode`] / [`Dentry`] - 节点对象与目录项
//! - [`libfs`] - 宿主提供的通用实现（`simple_statfs` 等）
//! - [`FaultInjector`] - 宿主分配路径上的故障注入
//!
//! 驱动不需要也不应该自己实现 inode 缓存、目录项缓存或页缓存，这些属于宿主。

#![no_std]
#![allow(clippy::module_inception)]

extern crate alloc;

pub mod error;
pub mod libfs;
pub mod ops;

mod dentry;
mod fault;
mod file_system;
mod inode;
mod mount;
mod super_block;
mod vfs;

// Re-export ops
pub use ops::{VfsOps, register_vfs_ops, vfs_ops};

// Re-export error
pub use error::FsError;

// Re-export inode
pub use inode::{
    DirEntry, FileMode, FileOperations, Inode, InodeMetadata, InodeOperations, InodeType,
};

// Re-export dentry
pub use dentry::Dentry;

// Re-export super_block
pub use super_block::{SuperBlock, SuperOperations};

// Re-export file_system
pub use file_system::{FileSystemType, FsTypeFlags, StatFs};

// Re-export mount
pub use mount::{MountFlags, MountHandle, MountInfo};

// Re-export fault
pub use fault::{FaultInjector, FaultPoint};

pub use vfs::Vfs;

// Re-export uapi types for convenience
pub use uapi::time::TimeSpec;

#[cfg(test)]
mod tests;
