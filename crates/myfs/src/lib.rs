//! # myfs
//!
//! 最小的伪文件系统驱动，只提供一个空的根目录。驱动本身的工作集中在生命周期上：
//!
//! - [`DriverRegistry`]：向宿主注册/注销文件系统类型，并在整个激活期间持有资源 slab
//! - [`ResourcePool`]：创建专用 slab 缓存并保留一个指针大小的记录
//! - [`MountSession`]：初始化超级块，构造根 inode 和根目录项
//! - [`InodeFactory`]：为挂载实例构造 inode
//! - [`MyFsSuperOps`]：宿主回调的超级块操作
//!
//! 任何分配失败都不会留下半初始化的超级块或泄漏的缓存。
//!
//! ```ignore
//! let registry = DriverRegistry::new(vfs);
//! assert_eq!(module_init(&registry), 0);
//! let mnt = registry.mount(None, MountFlags::empty(), None)?;
//! registry.umount(mnt);
//! module_exit(&registry);
//! ```

#![no_std]

extern crate alloc;

pub mod config;
mod error;
mod inode;
mod pool;
mod registry;
mod super_block;
mod super_ops;

pub use error::{MyFsError, RegistrationError};
pub use inode::InodeFactory;
pub use pool::{ResourcePool, ResourceSlab};
pub use registry::{DriverIdentity, DriverInstance, DriverRegistry, module_exit, module_init};
pub use super_block::{MountSession, MyFsType};
pub use super_ops::MyFsSuperOps;

#[cfg(test)]
mod tests;
