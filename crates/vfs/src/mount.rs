//! 挂载句柄与挂载标志

use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use crate::{Dentry, SuperBlock};

bitflags::bitflags! {
    /// 挂载标志（与 Linux `MS_*` 取值一致）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MountFlags: u32 {
        /// 只读
        const RDONLY = 1;
        /// 忽略 suid/sgid 位
        const NOSUID = 2;
        /// 禁止访问设备文件
        const NODEV = 4;
        /// 禁止执行
        const NOEXEC = 8;
        /// 同步写
        const SYNCHRONOUS = 16;
        /// 填充超级块失败时不输出错误日志
        const SILENT = 0x8000;
    }
}

/// 挂载信息（用于列出挂载点）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountInfo {
    /// 挂载编号
    pub id: usize,
    /// 设备名称
    pub device: String,
    /// 文件系统类型
    pub fs_type: &'static str,
    /// 是否只读
    pub read_only: bool,
}

/// 一个已完成的挂载
///
/// 句柄不可复制；通过 [`Vfs::umount`](crate::Vfs::umount) 交还以卸载。
pub struct MountHandle {
    pub(crate) id: usize,
    pub(crate) root: Arc<Dentry>,
    pub(crate) sb: Arc<SuperBlock>,
    pub(crate) flags: MountFlags,
}

impl MountHandle {
    /// 挂载编号
    pub fn id(&self) -> usize {
        self.id
    }

    /// 根目录项
    pub fn root(&self) -> &Arc<Dentry> {
        &self.root
    }

    /// 超级块
    pub fn super_block(&self) -> &Arc<SuperBlock> {
        &self.sb
    }

    /// 挂载标志
    pub fn flags(&self) -> MountFlags {
        self.flags
    }
}

impl fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountHandle")
            .field("id", &self.id)
            .field("sb", &self.sb.id())
            .field("flags", &self.flags)
            .finish()
    }
}
