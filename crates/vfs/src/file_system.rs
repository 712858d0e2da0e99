//! 文件系统类型抽象
//!
//! 驱动通过实现 [`FileSystemType`] 向宿主描述自己：名字、能力标志，
//! 以及挂载 / 填充超级块 / 销毁超级块三个入口。宿主在文件系统类型表中以名字索引它。

use alloc::sync::Arc;

use crate::{Dentry, FsError, MountFlags, SuperBlock, Vfs};

bitflags::bitflags! {
    /// 文件系统类型能力标志（与 Linux `FS_*` 取值一致）
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FsTypeFlags: u32 {
        /// 需要块设备
        const REQUIRES_DEV = 1;
        /// 挂载数据为二进制格式
        const BINARY_MOUNTDATA = 2;
        /// 名字中带子类型
        const HAS_SUBTYPE = 4;
        /// 允许在用户命名空间中挂载
        const USERNS_MOUNT = 8;
    }
}

/// 文件系统类型
pub trait FileSystemType: Send + Sync {
    /// 类型名称（文件系统类型表中的键）
    fn name(&self) -> &'static str;

    /// 能力标志
    fn fs_flags(&self) -> FsTypeFlags;

    /// 初始化新分配的超级块
    ///
    /// 成功时必须已经安装根目录项；失败时宿主会丢弃该超级块。
    fn fill_super(
        &self,
        vfs: &Vfs,
        sb: &Arc<SuperBlock>,
        data: Option<&[u8]>,
        silent: bool,
    ) -> Result<(), FsError>;

    /// 挂载入口，返回新实例的根目录项
    fn mount(
        &self,
        vfs: &Vfs,
        fs_type: &Arc<dyn FileSystemType>,
        flags: MountFlags,
        dev_name: Option<&str>,
        data: Option<&[u8]>,
    ) -> Result<Arc<Dentry>, FsError>;

    /// 销毁超级块（卸载的最后一步，或 `fill_super` 失败后的清理）
    fn kill_sb(&self, vfs: &Vfs, sb: &Arc<SuperBlock>);
}

/// 文件系统统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFs {
    /// 文件系统魔数
    pub fs_magic: u64,
    /// 块大小（单位：字节）
    pub block_size: usize,
    /// 总块数
    pub total_blocks: usize,
    /// 空闲块数
    pub free_blocks: usize,
    /// 可用块数（非特权用户）
    pub available_blocks: usize,
    /// 总 inode 数
    pub total_inodes: usize,
    /// 空闲 inode 数
    pub free_inodes: usize,
    /// 文件系统 ID
    pub fsid: u64,
    /// 最大文件名长度
    pub max_filename_len: usize,
}
