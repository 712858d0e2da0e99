//! 超级块初始化与挂载入口
//!
//! [`MyFsType`] 是注册到宿主类型表中的文件系统类型。挂载时宿主分配匿名超级块，
//! 再回调 [`MountSession::fill_super`] 填充它：
//!
//! 1. 设置块大小、魔数和超级块操作
//! 2. 构造根目录 inode
//! 3. 安装简单目录操作表，编号设为 1
//! 4. 由 inode 构造根目录项；失败时自己释放 inode
//! 5. 把根目录项挂到超级块上
//!
//! 任何一步失败宿主都会丢弃这个超级块，不会把它暴露出去。

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, error, warn};
use vfs::libfs::{SIMPLE_DIR_INODE_OPERATIONS, SIMPLE_DIR_OPERATIONS};
use vfs::{Dentry, FileSystemType, FsError, FsTypeFlags, MountFlags, SuperBlock, Vfs, vfs_ops};

use crate::config::{MYFS_MAGIC, MYFS_NAME, ROOT_INODE_NO, ROOT_MODE};
use crate::{InodeFactory, MyFsError, MyFsSuperOps};

/// 一次挂载的超级块初始化
pub struct MountSession<'a> {
    vfs: &'a Vfs,
}

impl<'a> MountSession<'a> {
    /// 绑定到宿主
    pub fn new(vfs: &'a Vfs) -> Self {
        Self { vfs }
    }

    /// 填充超级块
    ///
    /// `silent` 只抑制错误日志，不影响返回值。
    pub fn fill_super(
        &self,
        sb: &Arc<SuperBlock>,
        _data: Option<&[u8]>,
        silent: bool,
    ) -> Result<(), MyFsError> {
        debug!("[myfs] fill_super (sb={})", sb.id());
        let ops = vfs_ops();
        sb.set_block_size(ops.page_size(), ops.page_shift())?;
        sb.set_magic(MYFS_MAGIC);
        sb.set_op(Arc::new(MyFsSuperOps));

        let root = match InodeFactory::new(self.vfs).make_node(sb, ROOT_MODE) {
            Ok(inode) => inode,
            Err(e) => {
                if !silent {
                    error!("[myfs] inode allocation failed (sb={})", sb.id());
                }
                return Err(e);
            }
        };

        root.set_ops(&SIMPLE_DIR_INODE_OPERATIONS, &SIMPLE_DIR_OPERATIONS);
        root.set_ino(ROOT_INODE_NO);

        debug!("[myfs] d_make_root (sb={})", sb.id());
        match self.vfs.d_make_root(&root) {
            Ok(dentry) => {
                sb.set_root(dentry);
                Ok(())
            }
            Err(_) => {
                if !silent {
                    error!("[myfs] root creation failed (sb={})", sb.id());
                }
                self.vfs.iput(root);
                Err(MyFsError::RootCreation)
            }
        }
    }
}

/// myfs 文件系统类型
///
/// 注册到宿主后并不立刻接受挂载：资源 slab 保留成功之前 `mount` 一律失败。
pub struct MyFsType {
    live: AtomicBool,
}

impl MyFsType {
    /// 创建尚未接受挂载的类型
    pub const fn new() -> Self {
        Self {
            live: AtomicBool::new(false),
        }
    }

    /// 是否接受挂载
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub(crate) fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::Release);
    }
}

impl Default for MyFsType {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemType for MyFsType {
    fn name(&self) -> &'static str {
        MYFS_NAME
    }

    fn fs_flags(&self) -> FsTypeFlags {
        FsTypeFlags::USERNS_MOUNT
    }

    fn fill_super(
        &self,
        vfs: &Vfs,
        sb: &Arc<SuperBlock>,
        data: Option<&[u8]>,
        silent: bool,
    ) -> Result<(), FsError> {
        MountSession::new(vfs)
            .fill_super(sb, data, silent)
            .map_err(MyFsError::to_fs_error)
    }

    fn mount(
        &self,
        vfs: &Vfs,
        fs_type: &Arc<dyn FileSystemType>,
        flags: MountFlags,
        _dev_name: Option<&str>,
        data: Option<&[u8]>,
    ) -> Result<Arc<Dentry>, FsError> {
        if !self.is_live() {
            warn!("[myfs] mount refused: driver resources not ready");
            return Err(FsError::NoDevice);
        }
        debug!("[myfs] mount_nodev");
        let res = vfs.mount_nodev(fs_type, flags, data, |sb, data, silent| {
            self.fill_super(vfs, sb, data, silent)
        });
        match &res {
            Ok(root) => debug!(
                "[myfs] mounted! (sb={})",
                root.super_block().map_or(0, |sb| sb.id())
            ),
            Err(e) => error!("[myfs] mounting failed: {}", e),
        }
        res
    }

    fn kill_sb(&self, vfs: &Vfs, sb: &Arc<SuperBlock>) {
        debug!("[myfs] kill_sb (sb={})", sb.id());
        vfs.kill_anon_super(sb);
    }
}
