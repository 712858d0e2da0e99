//! Inode 构造

use alloc::sync::Arc;

use log::debug;
use vfs::{FileMode, Inode, SuperBlock, Vfs, vfs_ops};

use crate::MyFsError;

/// 为挂载实例构造 inode
///
/// 不分配编号，编号由调用者设置。
pub struct InodeFactory<'a> {
    vfs: &'a Vfs,
}

impl<'a> InodeFactory<'a> {
    /// 绑定到宿主
    pub fn new(vfs: &'a Vfs) -> Self {
        Self { vfs }
    }

    /// 分配 inode，初始化属主和模式，大小为一页，三个时间戳取当前时间
    pub fn make_node(&self, sb: &Arc<SuperBlock>, mode: FileMode) -> Result<Arc<Inode>, MyFsError> {
        debug!("[myfs] make_inode (sb={})", sb.id());
        let inode = self
            .vfs
            .new_inode(sb)
            .map_err(|_| MyFsError::Allocation)?;

        self.vfs.inode_init_owner(&inode, None, mode);
        inode.set_size(vfs_ops().page_size());
        let now = self.vfs.current_time(&inode);
        inode.set_times(now, now, now);
        Ok(inode)
    }
}
