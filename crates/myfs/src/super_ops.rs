//! 超级块操作

use log::debug;
use vfs::libfs::{generic_delete_inode, simple_statfs};
use vfs::{FsError, Inode, StatFs, SuperBlock, SuperOperations};

/// myfs 的超级块操作
///
/// `put_super` 只记录日志，资源在模块注销时释放；统计信息和 inode 删除策略使用宿主的通用实现。
pub struct MyFsSuperOps;

impl SuperOperations for MyFsSuperOps {
    fn put_super(&self, sb: &SuperBlock) {
        debug!("[myfs] put_super (sb={})", sb.id());
    }

    fn statfs(&self, sb: &SuperBlock) -> Result<StatFs, FsError> {
        simple_statfs(sb)
    }

    fn drop_inode(&self, inode: &Inode) -> bool {
        generic_delete_inode(inode)
    }
}
