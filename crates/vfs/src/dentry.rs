//! 目录项

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use core::fmt;

use crate::{Inode, SuperBlock};

/// 目录项：把名字绑定到一个 inode 上
///
/// 目录项持有 inode 的强引用；根目录项没有父目录。
pub struct Dentry {
    name: String,
    inode: Arc<Inode>,
    parent: Weak<Dentry>,
}

impl Dentry {
    /// 创建根目录项
    pub(crate) fn new_root(inode: Arc<Inode>) -> Self {
        Self {
            name: String::from("/"),
            inode,
            parent: Weak::new(),
        }
    }

    /// 名字
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 绑定的 inode
    pub fn inode(&self) -> &Arc<Inode> {
        &self.inode
    }

    /// 父目录项；根目录项返回 `None`
    pub fn parent(&self) -> Option<Arc<Dentry>> {
        self.parent.upgrade()
    }

    /// 所属超级块
    pub fn super_block(&self) -> Option<Arc<SuperBlock>> {
        self.inode.super_block()
    }
}

impl fmt::Debug for Dentry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dentry")
            .field("name", &self.name)
            .field("inode", &self.inode)
            .finish()
    }
}
