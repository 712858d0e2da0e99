//! 宿主提供的通用实现
//!
//! 简单的伪文件系统不需要自己实现统计信息、inode 删除策略和目录遍历，
//! 直接把这里的实现挂到自己的操作表上即可。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;

use crate::{
    Dentry, DirEntry, FileOperations, FsError, Inode, InodeOperations, InodeType, StatFs,
    SuperBlock,
};

/// 最大文件名长度
pub const NAME_MAX: usize = 255;

/// 通用统计信息：只报告块大小、魔数和文件名长度上限
pub fn simple_statfs(sb: &SuperBlock) -> Result<StatFs, FsError> {
    Ok(StatFs {
        fs_magic: sb.magic(),
        block_size: sb.block_size(),
        total_blocks: 0,
        free_blocks: 0,
        available_blocks: 0,
        total_inodes: 0,
        free_inodes: 0,
        fsid: sb.dev() as u64,
        max_filename_len: NAME_MAX,
    })
}

/// 最后一个引用释放时总是立即删除 inode
pub fn generic_delete_inode(_inode: &Inode) -> bool {
    true
}

/// 简单目录的 inode 操作：目录始终为空，查找只产生负目录项
pub struct SimpleDirInodeOperations;

impl InodeOperations for SimpleDirInodeOperations {
    fn lookup(&self, _dir: &Dentry, name: &str) -> Result<Option<Arc<Dentry>>, FsError> {
        if name.len() > NAME_MAX {
            return Err(FsError::NameTooLong);
        }
        Ok(None)
    }
}

/// 简单目录的文件操作：只列出 `.` 和 `..`
pub struct SimpleDirOperations;

impl FileOperations for SimpleDirOperations {
    fn iterate(&self, dir: &Dentry) -> Result<Vec<DirEntry>, FsError> {
        let ino = dir.inode().ino();
        // 根目录的 .. 指向自身
        let parent_ino = dir.parent().map_or(ino, |p| p.inode().ino());
        Ok(vec![
            DirEntry {
                name: String::from("."),
                inode_no: ino,
                inode_type: InodeType::Directory,
            },
            DirEntry {
                name: String::from(".."),
                inode_no: parent_ino,
                inode_type: InodeType::Directory,
            },
        ])
    }
}

/// 新 inode 的默认 inode 操作：不支持任何目录操作
pub struct EmptyInodeOperations;

impl InodeOperations for EmptyInodeOperations {
    fn lookup(&self, _dir: &Dentry, _name: &str) -> Result<Option<Arc<Dentry>>, FsError> {
        Err(FsError::NotDirectory)
    }
}

/// 新 inode 的默认文件操作
pub struct EmptyFileOperations;

impl FileOperations for EmptyFileOperations {
    fn iterate(&self, _dir: &Dentry) -> Result<Vec<DirEntry>, FsError> {
        Err(FsError::NotDirectory)
    }
}

/// `simple_dir_inode_operations`
pub static SIMPLE_DIR_INODE_OPERATIONS: SimpleDirInodeOperations = SimpleDirInodeOperations;
/// `simple_dir_operations`
pub static SIMPLE_DIR_OPERATIONS: SimpleDirOperations = SimpleDirOperations;
/// `empty_iops`
pub static EMPTY_INODE_OPERATIONS: EmptyInodeOperations = EmptyInodeOperations;
/// `empty_fops`
pub static EMPTY_FILE_OPERATIONS: EmptyFileOperations = EmptyFileOperations;
