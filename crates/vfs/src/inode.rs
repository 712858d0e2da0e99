//! Inode 对象模型
//!
//! [`Inode`] 由宿主分配（[`Vfs::new_inode`](crate::Vfs::new_inode)）并归宿主所有，
//! 驱动只负责填充模式、编号、时间戳并安装操作表。
//!
//! 操作表以 trait 对象的形式挂在 inode 上：
//! - [`InodeOperations`]：目录项解析等 inode 级操作
//! - [`FileOperations`]：打开后对目录/文件的操作（目前只有目录遍历）
//!
//! 新分配的 inode 挂的是空操作表，驱动需要用 [`Inode::set_ops`] 换成具体实现。

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use sync::SpinLock;
use uapi::time::TimeSpec;

use crate::libfs::{EMPTY_FILE_OPERATIONS, EMPTY_INODE_OPERATIONS};
use crate::{Dentry, FsError, SuperBlock};

/// 文件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InodeType {
    /// 普通文件
    File,
    /// 目录
    Directory,
    /// 符号链接
    Symlink,
    /// 字符设备
    CharDevice,
    /// 块设备
    BlockDevice,
    /// 命名管道
    Fifo,
    /// 套接字
    Socket,
    /// 尚未设置类型位
    Unknown,
}

impl InodeType {
    /// 从模式中的类型位推导文件类型
    pub fn from_mode(mode: FileMode) -> Self {
        let fmt = mode & FileMode::S_IFMT;
        if fmt == FileMode::S_IFREG {
            InodeType::File
        } else if fmt == FileMode::S_IFDIR {
            InodeType::Directory
        } else if fmt == FileMode::S_IFLNK {
            InodeType::Symlink
        } else if fmt == FileMode::S_IFCHR {
            InodeType::CharDevice
        } else if fmt == FileMode::S_IFBLK {
            InodeType::BlockDevice
        } else if fmt == FileMode::S_IFIFO {
            InodeType::Fifo
        } else if fmt == FileMode::S_IFSOCK {
            InodeType::Socket
        } else {
            InodeType::Unknown
        }
    }
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// 文件权限和类型（与 POSIX 兼容）
    pub struct FileMode: u32 {
        /// 文件类型掩码
        const S_IFMT   = 0o170000;
        /// 普通文件
        const S_IFREG  = 0o100000;
        /// 目录
        const S_IFDIR  = 0o040000;
        /// 符号链接
        const S_IFLNK  = 0o120000;
        /// 字符设备
        const S_IFCHR  = 0o020000;
        /// 块设备
        const S_IFBLK  = 0o060000;
        /// FIFO
        const S_IFIFO  = 0o010000;
        /// Socket
        const S_IFSOCK = 0o140000;

        /// 用户读
        const S_IRUSR  = 0o400;
        /// 用户写
        const S_IWUSR  = 0o200;
        /// 用户执行
        const S_IXUSR  = 0o100;
        /// 组读
        const S_IRGRP  = 0o040;
        /// 组写
        const S_IWGRP  = 0o020;
        /// 组执行
        const S_IXGRP  = 0o010;
        /// 其他读
        const S_IROTH  = 0o004;
        /// 其他写
        const S_IWOTH  = 0o002;
        /// 其他执行
        const S_IXOTH  = 0o001;

        /// Set UID
        const S_ISUID  = 0o4000;
        /// Set GID
        const S_ISGID  = 0o2000;
        /// Sticky bit
        const S_ISVTX  = 0o1000;
    }
}

impl FileMode {
    /// 权限位（去掉类型位）
    pub fn permissions(&self) -> u32 {
        (*self & !FileMode::S_IFMT).bits()
    }
}

/// 轻量级目录项（readdir 返回）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// 文件名
    pub name: String,
    /// Inode 编号
    pub inode_no: usize,
    /// 文件类型
    pub inode_type: InodeType,
}

/// 文件元数据
#[derive(Debug, Clone)]
pub struct InodeMetadata {
    /// Inode 编号
    pub inode_no: usize,
    /// 文件类型
    pub inode_type: InodeType,
    /// 类型与权限位
    pub mode: FileMode,
    /// 用户 ID
    pub uid: u32,
    /// 组 ID
    pub gid: u32,
    /// 文件大小（字节）
    pub size: usize,
    /// 访问时间
    pub atime: TimeSpec,
    /// 修改时间
    pub mtime: TimeSpec,
    /// 状态改变时间
    pub ctime: TimeSpec,
    /// 硬链接数
    pub nlinks: usize,
}

/// inode 级操作表
pub trait InodeOperations: Send + Sync {
    /// 在目录 `dir` 中解析 `name`
    ///
    /// 返回 `Ok(None)` 表示名字不存在（负目录项）。
    fn lookup(&self, dir: &Dentry, name: &str) -> Result<Option<Arc<Dentry>>, FsError>;
}

/// 打开文件后的操作表
pub trait FileOperations: Send + Sync {
    /// 遍历目录内容
    fn iterate(&self, dir: &Dentry) -> Result<Vec<DirEntry>, FsError>;
}

/// 宿主文件系统节点
pub struct Inode {
    sb: Weak<SuperBlock>,
    meta: SpinLock<InodeMetadata>,
    i_op: SpinLock<&'static dyn InodeOperations>,
    i_fop: SpinLock<&'static dyn FileOperations>,
    /// 宿主的存活 inode 计数，Drop 时递减
    live: Arc<AtomicUsize>,
}

impl Inode {
    /// 由宿主分配；编号为 0，类型未定，挂空操作表
    pub(crate) fn new(sb: &Arc<SuperBlock>, live: Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::AcqRel);
        Self {
            sb: Arc::downgrade(sb),
            meta: SpinLock::new(InodeMetadata {
                inode_no: 0,
                inode_type: InodeType::Unknown,
                mode: FileMode::empty(),
                uid: 0,
                gid: 0,
                size: 0,
                atime: TimeSpec::zero(),
                mtime: TimeSpec::zero(),
                ctime: TimeSpec::zero(),
                nlinks: 1,
            }),
            i_op: SpinLock::new(&EMPTY_INODE_OPERATIONS as &'static dyn InodeOperations),
            i_fop: SpinLock::new(&EMPTY_FILE_OPERATIONS as &'static dyn FileOperations),
            live,
        }
    }

    /// 获取文件元数据快照
    pub fn metadata(&self) -> InodeMetadata {
        self.meta.lock().clone()
    }

    /// Inode 编号
    pub fn ino(&self) -> usize {
        self.meta.lock().inode_no
    }

    /// 设置 inode 编号
    pub fn set_ino(&self, ino: usize) {
        self.meta.lock().inode_no = ino;
    }

    /// 类型与权限位
    pub fn mode(&self) -> FileMode {
        self.meta.lock().mode
    }

    /// 设置类型与权限位，同时更新文件类型
    pub fn set_mode(&self, mode: FileMode) {
        let mut meta = self.meta.lock();
        meta.mode = mode;
        meta.inode_type = InodeType::from_mode(mode);
    }

    /// 是否为目录
    pub fn is_dir(&self) -> bool {
        self.meta.lock().inode_type == InodeType::Directory
    }

    /// 设置属主
    pub fn set_owner(&self, uid: u32, gid: u32) {
        let mut meta = self.meta.lock();
        meta.uid = uid;
        meta.gid = gid;
    }

    /// 文件大小
    pub fn size(&self) -> usize {
        self.meta.lock().size
    }

    /// 设置文件大小
    pub fn set_size(&self, size: usize) {
        self.meta.lock().size = size;
    }

    /// 设置三个时间戳
    pub fn set_times(&self, atime: TimeSpec, mtime: TimeSpec, ctime: TimeSpec) {
        let mut meta = self.meta.lock();
        meta.atime = atime;
        meta.mtime = mtime;
        meta.ctime = ctime;
    }

    /// 设置硬链接数
    pub fn set_nlink(&self, nlinks: usize) {
        self.meta.lock().nlinks = nlinks;
    }

    /// 安装操作表
    pub fn set_ops(&self, i_op: &'static dyn InodeOperations, i_fop: &'static dyn FileOperations) {
        *self.i_op.lock() = i_op;
        *self.i_fop.lock() = i_fop;
    }

    /// inode 级操作表
    pub fn i_op(&self) -> &'static dyn InodeOperations {
        *self.i_op.lock()
    }

    /// 文件操作表
    pub fn i_fop(&self) -> &'static dyn FileOperations {
        *self.i_fop.lock()
    }

    /// 所属超级块；超级块已销毁时返回 `None`
    pub fn super_block(&self) -> Option<Arc<SuperBlock>> {
        self.sb.upgrade()
    }
}

impl Drop for Inode {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for Inode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let meta = self.meta.lock();
        f.debug_struct("Inode")
            .field("ino", &meta.inode_no)
            .field("mode", &format_args!("{:#o}", meta.mode.bits()))
            .field("size", &meta.size)
            .finish()
    }
}
