//! 超级块
//!
//! 每次挂载对应一个 [`SuperBlock`]。宿主在调用驱动的 `fill_super` 之前分配它，
//! 驱动在回调中写入块大小、魔数、操作表和根目录项。
//! 只有 `fill_super` 成功且根目录项已安装的超级块才会被激活并对外可见。

use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use sync::SpinLock;

use crate::libfs::{generic_delete_inode, simple_statfs};
use crate::{Dentry, FileSystemType, FsError, Inode, MountFlags, StatFs};

/// 超级块编号分配器，进程内唯一
static NEXT_SB_ID: AtomicUsize = AtomicUsize::new(1);

/// 超级块操作表
///
/// 默认实现即宿主提供的通用实现，驱动只需覆盖自己关心的回调。
pub trait SuperOperations: Send + Sync {
    /// 超级块销毁前的通知
    fn put_super(&self, _sb: &SuperBlock) {}

    /// 查询文件系统统计信息
    fn statfs(&self, sb: &SuperBlock) -> Result<StatFs, FsError> {
        simple_statfs(sb)
    }

    /// 最后一个引用释放时是否立即删除 inode
    fn drop_inode(&self, inode: &Inode) -> bool {
        generic_delete_inode(inode)
    }
}

struct SuperBlockInner {
    block_size: usize,
    block_size_bits: u8,
    magic: u64,
    time_gran: u32,
    s_op: Option<Arc<dyn SuperOperations>>,
    root: Option<Arc<Dentry>>,
}

/// 超级块
pub struct SuperBlock {
    id: usize,
    dev: u32,
    fs_type: Arc<dyn FileSystemType>,
    flags: MountFlags,
    inner: SpinLock<SuperBlockInner>,
    active: AtomicBool,
    dying: AtomicBool,
    put_super_calls: AtomicUsize,
}

impl SuperBlock {
    pub(crate) fn new(fs_type: Arc<dyn FileSystemType>, dev: u32, flags: MountFlags) -> Self {
        Self {
            id: NEXT_SB_ID.fetch_add(1, Ordering::Relaxed),
            dev,
            fs_type,
            flags,
            inner: SpinLock::new(SuperBlockInner {
                block_size: 0,
                block_size_bits: 0,
                magic: 0,
                time_gran: 1,
                s_op: None,
                root: None,
            }),
            active: AtomicBool::new(false),
            dying: AtomicBool::new(false),
            put_super_calls: AtomicUsize::new(0),
        }
    }

    /// 进程内唯一的编号
    pub fn id(&self) -> usize {
        self.id
    }

    /// 匿名设备号
    pub fn dev(&self) -> u32 {
        self.dev
    }

    /// 文件系统类型
    pub fn fs_type(&self) -> &Arc<dyn FileSystemType> {
        &self.fs_type
    }

    /// 挂载标志
    pub fn flags(&self) -> MountFlags {
        self.flags
    }

    /// 块大小（字节）
    pub fn block_size(&self) -> usize {
        self.inner.lock().block_size
    }

    /// 块大小位数
    pub fn block_size_bits(&self) -> u8 {
        self.inner.lock().block_size_bits
    }

    /// 设置块大小及其位数，要求 `1 << bits == size`
    pub fn set_block_size(&self, size: usize, bits: u8) -> Result<(), FsError> {
        if bits as u32 >= usize::BITS || 1usize << bits != size {
            return Err(FsError::InvalidArgument);
        }
        let mut inner = self.inner.lock();
        inner.block_size = size;
        inner.block_size_bits = bits;
        Ok(())
    }

    /// 魔数
    pub fn magic(&self) -> u64 {
        self.inner.lock().magic
    }

    /// 设置魔数
    pub fn set_magic(&self, magic: u64) {
        self.inner.lock().magic = magic;
    }

    /// 时间戳粒度（纳秒）
    pub fn time_gran(&self) -> u32 {
        self.inner.lock().time_gran
    }

    /// 超级块操作表
    pub fn s_op(&self) -> Option<Arc<dyn SuperOperations>> {
        self.inner.lock().s_op.clone()
    }

    /// 安装超级块操作表
    pub fn set_op(&self, s_op: Arc<dyn SuperOperations>) {
        self.inner.lock().s_op = Some(s_op);
    }

    /// 根目录项
    pub fn root(&self) -> Option<Arc<Dentry>> {
        self.inner.lock().root.clone()
    }

    /// 安装根目录项
    pub fn set_root(&self, root: Arc<Dentry>) {
        self.inner.lock().root = Some(root);
    }

    pub(crate) fn take_root(&self) -> Option<Arc<Dentry>> {
        self.inner.lock().root.take()
    }

    /// 是否已激活（挂载完成且尚未卸载）
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub(crate) fn activate(&self) {
        self.active.store(true, Ordering::Release);
    }

    /// 是否已进入销毁流程
    pub fn is_dying(&self) -> bool {
        self.dying.load(Ordering::Acquire)
    }

    /// 开始销毁；已在销毁中则返回 `false`
    pub(crate) fn begin_shutdown(&self) -> bool {
        self.active.store(false, Ordering::Release);
        !self.dying.swap(true, Ordering::AcqRel)
    }

    /// 宿主调用 `put_super` 的次数
    pub fn put_super_calls(&self) -> usize {
        self.put_super_calls.load(Ordering::Acquire)
    }

    pub(crate) fn note_put_super(&self) {
        self.put_super_calls.fetch_add(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for SuperBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("SuperBlock")
            .field("id", &self.id)
            .field("dev", &self.dev)
            .field("fs_type", &self.fs_type.name())
            .field("block_size", &inner.block_size)
            .field("magic", &format_args!("{:#x}", inner.magic))
            .field("has_root", &inner.root.is_some())
            .finish()
    }
}
