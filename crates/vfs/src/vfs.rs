//! 宿主 VFS
//!
//! [`Vfs`] 汇集了文件系统驱动依赖的全部宿主设施：
//!
//! - 文件系统类型表：[`register_filesystem`](Vfs::register_filesystem) /
//!   [`unregister_filesystem`](Vfs::unregister_filesystem)
//! - 挂载分派：[`do_mount`](Vfs::do_mount) / [`umount`](Vfs::umount)
//! - 无设备挂载原语：[`mount_nodev`](Vfs::mount_nodev) / [`kill_anon_super`](Vfs::kill_anon_super)
//! - 对象分配：[`new_inode`](Vfs::new_inode)、[`iput`](Vfs::iput)、[`d_make_root`](Vfs::d_make_root)
//! - slab 分配器：[`slab`](Vfs::slab)
//!
//! 每次挂载从查找类型起就持有该类型的一个引用（对应 `get_filesystem`），挂载失败或
//! `kill_sb` 完成后才归还。类型只要还有引用或活动的超级块，就不能被注销。

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, error, warn};
use mm::SlabAllocator;
use sync::SpinLock;
use uapi::time::TimeSpec;

use crate::libfs::generic_delete_inode;
use crate::{
    Dentry, DirEntry, FaultInjector, FaultPoint, FileMode, FileSystemType, FsError, FsTypeFlags,
    Inode, InodeType, MountFlags, MountHandle, MountInfo, StatFs, SuperBlock, vfs_ops,
};

struct FsTypeEntry {
    fs_type: Arc<dyn FileSystemType>,
    /// 正在挂载或已挂载的实例数
    users: usize,
}

struct MountRecord {
    device: String,
    fs_type: &'static str,
    flags: MountFlags,
}

/// 宿主 VFS 实例
pub struct Vfs {
    fs_types: SpinLock<BTreeMap<&'static str, FsTypeEntry>>,
    supers: SpinLock<Vec<Arc<SuperBlock>>>,
    mounts: SpinLock<BTreeMap<usize, MountRecord>>,
    anon_devs: SpinLock<BTreeSet<u32>>,
    next_mount_id: AtomicUsize,
    live_inodes: Arc<AtomicUsize>,
    slab: SlabAllocator,
    faults: FaultInjector,
}

impl Default for Vfs {
    fn default() -> Self {
        Self::new()
    }
}

impl Vfs {
    /// 创建空的宿主实例
    pub fn new() -> Self {
        Self {
            fs_types: SpinLock::new(BTreeMap::new()),
            supers: SpinLock::new(Vec::new()),
            mounts: SpinLock::new(BTreeMap::new()),
            anon_devs: SpinLock::new(BTreeSet::new()),
            next_mount_id: AtomicUsize::new(1),
            live_inodes: Arc::new(AtomicUsize::new(0)),
            slab: SlabAllocator::new(),
            faults: FaultInjector::new(),
        }
    }

    // ========== 文件系统类型表 ==========

    /// 注册文件系统类型
    pub fn register_filesystem(&self, fs_type: Arc<dyn FileSystemType>) -> Result<(), FsError> {
        let name = fs_type.name();
        let mut table = self.fs_types.lock();
        if table.contains_key(name) {
            warn!("[vfs] filesystem type {} already registered", name);
            return Err(FsError::AlreadyExists);
        }
        table.insert(name, FsTypeEntry { fs_type, users: 0 });
        debug!("[vfs] registered filesystem type {}", name);
        Ok(())
    }

    /// 注销文件系统类型
    ///
    /// 该类型仍有进行中的挂载或活动超级块时返回 [`FsError::Busy`]，类型表保持不变。
    pub fn unregister_filesystem(&self, name: &str) -> Result<(), FsError> {
        let mut table = self.fs_types.lock();
        let Some(entry) = table.get(name) else {
            return Err(FsError::NotFound);
        };
        let active = self
            .supers
            .lock()
            .iter()
            .filter(|sb| sb.fs_type().name() == name)
            .count();
        if entry.users != 0 || active != 0 {
            warn!(
                "[vfs] filesystem type {} still in use (users={}, active={})",
                name, entry.users, active
            );
            return Err(FsError::Busy);
        }
        table.remove(name);
        debug!("[vfs] unregistered filesystem type {}", name);
        Ok(())
    }

    /// 按名字查找文件系统类型
    pub fn get_fs_type(&self, name: &str) -> Option<Arc<dyn FileSystemType>> {
        self.fs_types.lock().get(name).map(|e| e.fs_type.clone())
    }

    /// 该类型当前的引用数：进行中的挂载加上已挂载的实例
    pub fn fs_users(&self, name: &str) -> usize {
        self.fs_types.lock().get(name).map_or(0, |e| e.users)
    }

    /// 查找类型并取得一个引用
    fn get_filesystem(&self, name: &str) -> Option<Arc<dyn FileSystemType>> {
        let mut table = self.fs_types.lock();
        let entry = table.get_mut(name)?;
        entry.users += 1;
        Some(entry.fs_type.clone())
    }

    /// 归还 [`get_filesystem`](Self::get_filesystem) 取得的引用
    fn put_filesystem(&self, name: &str) {
        if let Some(entry) = self.fs_types.lock().get_mut(name) {
            entry.users = entry.users.saturating_sub(1);
        }
    }

    /// 该名字是否已注册
    pub fn is_registered(&self, name: &str) -> bool {
        self.fs_types.lock().contains_key(name)
    }

    /// 已注册的类型名列表
    pub fn filesystems(&self) -> Vec<&'static str> {
        self.fs_types.lock().keys().copied().collect()
    }

    // ========== 挂载分派 ==========

    /// 挂载 `fs_name` 类型的新实例
    pub fn do_mount(
        &self,
        fs_name: &str,
        dev_name: Option<&str>,
        flags: MountFlags,
        data: Option<&[u8]>,
    ) -> Result<MountHandle, FsError> {
        self.mount_inner(fs_name, dev_name, flags, data, false)
    }

    /// 以用户命名空间中的调用者身份挂载
    ///
    /// 仅允许带 [`FsTypeFlags::USERNS_MOUNT`] 的类型。
    pub fn do_mount_in_userns(
        &self,
        fs_name: &str,
        dev_name: Option<&str>,
        flags: MountFlags,
        data: Option<&[u8]>,
    ) -> Result<MountHandle, FsError> {
        self.mount_inner(fs_name, dev_name, flags, data, true)
    }

    fn mount_inner(
        &self,
        fs_name: &str,
        dev_name: Option<&str>,
        flags: MountFlags,
        data: Option<&[u8]>,
        in_userns: bool,
    ) -> Result<MountHandle, FsError> {
        let Some(fs_type) = self.get_filesystem(fs_name) else {
            warn!("[vfs] unknown filesystem type {}", fs_name);
            return Err(FsError::NoDevice);
        };
        let res = self.mount_type(&fs_type, dev_name, flags, data, in_userns);
        if res.is_err() {
            self.put_filesystem(fs_type.name());
        }
        res
    }

    fn mount_type(
        &self,
        fs_type: &Arc<dyn FileSystemType>,
        dev_name: Option<&str>,
        flags: MountFlags,
        data: Option<&[u8]>,
        in_userns: bool,
    ) -> Result<MountHandle, FsError> {
        let fs_name = fs_type.name();
        let fs_flags = fs_type.fs_flags();
        if in_userns && !fs_flags.contains(FsTypeFlags::USERNS_MOUNT) {
            return Err(FsError::PermissionDenied);
        }
        if fs_flags.contains(FsTypeFlags::REQUIRES_DEV) && dev_name.is_none() {
            return Err(FsError::InvalidArgument);
        }

        let root = fs_type.mount(self, fs_type, flags, dev_name, data)?;
        let Some(sb) = root.super_block() else {
            error!("[vfs] {}: mount returned a root without superblock", fs_name);
            return Err(FsError::InvalidArgument);
        };

        let id = self.next_mount_id.fetch_add(1, Ordering::Relaxed);
        self.mounts.lock().insert(
            id,
            MountRecord {
                device: String::from(dev_name.unwrap_or("none")),
                fs_type: fs_type.name(),
                flags,
            },
        );
        debug!("[vfs] mount {}: {} (sb={})", id, fs_name, sb.id());
        Ok(MountHandle {
            id,
            root,
            sb,
            flags,
        })
    }

    /// 卸载
    pub fn umount(&self, handle: MountHandle) {
        let MountHandle { id, root, sb, .. } = handle;
        self.mounts.lock().remove(&id);
        drop(root);
        debug!("[vfs] umount {} (sb={})", id, sb.id());
        let fs_type = sb.fs_type().clone();
        fs_type.kill_sb(self, &sb);
        self.put_filesystem(fs_type.name());
    }

    /// 列出当前挂载
    pub fn list_mounts(&self) -> Vec<MountInfo> {
        self.mounts
            .lock()
            .iter()
            .map(|(id, rec)| MountInfo {
                id: *id,
                device: rec.device.clone(),
                fs_type: rec.fs_type,
                read_only: rec.flags.contains(MountFlags::RDONLY),
            })
            .collect()
    }

    // ========== 无设备挂载原语 ==========

    /// 分配匿名超级块并用 `fill` 初始化
    ///
    /// `fill` 失败时会调用类型的 `kill_sb` 清理这个从未对外可见的超级块，再把错误原样返回。
    /// `fill` 报告成功却没有安装根目录项同样按失败处理。
    pub fn mount_nodev<F>(
        &self,
        fs_type: &Arc<dyn FileSystemType>,
        flags: MountFlags,
        data: Option<&[u8]>,
        fill: F,
    ) -> Result<Arc<Dentry>, FsError>
    where
        F: FnOnce(&Arc<SuperBlock>, Option<&[u8]>, bool) -> Result<(), FsError>,
    {
        if self.faults.should_fail(FaultPoint::AllocSuper) {
            return Err(FsError::NoMemory);
        }
        let dev = self.get_anon_dev();
        let sb = Arc::new(SuperBlock::new(fs_type.clone(), dev, flags));

        let res = fill(&sb, data, flags.contains(MountFlags::SILENT));
        let root = match res {
            Ok(()) => sb.root(),
            Err(e) => {
                fs_type.kill_sb(self, &sb);
                return Err(e);
            }
        };
        let Some(root) = root else {
            error!(
                "[vfs] {}: fill_super succeeded without a root (sb={})",
                fs_type.name(),
                sb.id()
            );
            fs_type.kill_sb(self, &sb);
            return Err(FsError::InvalidArgument);
        };

        sb.activate();
        self.supers.lock().push(sb);
        Ok(root)
    }

    /// 销毁匿名超级块
    ///
    /// 释放根目录项；若根目录项曾经安装过，则恰好调用一次 `put_super`。
    /// 对同一个超级块重复调用只会输出警告。
    pub fn kill_anon_super(&self, sb: &Arc<SuperBlock>) {
        if !sb.begin_shutdown() {
            warn!("[vfs] superblock {} is already shut down", sb.id());
            return;
        }

        if let Some(root) = sb.take_root() {
            let inode = root.inode().clone();
            drop(root);
            self.iput(inode);
            if let Some(s_op) = sb.s_op() {
                sb.note_put_super();
                s_op.put_super(sb);
            }
        }

        self.supers.lock().retain(|s| !Arc::ptr_eq(s, sb));
        self.free_anon_dev(sb.dev());
    }

    fn get_anon_dev(&self) -> u32 {
        let mut devs = self.anon_devs.lock();
        let dev = (1..).find(|d| !devs.contains(d)).unwrap_or(u32::MAX);
        devs.insert(dev);
        dev
    }

    fn free_anon_dev(&self, dev: u32) {
        self.anon_devs.lock().remove(&dev);
    }

    // ========== inode / 目录项 ==========

    /// 为 `sb` 分配新 inode
    pub fn new_inode(&self, sb: &Arc<SuperBlock>) -> Result<Arc<Inode>, FsError> {
        if self.faults.should_fail(FaultPoint::NewInode) {
            return Err(FsError::NoMemory);
        }
        Ok(Arc::new(Inode::new(sb, self.live_inodes.clone())))
    }

    /// 释放一个 inode 引用
    ///
    /// 最后一个引用释放时询问超级块的 `drop_inode`，随后驱逐该 inode。
    pub fn iput(&self, inode: Arc<Inode>) {
        if Arc::strong_count(&inode) > 1 {
            return;
        }
        let delete = match inode.super_block().and_then(|sb| sb.s_op()) {
            Some(s_op) => s_op.drop_inode(&inode),
            None => generic_delete_inode(&inode),
        };
        debug!("[vfs] evict inode {} (delete={})", inode.ino(), delete);
    }

    /// 初始化 inode 属主和模式
    ///
    /// 属主取当前任务的 fsuid；父目录带 setgid 位时继承其 gid，新目录同时继承 setgid 位。
    pub fn inode_init_owner(&self, inode: &Inode, dir: Option<&Inode>, mode: FileMode) {
        let ops = vfs_ops();
        let uid = ops.current_fsuid();
        let mut gid = ops.current_fsgid();
        let mut mode = mode;
        if let Some(dir) = dir {
            if dir.mode().contains(FileMode::S_ISGID) {
                gid = dir.metadata().gid;
                if InodeType::from_mode(mode) == InodeType::Directory {
                    mode |= FileMode::S_ISGID;
                }
            }
        }
        inode.set_owner(uid, gid);
        inode.set_mode(mode);
    }

    /// 以 inode 所属超级块的时间粒度返回当前时间
    pub fn current_time(&self, inode: &Inode) -> TimeSpec {
        let now = vfs_ops().timespec_now();
        match inode.super_block() {
            Some(sb) => now.truncate(sb.time_gran()),
            None => now,
        }
    }

    /// 以 `inode` 创建根目录项
    ///
    /// 失败时不释放 `inode`，由调用者 [`iput`](Self::iput)。
    pub fn d_make_root(&self, inode: &Arc<Inode>) -> Result<Arc<Dentry>, FsError> {
        if self.faults.should_fail(FaultPoint::DMakeRoot) {
            return Err(FsError::NoMemory);
        }
        Ok(Arc::new(Dentry::new_root(inode.clone())))
    }

    // ========== 通过操作表分派 ==========

    /// 查询挂载实例的统计信息
    pub fn statfs(&self, mnt: &MountHandle) -> Result<StatFs, FsError> {
        match mnt.sb.s_op() {
            Some(s_op) => s_op.statfs(&mnt.sb),
            None => crate::libfs::simple_statfs(&mnt.sb),
        }
    }

    /// 列出挂载实例根目录的内容
    pub fn readdir(&self, mnt: &MountHandle) -> Result<Vec<DirEntry>, FsError> {
        mnt.root.inode().i_fop().iterate(&mnt.root)
    }

    /// 在挂载实例根目录中查找 `name`
    pub fn lookup(&self, mnt: &MountHandle, name: &str) -> Result<Option<Arc<Dentry>>, FsError> {
        mnt.root.inode().i_op().lookup(&mnt.root, name)
    }

    // ========== 宿主设施与计数 ==========

    /// slab 分配器
    pub fn slab(&self) -> &SlabAllocator {
        &self.slab
    }

    /// 故障注入器
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// 存活的 inode 数
    pub fn live_inodes(&self) -> usize {
        self.live_inodes.load(Ordering::Acquire)
    }

    /// 活动超级块数
    pub fn active_supers(&self) -> usize {
        self.supers.lock().len()
    }
}
