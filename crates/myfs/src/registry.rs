//! 驱动注册与模块生命周期
//!
//! [`DriverRegistry`] 管理 myfs 在宿主类型表中的唯一条目，并持有激活期间的
//! [`DriverInstance`]。状态只有两种：未激活，或已注册且资源 slab 已保留。
//!
//! 激活顺序是先注册后保留资源，保留失败时撤销注册再返回错误。资源就绪前类型拒绝挂载，
//! 所以撤销注册只需等这段窗口里闯入的挂载失败退出。
//! 停用顺序是先注销；宿主拒绝注销（仍有挂载）时保留实例和资源。

use alloc::sync::Arc;
use core::hint::spin_loop;
use core::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, error, info, warn};
use sync::SpinLock;
use vfs::{FileSystemType, FsError, FsTypeFlags, MountFlags, MountHandle, Vfs};

use crate::config::{MYFS_MAGIC, MYFS_NAME};
use crate::{MyFsError, MyFsType, RegistrationError, ResourcePool, ResourceSlab};

/// 注册到宿主的驱动身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverIdentity {
    /// 类型名
    pub name: &'static str,
    /// 超级块魔数
    pub magic: u64,
    /// 类型标志
    pub flags: FsTypeFlags,
}

/// 一次成功激活的驱动状态
#[derive(Debug)]
pub struct DriverInstance {
    seq: usize,
    slab: ResourceSlab,
}

impl DriverInstance {
    /// 激活序号
    pub fn seq(&self) -> usize {
        self.seq
    }

    /// 持有的资源 slab
    pub fn slab(&self) -> &ResourceSlab {
        &self.slab
    }
}

/// myfs 驱动注册表
pub struct DriverRegistry {
    vfs: Arc<Vfs>,
    fs_type: Arc<MyFsType>,
    instance: SpinLock<Option<DriverInstance>>,
    next_seq: AtomicUsize,
}

impl DriverRegistry {
    /// 创建未激活的注册表
    pub fn new(vfs: Arc<Vfs>) -> Self {
        Self {
            vfs,
            fs_type: Arc::new(MyFsType::new()),
            instance: SpinLock::new(None),
            next_seq: AtomicUsize::new(1),
        }
    }

    /// 驱动身份
    pub fn identity(&self) -> DriverIdentity {
        DriverIdentity {
            name: MYFS_NAME,
            magic: MYFS_MAGIC,
            flags: self.fs_type.fs_flags(),
        }
    }

    /// 宿主
    pub fn vfs(&self) -> &Arc<Vfs> {
        &self.vfs
    }

    /// 是否处于激活状态
    pub fn is_active(&self) -> bool {
        self.instance.lock().is_some()
    }

    /// 当前激活序号
    pub fn active_seq(&self) -> Option<usize> {
        self.instance.lock().as_ref().map(DriverInstance::seq)
    }

    /// 注册文件系统类型并保留资源 slab
    pub fn activate(&self) -> Result<(), MyFsError> {
        let mut instance = self.instance.lock();
        if instance.is_some() {
            warn!("[myfs] already active");
            return Err(MyFsError::Registration(RegistrationError::AlreadyRegistered));
        }

        debug!("[myfs] register_filesystem");
        let fs_type: Arc<dyn FileSystemType> = self.fs_type.clone();
        self.vfs.register_filesystem(fs_type).map_err(|e| {
            error!("[myfs] Failed to register filesystem: {}", e);
            registration_error(e)
        })?;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let slab = match ResourcePool::new(self.vfs.slab()).acquire(seq) {
            Ok(slab) => slab,
            Err(e) => {
                self.rollback_registration();
                return Err(e);
            }
        };

        *instance = Some(DriverInstance { seq, slab });
        self.fs_type.set_live(true);
        info!("[myfs] Module loaded (seq={})", seq);
        Ok(())
    }

    /// 注销文件系统类型并释放资源 slab
    ///
    /// # Panics
    ///
    /// 未激活时调用会 panic。
    pub fn deactivate(&self) -> Result<(), MyFsError> {
        let mut instance = self.instance.lock();
        if instance.is_none() {
            panic!("myfs: deactivate without a successful activate");
        }

        debug!("[myfs] unregister_filesystem");
        self.vfs.unregister_filesystem(MYFS_NAME).map_err(|e| {
            error!("[myfs] Can't unregister filesystem: {}", e);
            registration_error(e)
        })?;
        self.fs_type.set_live(false);

        if let Some(DriverInstance { seq, slab }) = instance.take() {
            ResourcePool::new(self.vfs.slab()).release(slab);
            info!("[myfs] Module unloaded (seq={})", seq);
        }
        Ok(())
    }

    /// 撤销一次未完成的激活
    ///
    /// 类型尚未接受挂载，`Busy` 只可能来自正在失败退出的挂载，等它们归还引用即可。
    fn rollback_registration(&self) {
        loop {
            match self.vfs.unregister_filesystem(MYFS_NAME) {
                Ok(()) => return,
                Err(FsError::Busy) => spin_loop(),
                Err(e) => {
                    error!("[myfs] rollback unregister failed: {}", e);
                    return;
                }
            }
        }
    }

    /// 挂载一个 myfs 实例
    pub fn mount(
        &self,
        dev_name: Option<&str>,
        flags: MountFlags,
        data: Option<&[u8]>,
    ) -> Result<MountHandle, MyFsError> {
        Ok(self.vfs.do_mount(MYFS_NAME, dev_name, flags, data)?)
    }

    /// 卸载
    pub fn umount(&self, handle: MountHandle) {
        self.vfs.umount(handle);
    }
}

fn registration_error(e: FsError) -> MyFsError {
    match e {
        FsError::AlreadyExists => MyFsError::Registration(RegistrationError::AlreadyRegistered),
        FsError::NotFound => MyFsError::Registration(RegistrationError::NotRegistered),
        FsError::Busy => MyFsError::Registration(RegistrationError::Busy),
        e => MyFsError::from(e),
    }
}

/// 模块加载入口：成功返回 0，失败返回负的 errno
pub fn module_init(registry: &DriverRegistry) -> i32 {
    match registry.activate() {
        Ok(()) => 0,
        Err(e) => e.to_errno(),
    }
}

/// 模块卸载入口
///
/// 宿主拒绝注销时只记录日志，驱动保持激活。
pub fn module_exit(registry: &DriverRegistry) {
    if let Err(e) = registry.deactivate() {
        warn!("[myfs] module_exit refused: {}", e);
    }
}
