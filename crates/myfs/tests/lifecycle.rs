//! 驱动生命周期的集成测试：激活、挂载、卸载、停用

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use myfs::config::{MYFS_MAGIC, MYFS_NAME, ROOT_INODE_NO, ROOT_MODE};
use myfs::{DriverRegistry, MyFsError, RegistrationError, module_exit, module_init};
use test_support::mock::vfs::MOCK_PAGE_SIZE;
use uapi::errno::{EEXIST, ENOMEM};
use vfs::{FaultPoint, FsError, FsTypeFlags, MountFlags, Vfs};

fn registry() -> DriverRegistry {
    test_support::init();
    DriverRegistry::new(Arc::new(Vfs::new()))
}

#[test]
fn test_mount_produces_initialized_root() {
    let registry = registry();
    registry.activate().unwrap();

    let mnt = registry.mount(Some("/any"), MountFlags::empty(), None).unwrap();
    let sb = mnt.super_block();
    assert_eq!(mnt.root().inode().ino(), ROOT_INODE_NO);
    assert_eq!(mnt.root().inode().mode(), ROOT_MODE);
    assert_eq!(sb.magic(), MYFS_MAGIC);
    assert_eq!(sb.block_size(), MOCK_PAGE_SIZE);
    assert_eq!(sb.block_size_bits(), 12);
    assert!(sb.s_op().is_some());
    assert!(sb.is_active());

    registry.umount(mnt);
    registry.deactivate().unwrap();
}

#[test]
fn test_inode_allocation_failure_exposes_no_superblock() {
    let registry = registry();
    registry.activate().unwrap();
    let vfs = registry.vfs();

    vfs.faults().arm(FaultPoint::NewInode);
    let result = registry.mount(None, MountFlags::empty(), None);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);
    assert_eq!(vfs.active_supers(), 0);
    assert_eq!(vfs.live_inodes(), 0);
    assert!(vfs.list_mounts().is_empty());

    // 失败的挂载不妨碍注销
    registry.deactivate().unwrap();
}

#[test]
fn test_root_creation_failure_releases_inode() {
    let registry = registry();
    registry.activate().unwrap();
    let vfs = registry.vfs();

    vfs.faults().arm(FaultPoint::DMakeRoot);
    let result = registry.mount(None, MountFlags::empty(), None);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);
    assert_eq!(vfs.live_inodes(), 0);
    assert_eq!(vfs.active_supers(), 0);

    registry.deactivate().unwrap();
}

#[test]
fn test_superblock_allocation_failure() {
    let registry = registry();
    registry.activate().unwrap();

    registry.vfs().faults().arm(FaultPoint::AllocSuper);
    let result = registry.mount(None, MountFlags::empty(), None);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);

    registry.deactivate().unwrap();
}

#[test]
fn test_unregister_refused_while_mounted() {
    let registry = registry();
    registry.activate().unwrap();
    let vfs = registry.vfs().clone();

    let mnt = registry.mount(None, MountFlags::empty(), None).unwrap();
    assert_eq!(
        registry.deactivate(),
        Err(MyFsError::Registration(RegistrationError::Busy))
    );
    assert!(registry.is_active());
    assert!(vfs.is_registered(MYFS_NAME));
    assert_eq!(vfs.fs_users(MYFS_NAME), 1);
    let stats = vfs.slab().stats();
    assert_eq!(stats.live_caches(), 1);
    assert_eq!(stats.live_objects(), 1);

    registry.umount(mnt);
    registry.deactivate().unwrap();
    assert!(!registry.is_active());
    assert!(!vfs.is_registered(MYFS_NAME));
    let stats = vfs.slab().stats();
    assert_eq!(stats.live_caches(), 0);
    assert_eq!(stats.objects_freed, 1);
    assert_eq!(stats.caches_destroyed, 1);
}

#[test]
fn test_double_activation_keeps_one_slab() {
    let registry = registry();
    registry.activate().unwrap();
    let seq = registry.active_seq();

    assert_eq!(
        registry.activate(),
        Err(MyFsError::Registration(RegistrationError::AlreadyRegistered))
    );
    let stats = registry.vfs().slab().stats();
    assert_eq!(stats.caches_created, 1);
    assert_eq!(stats.live_objects(), 1);
    assert_eq!(registry.active_seq(), seq);

    registry.deactivate().unwrap();
}

#[test]
fn test_name_taken_by_another_registry() {
    test_support::init();
    let vfs = Arc::new(Vfs::new());
    let first = DriverRegistry::new(vfs.clone());
    let second = DriverRegistry::new(vfs.clone());

    first.activate().unwrap();
    assert_eq!(
        second.activate(),
        Err(MyFsError::Registration(RegistrationError::AlreadyRegistered))
    );
    assert!(!second.is_active());
    assert_eq!(vfs.slab().stats().caches_created, 1);

    first.deactivate().unwrap();
}

#[test]
#[should_panic(expected = "deactivate without a successful activate")]
fn test_deactivate_inactive_panics() {
    let registry = registry();
    let _ = registry.deactivate();
}

#[test]
fn test_deactivate_inactive_releases_nothing() {
    let registry = registry();
    let result = panic::catch_unwind(AssertUnwindSafe(|| registry.deactivate()));
    assert!(result.is_err());

    let stats = registry.vfs().slab().stats();
    assert_eq!(stats.objects_freed, 0);
    assert_eq!(stats.caches_destroyed, 0);
}

#[test]
fn test_slab_failure_rolls_back_registration() {
    let registry = registry();
    let vfs = registry.vfs().clone();

    vfs.slab().fail_next_alloc();
    assert_eq!(registry.activate(), Err(MyFsError::Allocation));
    assert!(!registry.is_active());
    assert!(!vfs.is_registered(MYFS_NAME));
    let stats = vfs.slab().stats();
    assert_eq!(stats.caches_created, 1);
    assert_eq!(stats.caches_destroyed, 1);

    vfs.slab().fail_next_create();
    assert_eq!(module_init(&registry), -ENOMEM);
    assert!(!vfs.is_registered(MYFS_NAME));

    // 故障过后可以正常激活
    assert_eq!(module_init(&registry), 0);
    assert!(vfs.is_registered(MYFS_NAME));
    module_exit(&registry);
    assert!(!registry.is_active());
}

#[test]
fn test_module_entry_points() {
    let registry = registry();
    assert_eq!(module_init(&registry), 0);
    assert_eq!(module_init(&registry), -EEXIST);

    let mnt = registry.mount(None, MountFlags::empty(), None).unwrap();
    // 仍有挂载时卸载模块被拒绝，驱动保持激活
    module_exit(&registry);
    assert!(registry.is_active());

    registry.umount(mnt);
    module_exit(&registry);
    assert!(!registry.is_active());
}

#[test]
fn test_activation_sequence_is_stored_in_slab() {
    let registry = registry();
    registry.activate().unwrap();
    let first = registry.active_seq().unwrap();
    registry.deactivate().unwrap();
    assert_eq!(registry.active_seq(), None);

    registry.activate().unwrap();
    let second = registry.active_seq().unwrap();
    assert!(second > first);
    registry.deactivate().unwrap();
}

#[test]
fn test_identity() {
    let registry = registry();
    let identity = registry.identity();
    assert_eq!(identity.name, "myfs");
    assert_eq!(identity.magic, 0xAD727DA);
    assert_eq!(identity.flags, FsTypeFlags::USERNS_MOUNT);
}

#[test]
fn test_mount_while_inactive() {
    let registry = registry();
    let result = registry.mount(None, MountFlags::empty(), None);
    assert_eq!(result.unwrap_err(), MyFsError::Host(FsError::NoDevice));
}

#[test]
fn test_userns_mount() {
    let registry = registry();
    registry.activate().unwrap();

    let mnt = registry
        .vfs()
        .do_mount_in_userns(MYFS_NAME, None, MountFlags::empty(), None)
        .unwrap();
    assert_eq!(mnt.root().inode().ino(), ROOT_INODE_NO);

    registry.umount(mnt);
    registry.deactivate().unwrap();
}

#[test]
fn test_statfs_readdir_lookup() {
    let registry = registry();
    registry.activate().unwrap();
    let vfs = registry.vfs();
    let mnt = registry.mount(None, MountFlags::empty(), None).unwrap();

    let st = vfs.statfs(&mnt).unwrap();
    assert_eq!(st.fs_magic, MYFS_MAGIC);
    assert_eq!(st.block_size, MOCK_PAGE_SIZE);
    assert_eq!(st.max_filename_len, 255);

    let entries = vfs.readdir(&mnt).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, [".", ".."]);
    assert!(entries.iter().all(|e| e.inode_no == ROOT_INODE_NO));

    assert!(vfs.lookup(&mnt, "anything").unwrap().is_none());

    registry.umount(mnt);
    registry.deactivate().unwrap();
}

#[test]
fn test_put_super_runs_once_per_mount() {
    let registry = registry();
    registry.activate().unwrap();
    let vfs = registry.vfs();

    let mnt = registry.mount(None, MountFlags::empty(), None).unwrap();
    let sb = mnt.super_block().clone();
    let pattern = format!("put_super (sb={})", sb.id());
    assert!(test_support::logs_containing(&pattern).is_empty());

    registry.umount(mnt);
    assert_eq!(sb.put_super_calls(), 1);
    assert_eq!(test_support::logs_containing(&pattern).len(), 1);
    assert!(!sb.is_active());
    assert!(sb.root().is_none());
    assert_eq!(vfs.live_inodes(), 0);

    // 宿主拒绝第二次销毁
    vfs.kill_anon_super(&sb);
    assert_eq!(sb.put_super_calls(), 1);
    assert_eq!(test_support::logs_containing(&pattern).len(), 1);

    registry.deactivate().unwrap();
}

#[test]
fn test_mounts_are_independent() {
    let registry = registry();
    registry.activate().unwrap();

    let a = registry.mount(None, MountFlags::empty(), None).unwrap();
    let b = registry.mount(None, MountFlags::RDONLY, None).unwrap();
    assert_ne!(a.super_block().id(), b.super_block().id());
    assert_ne!(a.super_block().dev(), b.super_block().dev());
    assert_eq!(a.root().inode().ino(), ROOT_INODE_NO);
    assert_eq!(b.root().inode().ino(), ROOT_INODE_NO);
    assert_eq!(registry.vfs().active_supers(), 2);

    registry.umount(a);
    // 一个挂载仍在
    assert!(registry.deactivate().is_err());
    registry.umount(b);
    registry.deactivate().unwrap();
}

#[test]
fn test_concurrent_mounts() {
    let registry = Arc::new(registry());
    registry.activate().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    let mnt = registry.mount(None, MountFlags::empty(), None).unwrap();
                    assert_eq!(mnt.root().inode().ino(), ROOT_INODE_NO);
                    registry.umount(mnt);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.vfs().active_supers(), 0);
    assert_eq!(registry.vfs().live_inodes(), 0);
    registry.deactivate().unwrap();
}
