use super::*;
use vfs::{FaultPoint, FileSystemType, FsError, SuperBlock};

#[test]
fn test_fill_super_reports_root_creation() {
    test_support::init();
    let vfs = Vfs::new();
    let fs_type: Arc<dyn FileSystemType> = Arc::new(MyFsType::new());

    let mut seen: Option<(Arc<SuperBlock>, Result<(), MyFsError>)> = None;
    vfs.faults().arm(FaultPoint::DMakeRoot);
    let result = vfs.mount_nodev(&fs_type, MountFlags::SILENT, None, |sb, data, silent| {
        let res = MountSession::new(&vfs).fill_super(sb, data, silent);
        seen = Some((sb.clone(), res));
        res.map_err(MyFsError::to_fs_error)
    });

    assert_eq!(result.unwrap_err(), FsError::NoMemory);
    let (sb, res) = seen.unwrap();
    assert_eq!(res, Err(MyFsError::RootCreation));
    assert!(sb.root().is_none());
    assert!(!sb.is_active());
    assert_eq!(vfs.live_inodes(), 0);
    assert_eq!(vfs.active_supers(), 0);
}

#[test]
fn test_fill_super_stamps_superblock() {
    test_support::init();
    let vfs = Vfs::new();
    let fs_type: Arc<dyn FileSystemType> = Arc::new(MyFsType::new());

    let root = vfs
        .mount_nodev(&fs_type, MountFlags::empty(), None, |sb, data, silent| {
            MountSession::new(&vfs)
                .fill_super(sb, data, silent)
                .map_err(MyFsError::to_fs_error)
        })
        .unwrap();
    let sb = root.super_block().unwrap();
    assert_eq!(sb.magic(), config::MYFS_MAGIC);
    assert_eq!(root.inode().ino(), config::ROOT_INODE_NO);
    assert!(sb.is_active());

    drop(root);
    vfs.kill_anon_super(&sb);
    assert_eq!(sb.put_super_calls(), 1);
    assert_eq!(vfs.live_inodes(), 0);
}

#[test]
fn test_type_refuses_mounts_until_live() {
    test_support::init();
    let vfs = Vfs::new();
    let fs_type = Arc::new(MyFsType::new());
    assert!(!fs_type.is_live());
    vfs.register_filesystem(fs_type.clone()).unwrap();

    let result = vfs.do_mount(config::MYFS_NAME, None, MountFlags::empty(), None);
    assert_eq!(result.unwrap_err(), FsError::NoDevice);
    assert_eq!(vfs.active_supers(), 0);
    assert_eq!(vfs.fs_users(config::MYFS_NAME), 0);
    vfs.unregister_filesystem(config::MYFS_NAME).unwrap();
}

#[test]
fn test_registry_type_is_live_only_while_active() {
    let registry = active_registry();
    let vfs = registry.vfs().clone();
    let mnt = mount(&registry);
    registry.umount(mnt);
    registry.deactivate().unwrap();

    // 停用后宿主中不残留类型引用
    assert_eq!(vfs.fs_users(config::MYFS_NAME), 0);
    assert!(!vfs.is_registered(config::MYFS_NAME));
}
