//! `MountFlags::SILENT` 只抑制错误日志
//!
//! 独立的测试二进制，日志缓冲区里不会混入其他测试的输出。

use std::sync::Arc;

use myfs::{DriverRegistry, MyFsError};
use vfs::{FaultPoint, MountFlags, Vfs};

#[test]
fn test_silent_fill_failure() {
    test_support::init();
    let registry = DriverRegistry::new(Arc::new(Vfs::new()));
    registry.activate().unwrap();
    let vfs = registry.vfs();

    vfs.faults().arm(FaultPoint::NewInode);
    let result = registry.mount(None, MountFlags::SILENT, None);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);
    assert!(test_support::logs_containing("inode allocation failed").is_empty());
    // 挂载失败本身仍然记录
    assert!(
        test_support::captured_logs()
            .iter()
            .any(|line| line.starts_with("ERROR") && line.contains("mounting failed"))
    );

    vfs.faults().arm(FaultPoint::NewInode);
    let result = registry.mount(None, MountFlags::empty(), None);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);
    assert_eq!(
        test_support::logs_containing("inode allocation failed").len(),
        1
    );

    vfs.faults().arm(FaultPoint::DMakeRoot);
    let result = registry.mount(None, MountFlags::SILENT, None);
    assert!(result.is_err());
    assert!(test_support::logs_containing("root creation failed").is_empty());

    registry.deactivate().unwrap();
}
