// Unit tests for the myfs driver.

extern crate std;

use alloc::sync::Arc;

use vfs::{MountFlags, Vfs};

use crate::*;

mod pool;
mod session;

/// 激活一个新宿主上的驱动
pub(super) fn active_registry() -> DriverRegistry {
    test_support::init();
    let registry = DriverRegistry::new(Arc::new(Vfs::new()));
    registry.activate().unwrap();
    registry
}

pub(super) fn mount(registry: &DriverRegistry) -> vfs::MountHandle {
    registry.mount(None, MountFlags::empty(), None).unwrap()
}
