//! 测试支持 crate
//!
//! 提供 Mock 宿主设施和日志捕获，供驱动的集成测试使用。
//!
//! 测试开始前调用一次 [`init`]：注册 [`mock::vfs::MOCK_VFS_OPS`] 并安装捕获日志器。

pub mod mock;

use std::sync::Once;

pub use mock::capture::{captured_logs, logs_containing};

static INIT: Once = Once::new();

/// 注册 Mock 宿主设施并安装捕获日志器，可重复调用
pub fn init() {
    INIT.call_once(|| {
        unsafe { vfs::register_vfs_ops(&mock::vfs::MOCK_VFS_OPS) };
        mock::capture::install();
    });
}
