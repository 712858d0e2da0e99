// Unit tests for the host VFS model.
//
// 每个测试创建独立的 `Vfs` 实例；`VfsOps` 是全局注册的，由 `init()` 保证只注册一次。

extern crate std;

use alloc::sync::Arc;
use std::sync::Once;

use uapi::time::TimeSpec;

use crate::libfs::{SIMPLE_DIR_INODE_OPERATIONS, SIMPLE_DIR_OPERATIONS};
use crate::*;


pub(super) const TEST_MAGIC: u64 = 0x7e57;
pub(super) const TEST_NOW: TimeSpec = TimeSpec {
    tv_sec: 1_700_000_000,
    tv_nsec: 123_456_789,
};

struct TestVfsOps;

impl VfsOps for TestVfsOps {
    fn page_size(&self) -> usize {
        4096
    }

    fn timespec_now(&self) -> TimeSpec {
        TEST_NOW
    }

    fn current_fsuid(&self) -> u32 {
        1000
    }

    fn current_fsgid(&self) -> u32 {
        1000
    }
}

static TEST_VFS_OPS: TestVfsOps = TestVfsOps;
static INIT: Once = Once::new();

pub(super) fn init() {
    INIT.call_once(|| unsafe { register_vfs_ops(&TEST_VFS_OPS) });
}

struct TestSuperOps;

impl SuperOperations for TestSuperOps {}

/// 最小的无设备文件系统，`rootless` 时 fill_super 报告成功但不安装根
pub(super) struct TestFs {
    pub name: &'static str,
    pub flags: FsTypeFlags,
    pub rootless: bool,
}

impl TestFs {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            flags: FsTypeFlags::USERNS_MOUNT,
            rootless: false,
        })
    }
}

impl FileSystemType for TestFs {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fs_flags(&self) -> FsTypeFlags {
        self.flags
    }

    fn fill_super(
        &self,
        vfs: &Vfs,
        sb: &Arc<SuperBlock>,
        _data: Option<&[u8]>,
        _silent: bool,
    ) -> Result<(), FsError> {
        sb.set_block_size(4096, 12)?;
        sb.set_magic(TEST_MAGIC);
        sb.set_op(Arc::new(TestSuperOps));
        if self.rootless {
            return Ok(());
        }

        let inode = vfs.new_inode(sb)?;
        inode.set_mode(FileMode::S_IFDIR | FileMode::from_bits_truncate(0o755));
        inode.set_ops(&SIMPLE_DIR_INODE_OPERATIONS, &SIMPLE_DIR_OPERATIONS);
        inode.set_ino(1);
        match vfs.d_make_root(&inode) {
            Ok(root) => {
                sb.set_root(root);
                Ok(())
            }
            Err(e) => {
                vfs.iput(inode);
                Err(e)
            }
        }
    }

    fn mount(
        &self,
        vfs: &Vfs,
        fs_type: &Arc<dyn FileSystemType>,
        flags: MountFlags,
        _dev_name: Option<&str>,
        data: Option<&[u8]>,
    ) -> Result<Arc<Dentry>, FsError> {
        vfs.mount_nodev(fs_type, flags, data, |sb, data, silent| {
            self.fill_super(vfs, sb, data, silent)
        })
    }

    fn kill_sb(&self, vfs: &Vfs, sb: &Arc<SuperBlock>) {
        vfs.kill_anon_super(sb);
    }
}
