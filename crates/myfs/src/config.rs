//! 驱动常量

use vfs::FileMode;

/// 模块许可证
pub const MODULE_LICENSE: &str = "GPL";
/// 模块作者
pub const MODULE_AUTHOR: &str = "myfs Contributors";
/// 模块描述
pub const MODULE_DESCRIPTION: &str = "minimal in-memory pseudo filesystem";

/// 文件系统类型名
pub const MYFS_NAME: &str = "myfs";
/// 超级块魔数
pub const MYFS_MAGIC: u64 = 0xAD727DA;

/// 资源 slab 缓存名
pub const SLAB_NAME: &str = "myfs_slab";
/// slab 对象大小：一个指针
pub const SLAB_OBJECT_SIZE: usize = core::mem::size_of::<usize>();

/// 根 inode 编号
pub const ROOT_INODE_NO: usize = 1;
/// 根目录模式：`S_IFDIR | 0755`
pub const ROOT_MODE: FileMode = FileMode::from_bits_truncate(0o040_755);
