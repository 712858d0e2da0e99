//! 驱动错误类型

use core::fmt;

use mm::AllocError;
use uapi::errno::EINVAL;
use vfs::FsError;

/// 类型表操作失败的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// 同名类型已注册
    AlreadyRegistered,
    /// 类型未注册
    NotRegistered,
    /// 仍有挂载实例，宿主拒绝注销
    Busy,
}

/// 驱动错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MyFsError {
    /// inode、缓存或 slab 分配失败
    Allocation,
    /// 注册或注销失败
    Registration(RegistrationError),
    /// 由有效 inode 构造根目录项失败
    RootCreation,
    /// 其他宿主错误
    Host(FsError),
}

impl MyFsError {
    /// 转换为宿主错误
    ///
    /// 根目录项构造失败对宿主而言也是内存不足。
    pub fn to_fs_error(self) -> FsError {
        match self {
            MyFsError::Allocation | MyFsError::RootCreation => FsError::NoMemory,
            MyFsError::Registration(RegistrationError::AlreadyRegistered) => FsError::AlreadyExists,
            MyFsError::Registration(RegistrationError::NotRegistered) => FsError::NotFound,
            MyFsError::Registration(RegistrationError::Busy) => FsError::Busy,
            MyFsError::Host(e) => e,
        }
    }

    /// 转换为负的 errno
    pub fn to_errno(self) -> i32 {
        i32::try_from(self.to_fs_error().to_errno()).unwrap_or(-EINVAL)
    }
}

impl From<FsError> for MyFsError {
    fn from(e: FsError) -> Self {
        match e {
            FsError::NoMemory => MyFsError::Allocation,
            e => MyFsError::Host(e),
        }
    }
}

impl From<AllocError> for MyFsError {
    fn from(_: AllocError) -> Self {
        MyFsError::Allocation
    }
}

impl fmt::Display for MyFsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MyFsError::Allocation => write!(f, "allocation failed"),
            MyFsError::Registration(RegistrationError::AlreadyRegistered) => {
                write!(f, "filesystem already registered")
            }
            MyFsError::Registration(RegistrationError::NotRegistered) => {
                write!(f, "filesystem not registered")
            }
            MyFsError::Registration(RegistrationError::Busy) => {
                write!(f, "filesystem still mounted")
            }
            MyFsError::RootCreation => write!(f, "root creation failed"),
            MyFsError::Host(e) => write!(f, "host error: {}", e),
        }
    }
}
