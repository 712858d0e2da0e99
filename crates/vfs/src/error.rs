//! VFS 错误类型
//!
//! 定义了与 POSIX 兼容的文件系统错误码，可通过 [`FsError::to_errno()`] 转换为回调返回的负错误码，
//! 也可通过 [`FsError::from_errno()`] 从负错误码还原。

use core::fmt;

use mm::AllocError;
use uapi::errno::*;

/// VFS 错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 文件/目录相关
    /// 文件不存在 (-ENOENT)
    NotFound,
    /// 文件已存在 (-EEXIST)
    AlreadyExists,
    /// 不是目录 (-ENOTDIR)
    NotDirectory,
    /// 是目录 (-EISDIR)
    IsDirectory,
    /// 目录非空 (-ENOTEMPTY)
    DirectoryNotEmpty,

    // 权限相关
    /// 操作不被允许 (-EPERM)
    NotPermitted,
    /// 权限被拒绝 (-EACCES)
    PermissionDenied,

    // 资源相关
    /// 内存不足 (-ENOMEM)
    NoMemory,
    /// 资源忙 (-EBUSY)
    Busy,

    // 参数相关
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 文件名过长 (-ENAMETOOLONG)
    NameTooLong,

    // 文件系统相关
    /// 只读文件系统 (-EROFS)
    ReadOnlyFs,
    /// 设备空间不足 (-ENOSPC)
    NoSpace,
    /// I/O 错误 (-EIO)
    IoError,
    /// 设备或文件系统类型不存在 (-ENODEV)
    NoDevice,

    // 其他
    /// 操作不支持 (-ENOTSUP)
    NotSupported,
}

impl FsError {
    /// 转换为回调/系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        let errno = match self {
            FsError::NotFound => ENOENT,
            FsError::AlreadyExists => EEXIST,
            FsError::NotDirectory => ENOTDIR,
            FsError::IsDirectory => EISDIR,
            FsError::DirectoryNotEmpty => ENOTEMPTY,
            FsError::NotPermitted => EPERM,
            FsError::PermissionDenied => EACCES,
            FsError::NoMemory => ENOMEM,
            FsError::Busy => EBUSY,
            FsError::InvalidArgument => EINVAL,
            FsError::NameTooLong => ENAMETOOLONG,
            FsError::ReadOnlyFs => EROFS,
            FsError::NoSpace => ENOSPC,
            FsError::IoError => EIO,
            FsError::NoDevice => ENODEV,
            FsError::NotSupported => ENOTSUP,
        };
        -(errno as isize)
    }

    /// 从负错误码还原
    ///
    /// 非负值或不在 `[-MAX_ERRNO, -1]` 范围内的值不是错误，返回 `None`；
    /// 未知的错误码统一视为 [`FsError::IoError`]。
    pub fn from_errno(code: isize) -> Option<Self> {
        if code >= 0 || code < -(MAX_ERRNO as isize) {
            return None;
        }
        let err = match (-code) as i32 {
            ENOENT => FsError::NotFound,
            EEXIST => FsError::AlreadyExists,
            ENOTDIR => FsError::NotDirectory,
            EISDIR => FsError::IsDirectory,
            ENOTEMPTY => FsError::DirectoryNotEmpty,
            EPERM => FsError::NotPermitted,
            EACCES => FsError::PermissionDenied,
            ENOMEM => FsError::NoMemory,
            EBUSY => FsError::Busy,
            EINVAL => FsError::InvalidArgument,
            ENAMETOOLONG => FsError::NameTooLong,
            EROFS => FsError::ReadOnlyFs,
            ENOSPC => FsError::NoSpace,
            ENODEV => FsError::NoDevice,
            ENOTSUP => FsError::NotSupported,
            _ => FsError::IoError,
        };
        Some(err)
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            FsError::NotFound => "no such file or directory",
            FsError::AlreadyExists => "file exists",
            FsError::NotDirectory => "not a directory",
            FsError::IsDirectory => "is a directory",
            FsError::DirectoryNotEmpty => "directory not empty",
            FsError::NotPermitted => "operation not permitted",
            FsError::PermissionDenied => "permission denied",
            FsError::NoMemory => "out of memory",
            FsError::Busy => "device or resource busy",
            FsError::InvalidArgument => "invalid argument",
            FsError::NameTooLong => "file name too long",
            FsError::ReadOnlyFs => "read-only file system",
            FsError::NoSpace => "no space left on device",
            FsError::IoError => "I/O error",
            FsError::NoDevice => "no such device",
            FsError::NotSupported => "operation not supported",
        };
        write!(f, "{} ({})", msg, self.to_errno())
    }
}

impl From<AllocError> for FsError {
    fn from(err: AllocError) -> Self {
        match err {
            AllocError::OutOfMemory => FsError::NoMemory,
            AllocError::InvalidSize => FsError::InvalidArgument,
        }
    }
}
