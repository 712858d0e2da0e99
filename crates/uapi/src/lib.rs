//! 与用户空间共用定义和声明
//!
//! 包含错误码和时间类型，保证宿主模型与驱动对外暴露的数值和 Linux 一致。

#![no_std]
#![allow(missing_docs)]

pub mod errno;
pub mod time;
