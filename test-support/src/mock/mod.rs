//! Mock 实现模块

pub mod capture;
pub mod vfs;
