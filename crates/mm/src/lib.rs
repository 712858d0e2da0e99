//! 内存管理子系统
//!
//! 目前只提供宿主侧的 slab 分配器（[`SlabAllocator`]），供文件系统驱动在模块
//! 生命周期内申请专用缓存和固定大小的对象。
//!
//! 分配器支持一次性故障注入，用于验证调用者在分配失败时不会残留中间状态。

#![no_std]

extern crate alloc;

pub mod slab;

pub use slab::{AllocError, KmemCache, SlabAllocator, SlabObject, SlabStats};
