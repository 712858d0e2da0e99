//! Slab 分配器
//!
//! 对应 Linux 的 `kmem_cache_*` 接口：
//!
//! - [`SlabAllocator::create_cache`]：创建一个对象大小固定的缓存
//! - [`SlabAllocator::alloc`]：从缓存中分配一个清零的对象
//! - [`SlabAllocator::free`]：将对象归还给其所属的缓存
//! - [`SlabAllocator::destroy_cache`]：销毁缓存
//!
//! [`KmemCache`] 和 [`SlabObject`] 都不可 `Clone`，`free`/`destroy_cache` 按值接收，
//! 因此重复释放、重复销毁在类型层面就无法表达。
//! 仍然可能出现的误用（把对象还给别的缓存、销毁仍有存活对象的缓存）视为致命错误，直接 panic。

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use log::{debug, error};
use sync::SpinLock;

/// 缓存编号分配器，进程内唯一
static NEXT_CACHE_ID: AtomicUsize = AtomicUsize::new(1);

/// Slab 分配错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// 内存不足 (-ENOMEM)
    OutOfMemory,
    /// 对象大小非法 (-EINVAL)
    InvalidSize,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::OutOfMemory => f.write_str("out of memory"),
            AllocError::InvalidSize => f.write_str("invalid object size"),
        }
    }
}

/// 专用对象缓存
#[derive(Debug)]
pub struct KmemCache {
    id: usize,
    name: String,
    object_size: usize,
    /// 尚未归还的对象数
    live: AtomicUsize,
}

impl KmemCache {
    /// 缓存名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 单个对象的大小（字节）
    pub fn object_size(&self) -> usize {
        self.object_size
    }

    /// 当前已分配且未归还的对象数
    pub fn live_objects(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }
}

/// 从 [`KmemCache`] 中分配出的对象
#[derive(Debug)]
pub struct SlabObject {
    cache_id: usize,
    data: Box<[u8]>,
}

impl SlabObject {
    /// 对象内容
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// 对象内容（可写）
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// 分配器统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlabStats {
    /// 创建过的缓存数
    pub caches_created: usize,
    /// 销毁过的缓存数
    pub caches_destroyed: usize,
    /// 分配过的对象数
    pub objects_allocated: usize,
    /// 归还过的对象数
    pub objects_freed: usize,
}

impl SlabStats {
    /// 当前存活的缓存数
    pub fn live_caches(&self) -> usize {
        self.caches_created - self.caches_destroyed
    }

    /// 当前存活的对象数
    pub fn live_objects(&self) -> usize {
        self.objects_allocated - self.objects_freed
    }
}

/// 宿主侧 slab 分配器
#[derive(Debug, Default)]
pub struct SlabAllocator {
    stats: SpinLock<SlabStats>,
    fail_next_create: AtomicBool,
    fail_next_alloc: AtomicBool,
}

impl SlabAllocator {
    /// 创建新的分配器
    pub const fn new() -> Self {
        Self {
            stats: SpinLock::new(SlabStats {
                caches_created: 0,
                caches_destroyed: 0,
                objects_allocated: 0,
                objects_freed: 0,
            }),
            fail_next_create: AtomicBool::new(false),
            fail_next_alloc: AtomicBool::new(false),
        }
    }

    /// 创建对象大小为 `object_size` 的缓存
    pub fn create_cache(&self, name: &str, object_size: usize) -> Result<KmemCache, AllocError> {
        if object_size == 0 {
            error!("[slab] create_cache({}): zero object size", name);
            return Err(AllocError::InvalidSize);
        }
        if self.fail_next_create.swap(false, Ordering::AcqRel) {
            debug!("[slab] create_cache({}): injected failure", name);
            return Err(AllocError::OutOfMemory);
        }

        let cache = KmemCache {
            id: NEXT_CACHE_ID.fetch_add(1, Ordering::Relaxed),
            name: String::from(name),
            object_size,
            live: AtomicUsize::new(0),
        };
        self.stats.lock().caches_created += 1;
        debug!(
            "[slab] created cache {} (id={}, object_size={})",
            cache.name, cache.id, object_size
        );
        Ok(cache)
    }

    /// 从缓存中分配一个对象，内容清零
    pub fn alloc(&self, cache: &KmemCache) -> Result<SlabObject, AllocError> {
        if self.fail_next_alloc.swap(false, Ordering::AcqRel) {
            debug!("[slab] alloc from {}: injected failure", cache.name);
            return Err(AllocError::OutOfMemory);
        }

        cache.live.fetch_add(1, Ordering::AcqRel);
        self.stats.lock().objects_allocated += 1;
        Ok(SlabObject {
            cache_id: cache.id,
            data: vec![0u8; cache.object_size].into_boxed_slice(),
        })
    }

    /// 将对象归还给缓存
    ///
    /// # Panics
    /// 对象不属于 `cache` 时 panic
    pub fn free(&self, cache: &KmemCache, obj: SlabObject) {
        if obj.cache_id != cache.id {
            panic!(
                "slab: object of cache id {} freed into cache {} (id={})",
                obj.cache_id, cache.name, cache.id
            );
        }
        cache.live.fetch_sub(1, Ordering::AcqRel);
        self.stats.lock().objects_freed += 1;
    }

    /// 销毁缓存
    ///
    /// # Panics
    /// 缓存中仍有未归还的对象时 panic
    pub fn destroy_cache(&self, cache: KmemCache) {
        let live = cache.live_objects();
        if live != 0 {
            panic!(
                "slab: cache {} still has {} objects on destroy",
                cache.name, live
            );
        }
        self.stats.lock().caches_destroyed += 1;
        debug!("[slab] destroyed cache {} (id={})", cache.name, cache.id);
    }

    /// 令下一次 [`create_cache`](Self::create_cache) 失败
    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::Release);
    }

    /// 令下一次 [`alloc`](Self::alloc) 失败
    pub fn fail_next_alloc(&self) {
        self.fail_next_alloc.store(true, Ordering::Release);
    }

    /// 获取统计信息快照
    pub fn stats(&self) -> SlabStats {
        *self.stats.lock()
    }
}
