//! 资源池
//!
//! 驱动激活期间独占一个专用 slab 缓存和从中分配的一个对象。缓存和对象都由
//! [`ResourceSlab`] 持有，所有权保证它们只能被释放一次。

use log::{debug, error};
use mm::{KmemCache, SlabAllocator, SlabObject};

use crate::MyFsError;
use crate::config::{SLAB_NAME, SLAB_OBJECT_SIZE};

/// 已保留的资源：缓存及其中的一个对象
#[derive(Debug)]
pub struct ResourceSlab {
    cache: KmemCache,
    record: SlabObject,
}

impl ResourceSlab {
    /// 记录中保存的激活序号
    pub fn seq(&self) -> usize {
        let mut buf = [0u8; SLAB_OBJECT_SIZE];
        buf.copy_from_slice(self.record.as_bytes());
        usize::from_ne_bytes(buf)
    }

    /// 所属缓存
    pub fn cache(&self) -> &KmemCache {
        &self.cache
    }
}

/// 从宿主 slab 分配器保留驱动资源
pub struct ResourcePool<'a> {
    allocator: &'a SlabAllocator,
}

impl<'a> ResourcePool<'a> {
    /// 绑定到宿主分配器
    pub fn new(allocator: &'a SlabAllocator) -> Self {
        Self { allocator }
    }

    /// 创建缓存并分配一个对象，对象中写入 `seq`
    ///
    /// 对象分配失败时先销毁刚创建的缓存再返回错误。
    pub fn acquire(&self, seq: usize) -> Result<ResourceSlab, MyFsError> {
        debug!("[myfs] kmem_cache_create {}", SLAB_NAME);
        let cache = self
            .allocator
            .create_cache(SLAB_NAME, SLAB_OBJECT_SIZE)
            .inspect_err(|e| error!("[myfs] Failed to create cache: {}", e))?;

        let mut record = match self.allocator.alloc(&cache) {
            Ok(obj) => obj,
            Err(e) => {
                error!("[myfs] Failed to allocate cache: {}", e);
                self.allocator.destroy_cache(cache);
                return Err(e.into());
            }
        };
        record.as_bytes_mut().copy_from_slice(&seq.to_ne_bytes());
        debug!("[myfs] kmem_cache_alloc (seq={})", seq);

        Ok(ResourceSlab { cache, record })
    }

    /// 释放对象，然后销毁缓存
    pub fn release(&self, slab: ResourceSlab) {
        let ResourceSlab { cache, record } = slab;
        debug!("[myfs] kmem_cache_free");
        self.allocator.free(&cache, record);
        debug!("[myfs] kmem_cache_destroy");
        self.allocator.destroy_cache(cache);
    }
}
