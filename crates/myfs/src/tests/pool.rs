use super::*;
use mm::SlabAllocator;

use crate::config::{SLAB_NAME, SLAB_OBJECT_SIZE};

#[test]
fn test_acquire_and_release() {
    let allocator = SlabAllocator::new();
    let pool = ResourcePool::new(&allocator);

    let slab = pool.acquire(7).unwrap();
    assert_eq!(slab.seq(), 7);
    assert_eq!(slab.cache().name(), SLAB_NAME);
    assert_eq!(slab.cache().object_size(), SLAB_OBJECT_SIZE);
    assert_eq!(slab.cache().live_objects(), 1);

    let stats = allocator.stats();
    assert_eq!(stats.live_caches(), 1);
    assert_eq!(stats.live_objects(), 1);

    pool.release(slab);
    let stats = allocator.stats();
    assert_eq!(stats.caches_created, 1);
    assert_eq!(stats.caches_destroyed, 1);
    assert_eq!(stats.objects_allocated, 1);
    assert_eq!(stats.objects_freed, 1);
}

#[test]
fn test_cache_creation_failure() {
    let allocator = SlabAllocator::new();
    allocator.fail_next_create();

    let result = ResourcePool::new(&allocator).acquire(1);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);
    assert_eq!(allocator.stats().caches_created, 0);
}

#[test]
fn test_object_failure_destroys_cache() {
    let allocator = SlabAllocator::new();
    allocator.fail_next_alloc();

    let result = ResourcePool::new(&allocator).acquire(1);
    assert_eq!(result.unwrap_err(), MyFsError::Allocation);

    let stats = allocator.stats();
    assert_eq!(stats.caches_created, 1);
    assert_eq!(stats.caches_destroyed, 1);
    assert_eq!(stats.live_caches(), 0);
}
