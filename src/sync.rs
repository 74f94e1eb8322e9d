//! Provides thread-safe memoizing caches.
//!
//! | cache | factory runs per key | lock held by the factory |
//! |:------|:---------------------|:-------------------------|
//! | [`ConcurrentCache`] | at least once under contention | none |
//! | [`InterlockedCache`] | at most once | exclusive |
//! | [`LockOnWriteCache`] | at most once | exclusive |

mod base_cache;
mod builder;
mod concurrent_cache;
mod interlocked_cache;
mod lock_on_write_cache;

pub use {
    builder::CacheBuilder, concurrent_cache::ConcurrentCache,
    interlocked_cache::InterlockedCache, lock_on_write_cache::LockOnWriteCache,
};
