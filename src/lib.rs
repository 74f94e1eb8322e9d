#![warn(clippy::all)]
#![warn(rust_2018_idioms)]

//! Artifact-cache is a family of memoizing key-value caches for artifacts that
//! are expensive to construct, such as generated proxy types keyed by the
//! interface they implement.
//!
//! Every cache in this crate offers the same operation,
//! [`get_or_add`][get-or-add]: return the value stored for a key, or construct
//! it with a factory, store it and return it. Entries are never evicted,
//! expired, updated or removed; a cache memoizes for as long as it lives.
//!
//! The caches differ in how they behave when several threads ask for the same
//! missing key at once:
//!
//! - [`unsync::Cache`][unsync-cache]: no synchronization at all. The type is not
//!   `Sync`, so it can only be used by its owning thread.
//! - [`sync::ConcurrentCache`][concurrent-cache]: optimistic. The factory runs
//!   with no lock held, so racing callers may construct the same value more
//!   than once. Exactly one result is stored and every caller receives it.
//! - [`sync::InterlockedCache`][interlocked-cache] and
//!   [`sync::LockOnWriteCache`][lock-on-write-cache]: pessimistic. The factory
//!   runs under an exclusive lock escalated from an upgradeable read, so it runs
//!   at most once per key. Construction is serialized across the whole cache.
//!
//! The [`GetOrAdd`][get-or-add-trait] trait lets a producer stay generic over
//! the strategy.
//!
//! [get-or-add]: ./trait.GetOrAdd.html#tymethod.get_or_add
//! [get-or-add-trait]: ./trait.GetOrAdd.html
//! [unsync-cache]: ./unsync/struct.Cache.html
//! [concurrent-cache]: ./sync/struct.ConcurrentCache.html
//! [interlocked-cache]: ./sync/struct.InterlockedCache.html
//! [lock-on-write-cache]: ./sync/struct.LockOnWriteCache.html
//!
//! # Example
//!
//! ```rust
//! use artifact_cache::sync::InterlockedCache;
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct ProxyType {
//!     name: String,
//! }
//!
//! let cache = InterlockedCache::new();
//!
//! let first = cache.get_or_add("IFoo".to_string(), |spec| {
//!     Arc::new(ProxyType { name: format!("{spec}Proxy") })
//! });
//! let second = cache.get_or_add("IFoo".to_string(), |_| unreachable!());
//!
//! assert_eq!(first.name, "IFooProxy");
//! assert!(Arc::ptr_eq(&first, &second));
//!
//! // Tear down the lock once the cache is no longer used.
//! assert!(cache.dispose());
//! assert!(!cache.dispose());
//! ```
//!
//! # Key requirements
//!
//! Keys are compared with their own `Hash` and `Eq` implementations. Both must
//! be consistent with each other and stable for as long as the key is stored.
//!
//! # Crate features
//!
//! - `logging`: emits log lines through the [`log`][log-crate] crate when a
//!   cache is torn down, when a redundant construction is discarded and when a
//!   release listener panics.
//!
//! [log-crate]: https://crates.io/crates/log

pub(crate) mod common;
pub mod notification;
pub mod ops;
pub mod sync;
pub mod unsync;

pub use common::{
    disposable::ExclusiveDisposable,
    error::CacheError,
    lock::{NestedWriteHandle, ReadHandle, SharedLock, UpgradeableReadHandle, WriteHandle},
};
pub use ops::GetOrAdd;
