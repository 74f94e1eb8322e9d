use super::{ConcurrentCache, InterlockedCache, LockOnWriteCache};
use crate::notification::{ReleaseCause, ReleaseListener};

use std::{
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
    sync::Arc,
};

/// Builds a [`ConcurrentCache`][concurrent-cache],
/// [`InterlockedCache`][interlocked-cache] or
/// [`LockOnWriteCache`][lock-on-write-cache] with various configuration knobs.
///
/// [concurrent-cache]: ./struct.ConcurrentCache.html
/// [interlocked-cache]: ./struct.InterlockedCache.html
/// [lock-on-write-cache]: ./struct.LockOnWriteCache.html
///
/// # Example
///
/// ```rust
/// use artifact_cache::{notification::ReleaseCause, sync::InterlockedCache};
///
/// let cache = InterlockedCache::builder()
///     // A name shows up in the log lines emitted by the cache.
///     .name("proxy types")
///     // Reserve room for 64 entries up front.
///     .initial_capacity(64)
///     // Called exactly once, when the lock of the cache is torn down.
///     .release_listener(|cause| assert_eq!(cause, ReleaseCause::Explicit))
///     .build();
///
/// let ty = cache.get_or_add("IFoo", |spec| format!("Proxy<{spec}>"));
/// assert_eq!(ty, "Proxy<IFoo>");
///
/// cache.dispose();
/// ```
///
#[must_use]
pub struct CacheBuilder<K, V, C> {
    name: Option<String>,
    initial_capacity: Option<usize>,
    release_listener: Option<ReleaseListener>,
    cache_type: PhantomData<C>,
    kv_types: PhantomData<fn() -> (K, V)>,
}

impl<K, V, C> Default for CacheBuilder<K, V, C> {
    fn default() -> Self {
        Self {
            name: None,
            initial_capacity: None,
            release_listener: None,
            cache_type: PhantomData,
            kv_types: PhantomData,
        }
    }
}

impl<K, V> CacheBuilder<K, V, ConcurrentCache<K, V, RandomState>>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Builds a `ConcurrentCache<K, V>`.
    pub fn build(self) -> ConcurrentCache<K, V, RandomState> {
        self.build_with_hasher(RandomState::default())
    }

    /// Builds a `ConcurrentCache<K, V, S>` with the given `hasher`.
    pub fn build_with_hasher<S>(self, hasher: S) -> ConcurrentCache<K, V, S>
    where
        S: BuildHasher,
    {
        ConcurrentCache::with_everything(
            self.name,
            self.initial_capacity,
            hasher,
            self.release_listener,
        )
    }
}

impl<K, V> CacheBuilder<K, V, InterlockedCache<K, V, RandomState>>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Builds an `InterlockedCache<K, V>`.
    pub fn build(self) -> InterlockedCache<K, V, RandomState> {
        self.build_with_hasher(RandomState::default())
    }

    /// Builds an `InterlockedCache<K, V, S>` with the given `hasher`.
    pub fn build_with_hasher<S>(self, hasher: S) -> InterlockedCache<K, V, S>
    where
        S: BuildHasher,
    {
        InterlockedCache::with_everything(
            self.name,
            self.initial_capacity,
            hasher,
            self.release_listener,
        )
    }
}

impl<K, V> CacheBuilder<K, V, LockOnWriteCache<K, V, RandomState>>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Builds a `LockOnWriteCache<K, V>`.
    pub fn build(self) -> LockOnWriteCache<K, V, RandomState> {
        self.build_with_hasher(RandomState::default())
    }

    /// Builds a `LockOnWriteCache<K, V, S>` with the given `hasher`.
    pub fn build_with_hasher<S>(self, hasher: S) -> LockOnWriteCache<K, V, S>
    where
        S: BuildHasher,
    {
        LockOnWriteCache::with_everything(
            self.name,
            self.initial_capacity,
            hasher,
            self.release_listener,
        )
    }
}

impl<K, V, C> CacheBuilder<K, V, C> {
    /// Sets the name of the cache. Currently the name is used for
    /// identification only in logging messages.
    pub fn name(self, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..self
        }
    }

    /// Sets the initial capacity (number of entries) of the cache.
    pub fn initial_capacity(self, number_of_entries: usize) -> Self {
        Self {
            initial_capacity: Some(number_of_entries),
            ..self
        }
    }

    /// Sets the release listener closure to the cache.
    ///
    /// The closure is called exactly once per cache: with
    /// `ReleaseCause::Explicit` when the cache is disposed, or with
    /// `ReleaseCause::Dropped` when it is dropped without having been disposed.
    ///
    /// # Panics
    ///
    /// A panic raised by the closure is caught and never reaches the caller of
    /// `dispose` or the code dropping the cache. With the `logging` feature
    /// enabled, the panic is logged at the error level.
    pub fn release_listener(
        self,
        listener: impl Fn(ReleaseCause) + Send + Sync + 'static,
    ) -> Self {
        let listener: ReleaseListener = Arc::new(listener);
        Self {
            release_listener: Some(listener),
            ..self
        }
    }
}

impl<K, V, C> fmt::Debug for CacheBuilder<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("name", &self.name)
            .field("initial_capacity", &self.initial_capacity)
            .field("has_release_listener", &self.release_listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::CacheBuilder;
    use crate::sync::{ConcurrentCache, InterlockedCache, LockOnWriteCache};

    #[test]
    fn build_cache() {
        // ConcurrentCache<char, String>
        let cache = ConcurrentCache::builder().name("concurrent").build();
        assert_eq!(cache.name(), Some("concurrent"));
        assert_eq!(cache.get_or_add('a', |_| "Alice".to_string()), "Alice");

        // InterlockedCache<char, String>
        let cache = InterlockedCache::builder().initial_capacity(100).build();
        assert_eq!(cache.name(), None);
        assert_eq!(cache.get_or_add('a', |_| "Alice".to_string()), "Alice");

        // LockOnWriteCache<char, String>
        let builder: CacheBuilder<char, String, LockOnWriteCache<char, String>> =
            CacheBuilder::default();
        let cache = builder.name("lock on write").build();
        assert_eq!(cache.name(), Some("lock on write"));
        assert_eq!(cache.get_or_add('a', |_| "Alice".to_string()), "Alice");
    }

    #[test]
    fn debug_format() {
        let builder = InterlockedCache::<u8, u8>::builder()
            .name("dbg")
            .release_listener(|_| ());
        let s = format!("{builder:?}");
        assert!(s.contains("\"dbg\""));
        assert!(s.contains("has_release_listener: true"));
    }
}
