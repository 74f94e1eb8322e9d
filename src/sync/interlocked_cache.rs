use super::{base_cache::BaseCache, CacheBuilder};
use crate::{notification::ReleaseListener, GetOrAdd};

use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
};

/// A thread-safe memoizing cache that runs each factory at most once per key.
///
/// `InterlockedCache` is the _pessimistic_ strategy.
/// [`get_or_add`](#method.get_or_add) checks for the key under an upgradeable
/// read lock and, on a miss, escalates to the exclusive lock and calls the
/// factory while holding it. Concurrent callers for the same key wait for that
/// construction to finish and then return the stored value.
///
/// The price is that construction is serialized cache-wide: while one factory
/// runs, every other `get_or_add` call on this cache waits, even for unrelated
/// keys. Choose this cache when factories are expensive or have side effects
/// and must not be duplicated. Otherwise, [`ConcurrentCache`][concurrent-cache]
/// lets constructions of different keys proceed in parallel.
///
/// [concurrent-cache]: ./struct.ConcurrentCache.html
///
/// # Examples
///
/// ```rust
/// use artifact_cache::sync::InterlockedCache;
///
/// use std::{
///     sync::{
///         atomic::{AtomicUsize, Ordering},
///         Arc,
///     },
///     thread,
/// };
///
/// const NUM_THREADS: usize = 8;
///
/// let cache = Arc::new(InterlockedCache::new());
/// let calls = Arc::new(AtomicUsize::default());
///
/// let threads: Vec<_> = (0..NUM_THREADS)
///     .map(|_| {
///         let my_cache = Arc::clone(&cache);
///         let my_calls = Arc::clone(&calls);
///         thread::spawn(move || {
///             my_cache.get_or_add("IFoo", |spec| {
///                 my_calls.fetch_add(1, Ordering::AcqRel);
///                 format!("Proxy<{spec}>")
///             })
///         })
///     })
///     .collect();
///
/// for t in threads {
///     assert_eq!(t.join().expect("Thread failed"), "Proxy<IFoo>");
/// }
///
/// // The factory was called exactly once.
/// assert_eq!(calls.load(Ordering::Acquire), 1);
/// ```
///
/// # Teardown
///
/// Call [`dispose`](#method.dispose) once no more calls will be made. It drops
/// the stored values and notifies the release listener, if one was set with
/// the [`CacheBuilder`][builder-struct]. Dropping the cache without disposing
/// it performs the same teardown from `Drop`.
///
/// [builder-struct]: ./struct.CacheBuilder.html
pub struct InterlockedCache<K, V, S = RandomState> {
    base: BaseCache<K, V, S>,
}

impl<K, V> InterlockedCache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Constructs a new, empty `InterlockedCache<K, V>`.
    ///
    /// To set a name, an initial capacity, a hasher or a release listener, use
    /// the [`CacheBuilder`][builder-struct].
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn new() -> Self {
        Self::with_everything(None, None, RandomState::default(), None)
    }

    /// Returns a [`CacheBuilder`][builder-struct], which can build an
    /// `InterlockedCache` with various configuration knobs.
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn builder() -> CacheBuilder<K, V, InterlockedCache<K, V, RandomState>> {
        CacheBuilder::default()
    }
}

impl<K, V> Default for InterlockedCache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> InterlockedCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    pub(crate) fn with_everything(
        name: Option<String>,
        initial_capacity: Option<usize>,
        build_hasher: S,
        release_listener: Option<ReleaseListener>,
    ) -> Self {
        Self {
            base: BaseCache::new(name, initial_capacity, build_hasher, release_listener),
        }
    }

    /// Returns the name of this cache.
    pub fn name(&self) -> Option<&str> {
        self.base.name()
    }

    /// Returns a _clone_ of the value stored for the key, if any. Never
    /// constructs a value.
    ///
    /// The key may be any borrowed form of the cache's key type, but `Hash` and
    /// `Eq` on the borrowed form _must_ match those for the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.get(key)
    }

    /// Returns `true` if the cache contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.contains_key(key)
    }

    /// Returns a _clone_ of the value stored for the key. If the key is absent,
    /// `factory` is called under the exclusive lock and its result is inserted.
    ///
    /// This method never evaluates `factory` more than once for the same key,
    /// even if it is called concurrently by many threads; the other callers
    /// wait for the construction to complete.
    ///
    /// # Panics
    ///
    /// A panic raised by `factory` propagates to the caller whose factory
    /// panicked. The lock is released while unwinding and nothing is stored, so
    /// the next caller for the key runs its own factory.
    ///
    /// # Deadlocks
    ///
    /// `factory` must not call back into this cache. The lock is not reentrant,
    /// so such a call blocks forever.
    pub fn get_or_add(&self, key: K, factory: impl FnOnce(&K) -> V) -> V {
        self.base.get_or_add_pessimistic(key, factory)
    }

    /// Like [`get_or_add`](#method.get_or_add), but with a fallible factory.
    ///
    /// An `Err` returned by `factory` propagates unchanged. The lock is
    /// released and the key stays absent, so a later call retries the
    /// construction.
    pub fn try_get_or_add<E>(
        &self,
        key: K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        self.base.try_get_or_add_pessimistic(key, factory)
    }

    /// Returns the number of entries in this cache.
    pub fn entry_count(&self) -> u64 {
        self.base.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Tears down the lock of this cache and drops the stored values.
    ///
    /// Returns `true` if this call performed the teardown. Further calls are
    /// no-ops and return `false`.
    ///
    /// Calls to `get_or_add` must not overlap with `dispose`.
    pub fn dispose(&self) -> bool {
        self.base.dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.base.is_disposed()
    }
}

impl<K, V, S> GetOrAdd<K, V> for InterlockedCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn get_or_add<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        self.base.get_or_add_pessimistic(key, factory)
    }

    fn try_get_or_add<F, E>(&self, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.base.try_get_or_add_pessimistic(key, factory)
    }
}

impl<K, V, S> fmt::Debug for InterlockedCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, entry_count, is_disposed) = self.base.debug_fields();
        f.debug_struct("InterlockedCache")
            .field("name", &name)
            .field("entry_count", &entry_count)
            .field("is_disposed", &is_disposed)
            .finish()
    }
}
