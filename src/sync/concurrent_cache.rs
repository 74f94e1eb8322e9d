use super::{base_cache::BaseCache, CacheBuilder};
use crate::{notification::ReleaseListener, GetOrAdd};

use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
};

/// A thread-safe memoizing cache that constructs values outside of any lock.
///
/// `ConcurrentCache` is the _optimistic_ strategy. On a miss,
/// [`get_or_add`](#method.get_or_add) releases the shared lock before calling
/// the factory, and only takes the exclusive lock to insert the result. Two
/// callers racing for the same new key may therefore both run their factory;
/// the first result to be inserted becomes the canonical value and every caller
/// returns it. The losing results are dropped.
///
/// Choose this cache when factories are free of side effects and construction
/// of unrelated keys should proceed in parallel. If a factory must run at most
/// once per key, use [`InterlockedCache`][interlocked-cache] instead.
///
/// [interlocked-cache]: ./struct.InterlockedCache.html
///
/// # Examples
///
/// ```rust
/// use artifact_cache::sync::ConcurrentCache;
///
/// use std::{sync::Arc, thread};
///
/// const NUM_THREADS: usize = 8;
///
/// let cache = Arc::new(ConcurrentCache::new());
///
/// let threads: Vec<_> = (0..NUM_THREADS)
///     .map(|_| {
///         let my_cache = Arc::clone(&cache);
///         thread::spawn(move || {
///             // Every thread ends up with the same `Arc`, even if more than one
///             // of them ran the factory.
///             my_cache.get_or_add("IFoo", |spec| Arc::new(format!("Proxy<{spec}>")))
///         })
///     })
///     .collect();
///
/// let values: Vec<_> = threads
///     .into_iter()
///     .map(|t| t.join().expect("Thread failed"))
///     .collect();
///
/// assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
/// ```
///
/// # Avoiding to clone the value
///
/// `get_or_add` returns a _clone_ of the stored value. Wrap values that are
/// expensive to clone in `std::sync::Arc`; the clone is then a reference count
/// increment and every caller shares the same instance.
///
/// # Teardown
///
/// Call [`dispose`](#method.dispose) once no more calls will be made. It drops
/// the stored values and notifies the release listener, if one was set with
/// the [`CacheBuilder`][builder-struct]. Dropping the cache without disposing
/// it performs the same teardown from `Drop`.
///
/// [builder-struct]: ./struct.CacheBuilder.html
pub struct ConcurrentCache<K, V, S = RandomState> {
    base: BaseCache<K, V, S>,
}

impl<K, V> ConcurrentCache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Constructs a new, empty `ConcurrentCache<K, V>`.
    ///
    /// To set a name, an initial capacity, a hasher or a release listener, use
    /// the [`CacheBuilder`][builder-struct].
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn new() -> Self {
        Self::with_everything(None, None, RandomState::default(), None)
    }

    /// Returns a [`CacheBuilder`][builder-struct], which can build a
    /// `ConcurrentCache` with various configuration knobs.
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn builder() -> CacheBuilder<K, V, ConcurrentCache<K, V, RandomState>> {
        CacheBuilder::default()
    }
}

impl<K, V> Default for ConcurrentCache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ConcurrentCache<K, V, S>
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
    /// `factory` is called with no lock held and its result is inserted, unless
    /// another caller inserted a value for the same key in the meantime.
    ///
    /// Either way, the returned value is the one stored in the cache.
    ///
    /// # Panics
    ///
    /// A panic raised by `factory` propagates to the caller. Nothing is stored
    /// for the key and no lock is held.
    pub fn get_or_add(&self, key: K, factory: impl FnOnce(&K) -> V) -> V {
        self.base.get_or_add_optimistic(key, factory)
    }

    /// Like [`get_or_add`](#method.get_or_add), but with a fallible factory.
    ///
    /// An `Err` returned by `factory` propagates unchanged, before the exclusive
    /// lock is taken. The cache is left untouched.
    pub fn try_get_or_add<E>(
        &self,
        key: K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        self.base.try_get_or_add_optimistic(key, factory)
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

impl<K, V, S> GetOrAdd<K, V> for ConcurrentCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn get_or_add<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        self.base.get_or_add_optimistic(key, factory)
    }

    fn try_get_or_add<F, E>(&self, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        self.base.try_get_or_add_optimistic(key, factory)
    }
}

impl<K, V, S> fmt::Debug for ConcurrentCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, entry_count, is_disposed) = self.base.debug_fields();
        f.debug_struct("ConcurrentCache")
            .field("name", &name)
            .field("entry_count", &entry_count)
            .field("is_disposed", &is_disposed)
            .finish()
    }
}
