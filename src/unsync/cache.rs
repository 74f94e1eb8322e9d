use super::CacheBuilder;
use crate::GetOrAdd;

use std::{
    borrow::Borrow,
    cell::RefCell,
    collections::{hash_map::RandomState, HashMap},
    convert::Infallible,
    fmt,
    hash::{BuildHasher, Hash},
};

type CacheStore<K, V, S> = HashMap<K, V, S>;

/// A memoizing cache that is _not_ thread-safe.
///
/// `Cache` utilizes a hash table [`std::collections::HashMap`][std-hashmap]
/// from the standard library as the key-value storage, behind a `RefCell`, so
/// [`get_or_add`](#method.get_or_add) only needs `&self`. It takes no locks.
///
/// `Cache` is not `Sync`, so it cannot be shared between threads; the
/// compiler rejects it:
///
/// ```compile_fail
/// fn assert_sync<T: Sync>() {}
/// assert_sync::<artifact_cache::unsync::Cache<u32, String>>();
/// ```
///
/// Use one of the caches in the [`sync`][sync-mod] module for that.
///
/// [std-hashmap]: https://doc.rust-lang.org/std/collections/struct.HashMap.html
/// [sync-mod]: ../sync/index.html
///
/// # Examples
///
/// ```rust
/// use artifact_cache::unsync::Cache;
///
/// let cache = Cache::new();
/// let mut calls = 0;
///
/// let v = cache.get_or_add(1, |k| {
///     calls += 1;
///     k.to_string()
/// });
/// assert_eq!(v, "1");
///
/// // The second call finds the stored value.
/// let v = cache.get_or_add(1, |_| unreachable!());
/// assert_eq!(v, "1");
/// assert_eq!(calls, 1);
/// ```
///
/// # Hashing Algorithm
///
/// By default, `Cache` uses a hashing algorithm selected to provide resistance
/// against HashDoS attacks. It will the same one used by
/// `std::collections::HashMap`, which is currently SipHash 1-3.
///
/// The hashing algorithm can be replaced on a per-`Cache` basis using the
/// [`build_with_hasher`][build-with-hasher-method] method of the
/// `CacheBuilder`. Many alternative algorithms are available on crates.io, such
/// as the [aHash][ahash-crate] crate.
///
/// [build-with-hasher-method]: ./struct.CacheBuilder.html#method.build_with_hasher
/// [ahash-crate]: https://crates.io/crates/ahash
///
pub struct Cache<K, V, S = RandomState> {
    name: Option<String>,
    cache: RefCell<CacheStore<K, V, S>>,
}

impl<K, V> Cache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Constructs a new, empty `Cache<K, V>`.
    ///
    /// To set a name, an initial capacity or a hasher, use the
    /// [`CacheBuilder`][builder-struct].
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn new() -> Self {
        Self::with_everything(None, None, RandomState::default())
    }

    /// Returns a [`CacheBuilder`][builder-struct], which can build a `Cache`
    /// with various configuration knobs.
    ///
    /// [builder-struct]: ./struct.CacheBuilder.html
    pub fn builder() -> CacheBuilder<K, V, Cache<K, V, RandomState>> {
        CacheBuilder::default()
    }
}

impl<K, V> Default for Cache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

//
// public
//
impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    pub(crate) fn with_everything(
        name: Option<String>,
        initial_capacity: Option<usize>,
        build_hasher: S,
    ) -> Self {
        let cache =
            HashMap::with_capacity_and_hasher(initial_capacity.unwrap_or_default(), build_hasher);

        Self {
            name,
            cache: RefCell::new(cache),
        }
    }

    /// Returns the name of this cache.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns a _clone_ of the value stored for the key, if any.
    ///
    /// The key may be any borrowed form of the cache's key type, but `Hash` and
    /// `Eq` on the borrowed form _must_ match those for the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.borrow().get(key).cloned()
    }

    /// Returns `true` if the cache contains a value for the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.cache.borrow().contains_key(key)
    }

    /// Returns a _clone_ of the value stored for the key, calling `factory` and
    /// storing its result first if the key is absent.
    ///
    /// `factory` may itself call `get_or_add` on this cache. If it stores a
    /// value for the same key, that value is kept and returned, and the result
    /// of the outer `factory` is dropped.
    pub fn get_or_add(&self, key: K, factory: impl FnOnce(&K) -> V) -> V {
        match self.try_get_or_add(key, |k| Ok::<_, Infallible>(factory(k))) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_add`](#method.get_or_add), but with a fallible factory.
    /// An `Err` is returned as is and nothing is stored.
    pub fn try_get_or_add<E>(
        &self,
        key: K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(v) = self.cache.borrow().get(&key) {
            return Ok(v.clone());
        }

        // No borrow is held while the factory runs.
        let value = factory(&key)?;

        let mut cache = self.cache.borrow_mut();
        Ok(cache.entry(key).or_insert(value).clone())
    }

    /// Returns the number of entries in this cache.
    pub fn entry_count(&self) -> u64 {
        self.cache.borrow().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

impl<K, V, S> GetOrAdd<K, V> for Cache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    fn get_or_add<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        Cache::get_or_add(self, key, factory)
    }

    fn try_get_or_add<F, E>(&self, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        Cache::try_get_or_add(self, key, factory)
    }
}

impl<K, V, S> fmt::Debug for Cache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("entry_count", &self.cache.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::Cache;

    use std::{cell::Cell, rc::Rc};

    #[test]
    fn basic_single_thread() {
        let cache: Cache<i32, String> = Cache::new();
        let calls = Cell::new(0);

        let v = cache.get_or_add(1, |x| {
            calls.set(calls.get() + 1);
            x.to_string()
        });
        assert_eq!(v, "1");
        assert_eq!(calls.get(), 1);

        let v = cache.get_or_add(1, |x| {
            calls.set(calls.get() + 1);
            x.to_string()
        });
        assert_eq!(v, "1");
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn key_independence() {
        let cache = Cache::new();

        assert_eq!(cache.get_or_add("a", |_| "alice"), "alice");
        assert_eq!(cache.get_or_add("b", |_| "bob"), "bob");
        assert_eq!(cache.get_or_add("a", |_| unreachable!()), "alice");

        assert_eq!(cache.get(&"b"), Some("bob"));
        assert!(!cache.contains_key(&"c"));
        assert_eq!(cache.entry_count(), 2);
    }

    #[test]
    fn values_are_shared_not_rebuilt() {
        let cache = Cache::new();

        let a = cache.get_or_add(7, |k| Rc::new(k.to_string()));
        let b = cache.get_or_add(7, |k| Rc::new(k.to_string()));
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn failing_factory_stores_nothing() {
        let cache: Cache<u8, u8> = Cache::new();

        assert_eq!(cache.try_get_or_add(1, |_| Err("nope")), Err("nope"));
        assert!(cache.is_empty());
        assert_eq!(cache.try_get_or_add(1, |k| Ok::<_, &str>(k + 1)), Ok(2));
    }

    #[test]
    fn reentrant_factory() {
        let cache: Cache<u32, u32> = Cache::new();

        // The factory for 3 asks the cache for 2, which asks for 1.
        let v = cache.get_or_add(3, |k| {
            let prev = cache.get_or_add(k - 1, |k| cache.get_or_add(k - 1, |k| *k) + k);
            prev + k
        });
        assert_eq!(v, 6);
        assert_eq!(cache.entry_count(), 3);

        // The inner value wins over the outer one for the same key.
        let v = cache.get_or_add(10, |k| {
            cache.get_or_add(*k, |_| 100);
            200
        });
        assert_eq!(v, 100);
    }

    #[test]
    fn builder_and_debug() {
        let cache = Cache::builder()
            .name("local")
            .initial_capacity(16)
            .build();
        cache.get_or_add(1, |_| 1);

        assert_eq!(cache.name(), Some("local"));
        assert_eq!(
            format!("{cache:?}"),
            "Cache { name: Some(\"local\"), entry_count: 1 }"
        );
    }
}
