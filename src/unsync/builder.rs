use super::Cache;

use std::{
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hash},
    marker::PhantomData,
};

/// Builds a [`Cache`][cache-struct] with various configuration knobs.
///
/// [cache-struct]: ./struct.Cache.html
///
/// # Examples
///
/// ```rust
/// use artifact_cache::unsync::Cache;
///
/// let cache = Cache::builder()
///     .name("proxy types")
///     // Reserve room for 10,000 entries up front.
///     .initial_capacity(10_000)
///     // Create the cache.
///     .build();
///
/// cache.get_or_add(0, |_| "zero");
/// assert_eq!(cache.get(&0), Some("zero"));
/// ```
///
#[must_use]
pub struct CacheBuilder<K, V, C> {
    name: Option<String>,
    initial_capacity: Option<usize>,
    cache_type: PhantomData<C>,
    kv_types: PhantomData<fn() -> (K, V)>,
}

impl<K, V, C> Default for CacheBuilder<K, V, C> {
    fn default() -> Self {
        Self {
            name: None,
            initial_capacity: None,
            cache_type: PhantomData,
            kv_types: PhantomData,
        }
    }
}

impl<K, V> CacheBuilder<K, V, Cache<K, V, RandomState>>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Builds a `Cache<K, V>`.
    pub fn build(self) -> Cache<K, V, RandomState> {
        Cache::with_everything(self.name, self.initial_capacity, RandomState::default())
    }

    /// Builds a `Cache<K, V, S>`, with the given `hasher`.
    pub fn build_with_hasher<S>(self, hasher: S) -> Cache<K, V, S>
    where
        S: BuildHasher,
    {
        Cache::with_everything(self.name, self.initial_capacity, hasher)
    }
}

impl<K, V, C> CacheBuilder<K, V, C> {
    /// Sets the name of the cache.
    pub fn name(self, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..self
        }
    }

    /// Sets the initial capacity of the cache.
    pub fn initial_capacity(self, capacity: usize) -> Self {
        Self {
            initial_capacity: Some(capacity),
            ..self
        }
    }
}
