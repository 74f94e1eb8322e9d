use crate::{
    common::lock::SharedLock,
    notification::{notifier::ReleaseNotifier, ReleaseListener},
};

use std::{
    borrow::Borrow,
    collections::{hash_map::Entry, HashMap},
    convert::Infallible,
    fmt,
    hash::{BuildHasher, Hash},
};

type CacheStore<K, V, S> = HashMap<K, V, S>;

/// The state shared by the synchronized caches: an optional name and the
/// key-value map guarded by a `SharedLock`.
///
/// The public cache types decide which of the two insertion strategies
/// (optimistic or pessimistic) they run.
pub(crate) struct BaseCache<K, V, S> {
    name: Option<String>,
    store: SharedLock<CacheStore<K, V, S>>,
}

impl<K, V, S> BaseCache<K, V, S>
where
    K: Hash + Eq,
    V: Clone,
    S: BuildHasher,
{
    pub(crate) fn new(
        name: Option<String>,
        initial_capacity: Option<usize>,
        build_hasher: S,
        release_listener: Option<ReleaseListener>,
    ) -> Self {
        let map =
            HashMap::with_capacity_and_hasher(initial_capacity.unwrap_or_default(), build_hasher);
        let notifier = ReleaseNotifier::new(release_listener, name.clone());
        Self {
            name,
            store: SharedLock::with_notifier(map, notifier),
        }
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.read().get(key).cloned()
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.read().contains_key(key)
    }

    pub(crate) fn entry_count(&self) -> u64 {
        self.store.read().len() as u64
    }

    /// Tears down the lock and drops the stored values. Only the first call
    /// does anything.
    pub(crate) fn dispose(&self) -> bool {
        if self.store.dispose() {
            self.store.write().clear();
            true
        } else {
            false
        }
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.store.is_disposed()
    }

    /// Reads under the shared lock, constructs with no lock held, then
    /// re-checks and inserts under the exclusive lock.
    ///
    /// `factory` may be evaluated by several callers for the same key. The
    /// first value to be inserted wins, and every caller returns it.
    pub(crate) fn try_get_or_add_optimistic<E>(
        &self,
        key: K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        let map = self.store.read();
        if let Some(v) = map.get(&key) {
            return Ok(v.clone());
        }
        map.release();

        // A failing factory leaves the map untouched.
        let value = factory(&key)?;

        let mut map = self.store.write();
        match map.entry(key) {
            Entry::Occupied(entry) => {
                #[cfg(feature = "logging")]
                log::trace!(
                    "{}Discarded a redundant construction; another caller inserted first",
                    self.log_prefix()
                );
                drop(value);
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => Ok(entry.insert(value).clone()),
        }
    }

    /// Checks under the upgradeable lock and constructs under the escalated,
    /// exclusive lock. `factory` is evaluated at most once per key.
    pub(crate) fn try_get_or_add_pessimistic<E>(
        &self,
        key: K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        let mut hold = self.store.upgradeable_read();
        if let Some(v) = hold.get(&key) {
            return Ok(v.clone());
        }

        let mut map = hold.write();
        // Nobody else can insert while we keep the upgradeable hold, so this
        // should never hit.
        if let Some(v) = map.get(&key) {
            return Ok(v.clone());
        }

        // On error or panic, the nested write and then the upgradeable hold
        // are released while unwinding, and the key stays absent.
        let value = factory(&key)?;
        map.insert(key, value.clone());
        Ok(value)
    }

    pub(crate) fn get_or_add_optimistic(&self, key: K, factory: impl FnOnce(&K) -> V) -> V {
        match self.try_get_or_add_optimistic(key, |k| Ok::<_, Infallible>(factory(k))) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    pub(crate) fn get_or_add_pessimistic(&self, key: K, factory: impl FnOnce(&K) -> V) -> V {
        match self.try_get_or_add_pessimistic(key, |k| Ok::<_, Infallible>(factory(k))) {
            Ok(v) => v,
            Err(never) => match never {},
        }
    }

    #[cfg(feature = "logging")]
    fn log_prefix(&self) -> String {
        self.name
            .as_deref()
            .map(|name| format!("[{name}] "))
            .unwrap_or_default()
    }
}

impl<K, V, S> BaseCache<K, V, S> {
    pub(crate) fn debug_fields(&self) -> (Option<&str>, u64, bool) {
        (
            self.name.as_deref(),
            self.store.read().len() as u64,
            self.store.is_disposed(),
        )
    }
}

impl<K, V, S> fmt::Debug for BaseCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, entry_count, is_disposed) = self.debug_fields();
        f.debug_struct("BaseCache")
            .field("name", &name)
            .field("entry_count", &entry_count)
            .field("is_disposed", &is_disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::BaseCache;

    use std::collections::hash_map::RandomState;

    fn new_cache() -> BaseCache<u32, String, RandomState> {
        BaseCache::new(None, None, RandomState::default(), None)
    }

    #[test]
    fn both_strategies_share_the_store() {
        let cache = new_cache();

        let a = cache.get_or_add_optimistic(1, |k| k.to_string());
        let b = cache.get_or_add_pessimistic(1, |_| unreachable!());
        assert_eq!(a, "1");
        assert_eq!(b, "1");

        let c = cache.get_or_add_pessimistic(2, |k| k.to_string());
        let d = cache.get_or_add_optimistic(2, |_| unreachable!());
        assert_eq!(c, "2");
        assert_eq!(d, "2");

        assert_eq!(cache.entry_count(), 2);
    }

    #[test]
    fn dispose_clears_the_store_once() {
        let cache = new_cache();
        cache.get_or_add_pessimistic(1, |k| k.to_string());
        assert!(cache.contains_key(&1));

        assert!(cache.dispose());
        assert!(cache.is_disposed());
        assert_eq!(cache.entry_count(), 0);

        // The second call is a no-op, even if an entry was added in between.
        cache.get_or_add_pessimistic(2, |k| k.to_string());
        assert!(!cache.dispose());
        assert_eq!(cache.get(&2), Some("2".to_string()));
    }
}
