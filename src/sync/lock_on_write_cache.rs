use super::{base_cache::BaseCache, CacheBuilder};
use crate::{notification::ReleaseListener, GetOrAdd};

use std::{
    borrow::Borrow,
    collections::hash_map::RandomState,
    fmt,
    hash::{BuildHasher, Hash},
};

/// A thread-safe memoizing cache that constructs values while holding the
/// write lock.
///
/// `LockOnWriteCache` behaves exactly like
/// [`InterlockedCache`][interlocked-cache]: the factory runs at most once per
/// key, under the exclusive lock escalated from an upgradeable read. It is kept
/// as a separate type so that the two names can be selected and benchmarked
/// independently.
///
/// [interlocked-cache]: ./struct.InterlockedCache.html
pub struct LockOnWriteCache<K, V, S = RandomState> {
    base: BaseCache<K, V, S>,
}

impl<K, V> LockOnWriteCache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_everything(None, None, RandomState::default(), None)
    }

    pub fn builder() -> CacheBuilder<K, V, LockOnWriteCache<K, V, RandomState>> {
        CacheBuilder::default()
    }
}

impl<K, V> Default for LockOnWriteCache<K, V, RandomState>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> LockOnWriteCache<K, V, S>
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

    pub fn name(&self) -> Option<&str> {
        self.base.name()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.get(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.base.contains_key(key)
    }

    /// See [`InterlockedCache::get_or_add`][get-or-add].
    ///
    /// [get-or-add]: ./struct.InterlockedCache.html#method.get_or_add
    pub fn get_or_add(&self, key: K, factory: impl FnOnce(&K) -> V) -> V {
        self.base.get_or_add_pessimistic(key, factory)
    }

    /// See [`InterlockedCache::try_get_or_add`][try-get-or-add].
    ///
    /// [try-get-or-add]: ./struct.InterlockedCache.html#method.try_get_or_add
    pub fn try_get_or_add<E>(
        &self,
        key: K,
        factory: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E> {
        self.base.try_get_or_add_pessimistic(key, factory)
    }

    pub fn entry_count(&self) -> u64 {
        self.base.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }

    /// Tears down the lock of this cache and drops the stored values. Returns
    /// `false` if the cache had already been disposed.
    pub fn dispose(&self) -> bool {
        self.base.dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.base.is_disposed()
    }
}

impl<K, V, S> GetOrAdd<K, V> for LockOnWriteCache<K, V, S>
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

impl<K, V, S> fmt::Debug for LockOnWriteCache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, entry_count, is_disposed) = self.base.debug_fields();
        f.debug_struct("LockOnWriteCache")
            .field("name", &name)
            .field("entry_count", &entry_count)
            .field("is_disposed", &is_disposed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::LockOnWriteCache;
    use crate::common::test_utils::{Counters, Gate};

    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
        thread,
        time::Duration,
    };

    #[test]
    fn two_callers_wait_on_one_construction() {
        let cache: Arc<LockOnWriteCache<i32, String>> = Arc::new(LockOnWriteCache::new());
        let monitor = Arc::new(Gate::default());
        let calls = Arc::new(AtomicUsize::default());
        let counters = Arc::new(Counters::default());

        let callers = (0..2)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let monitor = Arc::clone(&monitor);
                let calls = Arc::clone(&calls);
                let counters = Arc::clone(&counters);
                thread::spawn(move || {
                    let v = cache.get_or_add(1, |k| {
                        calls.fetch_add(1, Ordering::AcqRel);
                        counters.incl_entered();
                        monitor.wait();
                        k.to_string()
                    });
                    counters.incl_completed();
                    v
                })
            })
            .collect::<Vec<_>>();

        counters.wait_for_entered(1);
        thread::sleep(Duration::from_millis(100));
        // Neither call completes before the monitor is pulsed.
        assert_eq!(counters.completed(), 0);

        monitor.open();

        for caller in callers {
            assert_eq!(caller.join().expect("Failed"), "1");
        }
        assert_eq!(counters.completed(), 2);
        assert_eq!(calls.load(Ordering::Acquire), 1);
    }

    #[test]
    fn key_independence() {
        let cache = LockOnWriteCache::new();

        assert_eq!(cache.get_or_add(1, |k| k * 2), 2);
        assert_eq!(cache.get_or_add(2, |k| k * 3), 6);
        assert_eq!(cache.get_or_add(1, |_| unreachable!()), 2);
        assert_eq!(cache.get(&2), Some(6));
        assert_eq!(cache.get(&3), None);
    }
}
