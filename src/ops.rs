//! Cache operations.

/// The memoizing operation shared by every cache in this crate.
///
/// A producer of expensive artifacts can be written against this trait and
/// stay agnostic of the concurrency strategy of the cache it is handed.
///
/// # Example
///
/// ```rust
/// use artifact_cache::{sync::InterlockedCache, unsync::Cache, GetOrAdd};
/// use std::sync::Arc;
///
/// fn build_proxy<C: GetOrAdd<String, Arc<str>>>(cache: &C, spec: &str) -> Arc<str> {
///     cache.get_or_add(spec.to_string(), |spec| format!("Proxy<{spec}>").into())
/// }
///
/// let local = Cache::new();
/// let shared = InterlockedCache::new();
///
/// assert_eq!(&*build_proxy(&local, "IFoo"), "Proxy<IFoo>");
/// assert_eq!(&*build_proxy(&shared, "IFoo"), "Proxy<IFoo>");
/// ```
pub trait GetOrAdd<K, V> {
    /// Returns a clone of the value stored for `key`, constructing and
    /// storing it with `factory` first if the key is absent.
    ///
    /// `factory` is never invoked when the key is present.
    fn get_or_add<F>(&self, key: K, factory: F) -> V
    where
        F: FnOnce(&K) -> V;

    /// Like [`get_or_add`](#tymethod.get_or_add), but with a fallible factory.
    ///
    /// An `Err` returned by `factory` is handed back unchanged and nothing is
    /// stored, so a later call will try to construct the value again.
    fn try_get_or_add<F, E>(&self, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce(&K) -> Result<V, E>;
}
