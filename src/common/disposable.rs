use crate::common::error::CacheError;

use parking_lot::Mutex;
use std::fmt;

/// A scope whose release action runs exactly once.
///
/// The action receives `true` when it is run by an explicit call to
/// [`dispose`](#method.dispose), and `false` when it is run by `Drop` because
/// nobody disposed the scope before it went away.
///
/// `dispose` may be called any number of times, from any number of threads.
/// Only the first call runs the action.
///
/// # Example
///
/// ```rust
/// use artifact_cache::ExclusiveDisposable;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let released = AtomicUsize::default();
/// let scope = ExclusiveDisposable::new(|explicit| {
///     assert!(explicit);
///     released.fetch_add(1, Ordering::AcqRel);
/// });
///
/// assert!(scope.dispose());
/// assert!(!scope.dispose());
/// drop(scope);
///
/// assert_eq!(released.load(Ordering::Acquire), 1);
/// ```
pub struct ExclusiveDisposable<F>
where
    F: FnOnce(bool),
{
    release: Mutex<Option<F>>,
}

impl<F> ExclusiveDisposable<F>
where
    F: FnOnce(bool),
{
    pub fn new(release: F) -> Self {
        Self {
            release: Mutex::new(Some(release)),
        }
    }

    /// Constructs a scope from an optional release action.
    ///
    /// Returns `CacheError::InvalidArgument` if `release` is `None`.
    pub fn try_new(release: Option<F>) -> Result<Self, CacheError> {
        release
            .map(Self::new)
            .ok_or(CacheError::InvalidArgument { name: "release" })
    }

    /// Runs the release action if it has not been run yet. Returns `true` if
    /// this call was the one that ran it.
    pub fn dispose(&self) -> bool {
        // Take the action out first so that it runs without holding the mutex.
        let release = self.release.lock().take();
        match release {
            Some(release) => {
                release(true);
                true
            }
            None => false,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.release.lock().is_none()
    }
}

impl<F> Drop for ExclusiveDisposable<F>
where
    F: FnOnce(bool),
{
    fn drop(&mut self) {
        if let Some(release) = self.release.get_mut().take() {
            release(false);
        }
    }
}

impl<F> fmt::Debug for ExclusiveDisposable<F>
where
    F: FnOnce(bool),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusiveDisposable")
            .field("is_disposed", &self.is_disposed())
            .finish()
    }
}
