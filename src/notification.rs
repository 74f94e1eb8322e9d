//! Notifications sent when a cache releases its lock.

use std::sync::Arc;

pub(crate) mod notifier;

pub(crate) type ReleaseListener = Arc<dyn Fn(ReleaseCause) + Send + Sync + 'static>;

/// Indicates how the lock of a synchronized cache was torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseCause {
    /// The owner called `dispose` on the cache.
    Explicit,
    /// The cache was dropped without being disposed first.
    Dropped,
}

impl ReleaseCause {
    pub fn was_explicit(&self) -> bool {
        matches!(self, Self::Explicit)
    }
}

impl From<bool> for ReleaseCause {
    fn from(explicit: bool) -> Self {
        if explicit {
            Self::Explicit
        } else {
            Self::Dropped
        }
    }
}
