use crate::{
    common::disposable::ExclusiveDisposable,
    notification::{notifier::ReleaseNotifier, ReleaseCause, ReleaseListener},
};

use parking_lot::{RwLock, RwLockReadGuard, RwLockUpgradableReadGuard, RwLockWriteGuard};
use std::{
    fmt,
    ops::{Deref, DerefMut},
    sync::Arc,
};

type Teardown = Box<dyn FnOnce(bool) + Send + 'static>;

const VACANT_HOLD: &str = "the upgradeable hold is only vacant while a nested write is alive";

/// A reader-writer lock with three acquisition modes: read, write and
/// upgradeable read.
///
/// - Any number of [`read`](#method.read) holders may coexist with each other
///   and with one [`upgradeable_read`](#method.upgradeable_read) holder.
/// - [`write`](#method.write) is exclusive against every other mode.
/// - An upgradeable read holder may escalate to exclusive access with
///   [`UpgradeableReadHandle::write`][nested-write] without letting any other
///   writer or upgradeable reader in between. Plain readers are blocked while
///   the nested write is held.
///
/// All acquisitions block until the mode can be entered. There is no timeout.
///
/// `SharedLock` wraps `parking_lot::RwLock`, which never poisons: a panic
/// while a handle is held simply releases the handle's mode on unwinding.
///
/// The lock has an explicit teardown, [`dispose`](#method.dispose). If the
/// lock is dropped without being disposed, the teardown runs from `Drop`.
///
/// [nested-write]: ./struct.UpgradeableReadHandle.html#method.write
pub struct SharedLock<T> {
    inner: RwLock<T>,
    teardown: ExclusiveDisposable<Teardown>,
}

impl<T> SharedLock<T> {
    pub fn new(value: T) -> Self {
        Self::with_notifier(value, ReleaseNotifier::new(None, None))
    }

    /// Constructs a lock that calls `listener` once, when it is torn down.
    pub fn with_release_listener(
        value: T,
        listener: impl Fn(ReleaseCause) + Send + Sync + 'static,
    ) -> Self {
        let listener: ReleaseListener = Arc::new(listener);
        Self::with_notifier(value, ReleaseNotifier::new(Some(listener), None))
    }

    pub(crate) fn with_notifier(value: T, notifier: ReleaseNotifier) -> Self {
        let teardown: Teardown = Box::new(move |explicit| notifier.notify(explicit.into()));
        Self {
            inner: RwLock::new(value),
            teardown: ExclusiveDisposable::new(teardown),
        }
    }

    pub fn read(&self) -> ReadHandle<'_, T> {
        ReadHandle {
            guard: self.inner.read(),
        }
    }

    pub fn write(&self) -> WriteHandle<'_, T> {
        WriteHandle {
            guard: self.inner.write(),
        }
    }

    pub fn upgradeable_read(&self) -> UpgradeableReadHandle<'_, T> {
        UpgradeableReadHandle {
            guard: Some(self.inner.upgradable_read()),
        }
    }

    /// Tears down the lock. Returns `true` if this call performed the
    /// teardown, and `false` if the lock had already been disposed.
    ///
    /// The lock can still be acquired after it has been disposed.
    pub fn dispose(&self) -> bool {
        self.teardown.dispose()
    }

    pub fn is_disposed(&self) -> bool {
        self.teardown.is_disposed()
    }
}

impl<T> fmt::Debug for SharedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLock")
            .field("is_disposed", &self.is_disposed())
            .finish()
    }
}

/// A shared hold on a [`SharedLock`][shared-lock]. The hold is released when
/// the handle is dropped.
///
/// [shared-lock]: ./struct.SharedLock.html
#[must_use = "if unused the lock will immediately be released"]
pub struct ReadHandle<'a, T> {
    guard: RwLockReadGuard<'a, T>,
}

impl<'a, T> ReadHandle<'a, T> {
    pub fn release(self) {
        drop(self)
    }
}

impl<'a, T> Deref for ReadHandle<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

/// An exclusive hold on a [`SharedLock`][shared-lock]. The hold is released
/// when the handle is dropped.
///
/// [shared-lock]: ./struct.SharedLock.html
#[must_use = "if unused the lock will immediately be released"]
pub struct WriteHandle<'a, T> {
    guard: RwLockWriteGuard<'a, T>,
}

impl<'a, T> WriteHandle<'a, T> {
    pub fn release(self) {
        drop(self)
    }
}

impl<'a, T> Deref for WriteHandle<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<'a, T> DerefMut for WriteHandle<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

/// An upgradeable shared hold on a [`SharedLock`][shared-lock].
///
/// [shared-lock]: ./struct.SharedLock.html
#[must_use = "if unused the lock will immediately be released"]
pub struct UpgradeableReadHandle<'a, T> {
    // `None` only while a `NestedWriteHandle` borrowed from this handle is
    // alive.
    guard: Option<RwLockUpgradableReadGuard<'a, T>>,
}

impl<'a, T> UpgradeableReadHandle<'a, T> {
    /// Escalates this hold to exclusive access, blocking until all plain
    /// readers have left.
    ///
    /// The upgradeable hold is kept for the whole time: dropping the returned
    /// handle downgrades back to an upgradeable read, so no other writer can
    /// enter until this handle is released too.
    pub fn write(&mut self) -> NestedWriteHandle<'_, 'a, T> {
        let held = match self.guard.take() {
            Some(guard) => guard,
            None => unreachable!("{}", VACANT_HOLD),
        };
        NestedWriteHandle {
            guard: Some(RwLockUpgradableReadGuard::upgrade(held)),
            hold: &mut self.guard,
        }
    }

    pub fn release(self) {
        drop(self)
    }
}

impl<'a, T> Deref for UpgradeableReadHandle<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => guard,
            None => unreachable!("{}", VACANT_HOLD),
        }
    }
}

/// An exclusive hold escalated from an
/// [`UpgradeableReadHandle`][upgradeable]. Dropping it returns to the
/// upgradeable read mode.
///
/// [upgradeable]: ./struct.UpgradeableReadHandle.html
#[must_use = "if unused the lock will immediately be downgraded"]
pub struct NestedWriteHandle<'h, 'a, T> {
    // `None` only inside `drop`.
    guard: Option<RwLockWriteGuard<'a, T>>,
    hold: &'h mut Option<RwLockUpgradableReadGuard<'a, T>>,
}

impl<'h, 'a, T> NestedWriteHandle<'h, 'a, T> {
    pub fn release(self) {
        drop(self)
    }
}

impl<'h, 'a, T> Drop for NestedWriteHandle<'h, 'a, T> {
    fn drop(&mut self) {
        if let Some(guard) = self.guard.take() {
            *self.hold = Some(RwLockWriteGuard::downgrade_to_upgradable(guard));
        }
    }
}

impl<'h, 'a, T> Deref for NestedWriteHandle<'h, 'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.guard {
            Some(guard) => guard,
            None => unreachable!("nested write handle used after release"),
        }
    }
}

impl<'h, 'a, T> DerefMut for NestedWriteHandle<'h, 'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.guard {
            Some(guard) => guard,
            None => unreachable!("nested write handle used after release"),
        }
    }
}
