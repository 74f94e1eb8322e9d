use parking_lot::{Condvar, Mutex};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
    time::Duration,
};

/// A one-shot monitor. Threads calling `wait` block until `open` is called.
#[derive(Debug, Default)]
pub(crate) struct Gate {
    is_open: Mutex<bool>,
    cond: Condvar,
}

impl Gate {
    pub(crate) fn wait(&self) {
        let mut is_open = self.is_open.lock();
        while !*is_open {
            self.cond.wait(&mut is_open);
        }
    }

    pub(crate) fn open(&self) {
        *self.is_open.lock() = true;
        self.cond.notify_all();
    }
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    entered: AtomicUsize,
    completed: AtomicUsize,
}

impl Counters {
    pub(crate) fn entered(&self) -> usize {
        self.entered.load(Ordering::Acquire)
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    pub(crate) fn incl_entered(&self) {
        self.entered.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn incl_completed(&self) {
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Spins until `entered` reaches `n`.
    pub(crate) fn wait_for_entered(&self, n: usize) {
        while self.entered() < n {
            thread::sleep(Duration::from_millis(1));
        }
    }
}
