//! A fork/join counting barrier.
//!
//! `decrement`'s subtract is relaxed; the mutex + condvar broadcast that
//! follows it when the counter hits zero is what actually publishes the
//! decrementing workers' writes to whichever thread is blocked in
//! [`WaitCounter::wait`].

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct WaitCounter {
    counter: AtomicUsize,
    mutex: Mutex<()>,
    cond: Condvar,
}

impl WaitCounter {
    pub fn new(initial_count: usize) -> WaitCounter {
        WaitCounter { counter: AtomicUsize::new(initial_count), mutex: Mutex::new(()), cond: Condvar::new() }
    }

    /// Re-arms a counter for another fork/join round. The counter is
    /// single-use otherwise.
    pub fn init(&self, count: usize) {
        self.counter.store(count, Ordering::Relaxed);
    }

    /// Atomically subtracts `amount`. Panics on underflow, since that
    /// indicates a programming error rather than a recoverable condition.
    pub fn decrement(&self, amount: usize) {
        let previous = self.counter.fetch_sub(amount, Ordering::Relaxed);
        assert!(previous >= amount, "wait counter underflow");

        if previous == amount {
            let _guard = self.mutex.lock();
            self.cond.notify_all();
        }
    }

    /// Blocks until the counter reaches zero. Multiple waiters are
    /// permitted.
    pub fn wait(&self) {
        let mut guard = self.mutex.lock();
        while self.counter.load(Ordering::Relaxed) != 0 {
            self.cond.wait(&mut guard);
        }
    }
}
