//! An `UnsafeCell` wrapper that asserts its contents are safe to share
//! across threads, for the handful of cases where the type system can't
//! see the synchronization that actually makes it sound (e.g. a batch of
//! worker closures writing into disjoint slots of one buffer, with a
//! [`super::WaitCounter`] providing the happens-before edge back to the
//! thread that reads the result).

use std::cell::UnsafeCell;

pub struct TrustedThreadSafe<T> {
    inner: UnsafeCell<T>,
}

impl<T> TrustedThreadSafe<T> {
    pub fn new(value: T) -> TrustedThreadSafe<T> {
        TrustedThreadSafe { inner: UnsafeCell::new(value) }
    }

    pub fn get(&self) -> &T {
        unsafe { &*self.inner.get() }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

// SAFETY: callers are responsible for not actually racing on the wrapped
// value; see individual call sites.
unsafe impl<T> Send for TrustedThreadSafe<T> {}
unsafe impl<T> Sync for TrustedThreadSafe<T> {}
