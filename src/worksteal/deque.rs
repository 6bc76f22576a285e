//! Chase–Lev work-stealing deque (spec.md §4.A).
//!
//! `push`/`take` are restricted to a single logical owner at a time (in
//! this crate, whoever holds [`super::pool::ThreadPool`]'s submission
//! mutex — see `pool.rs`); `steal` may run concurrently from any thread,
//! lock-free. Memory orderings follow Chase & Lev / Lê et al.,
//! "Correct and Efficient Work-Stealing for Weak Memory Models"
//! (spec.md §4.A):
//!
//! - `push`: acquire-load `top`, release-store `bottom`.
//! - `take`: relaxed-store `bottom` first, full fence, relaxed-load `top`;
//!   the single-element case resolves with a seq-cst CAS on `top`.
//! - `steal`: acquire-load `top`, full fence, acquire-load `bottom`,
//!   relaxed-load the element, seq-cst CAS on `top`.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{fence, AtomicPtr, AtomicUsize, Ordering};

/// Default backing-array capacity (SPEC_FULL.md §4, taken from the
/// original `worksteal.c`'s initial allocation).
pub const DEFAULT_CAPACITY: usize = 32;

struct Buffer<T> {
    mask: usize,
    data: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

impl<T> Buffer<T> {
    fn new(capacity: usize) -> Buffer<T> {
        debug_assert!(capacity.is_power_of_two());
        let data = (0..capacity).map(|_| UnsafeCell::new(MaybeUninit::uninit())).collect();
        Buffer { mask: capacity - 1, data }
    }

    #[inline(always)]
    fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Caller must ensure no other live reference observes slot `index`
    /// until a matching `read`.
    #[inline(always)]
    unsafe fn write(&self, index: usize, value: T) {
        (*self.data[index & self.mask].get()).write(value);
    }

    /// Bitwise copies the value out of the slot without dropping the slot
    /// itself. Two concurrent callers may both read the same contested
    /// slot (the `take`/`steal` race on the last element); exactly one of
    /// them wins the follow-up CAS on `top` and keeps its copy, the other
    /// must `mem::forget` its copy rather than let it drop.
    #[inline(always)]
    unsafe fn read(&self, index: usize) -> T {
        (*self.data[index & self.mask].get()).assume_init_read()
    }
}

/// Outcome of [`ChaseLevDeque::take`].
pub enum TakeResult<T> {
    Success(T),
    Empty,
}

/// Outcome of [`ChaseLevDeque::steal`]. `Abort` means a concurrent steal
/// or take won the race for the contested element; callers are free to
/// retry, back off, or move on (spec.md §4.A, "Errors").
pub enum StealResult<T> {
    Success(T),
    Empty,
    Abort,
}

pub struct ChaseLevDeque<T> {
    bottom: AtomicUsize,
    top: AtomicUsize,
    buffer: AtomicPtr<Buffer<T>>,
    /// Buffers retired by `resize`. A concurrent `steal` may still hold a
    /// pointer loaded just before a resize swap, so the old array can't be
    /// freed immediately without a hazard-pointer scheme; it's kept alive
    /// here instead and only actually freed when the deque itself drops
    /// (an exclusively-owned, single-threaded point by construction).
    /// Only ever touched by the owner (`push`/`resize`), so a plain
    /// `UnsafeCell` suffices.
    retired: UnsafeCell<Vec<Box<Buffer<T>>>>,
}

unsafe impl<T: Send> Send for ChaseLevDeque<T> {}
unsafe impl<T: Send> Sync for ChaseLevDeque<T> {}

impl<T> ChaseLevDeque<T> {
    pub fn new() -> ChaseLevDeque<T> {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> ChaseLevDeque<T> {
        let capacity = capacity.next_power_of_two().max(1);
        let buffer = Box::into_raw(Box::new(Buffer::new(capacity)));

        ChaseLevDeque {
            bottom: AtomicUsize::new(0),
            top: AtomicUsize::new(0),
            buffer: AtomicPtr::new(buffer),
            retired: UnsafeCell::new(Vec::new()),
        }
    }

    /// Owner-only.
    pub fn push(&self, value: T) {
        let b = self.bottom.load(Ordering::Relaxed);
        let t = self.top.load(Ordering::Acquire);

        let buf = unsafe { &*self.buffer.load(Ordering::Relaxed) };
        if b.wrapping_sub(t) > buf.capacity() - 1 {
            self.resize(buf.capacity() * 2);
        }

        let buf = unsafe { &*self.buffer.load(Ordering::Relaxed) };
        unsafe { buf.write(b, value) };
        fence(Ordering::Release);
        self.bottom.store(b + 1, Ordering::Relaxed);
    }

    /// Owner-only.
    fn resize(&self, target_capacity: usize) {
        let new_capacity = target_capacity.next_power_of_two();
        let b = self.bottom.load(Ordering::Relaxed);
        let t = self.top.load(Ordering::Relaxed);

        let old_ptr = self.buffer.load(Ordering::Relaxed);
        let old_buf = unsafe { &*old_ptr };
        let new_buf = Buffer::new(new_capacity);

        for i in t..b {
            unsafe { new_buf.write(i, old_buf.read(i)) };
        }

        let new_ptr = Box::into_raw(Box::new(new_buf));
        self.buffer.store(new_ptr, Ordering::Relaxed);

        unsafe {
            (*self.retired.get()).push(Box::from_raw(old_ptr));
        }
    }

    /// Owner-only. If `bottom == 0`, returns `Empty` without decrementing
    /// (spec.md §4.A edge case: the owner's `bottom - 1` would wrap).
    pub fn take(&self) -> TakeResult<T> {
        let b = self.bottom.load(Ordering::Relaxed);
        if b == 0 {
            return TakeResult::Empty;
        }
        let b = b - 1;
        self.bottom.store(b, Ordering::Relaxed);
        fence(Ordering::SeqCst);
        let t = self.top.load(Ordering::Relaxed);

        if t <= b {
            let buf = unsafe { &*self.buffer.load(Ordering::Relaxed) };
            let value = unsafe { buf.read(b) };

            if t == b {
                if self.top.compare_exchange(t, t + 1, Ordering::SeqCst, Ordering::Relaxed).is_err() {
                    self.bottom.store(b + 1, Ordering::Relaxed);
                    std::mem::forget(value);
                    return TakeResult::Empty;
                }
                self.bottom.store(b + 1, Ordering::Relaxed);
            }

            TakeResult::Success(value)
        } else {
            self.bottom.store(b + 1, Ordering::Relaxed);
            TakeResult::Empty
        }
    }

    /// May be called by any thread.
    pub fn steal(&self) -> StealResult<T> {
        let t = self.top.load(Ordering::Acquire);
        fence(Ordering::SeqCst);
        let b = self.bottom.load(Ordering::Acquire);

        if t < b {
            let buf = unsafe { &*self.buffer.load(Ordering::Acquire) };
            let value = unsafe { buf.read(t) };

            if self.top.compare_exchange(t, t + 1, Ordering::SeqCst, Ordering::Relaxed).is_err() {
                std::mem::forget(value);
                return StealResult::Abort;
            }

            StealResult::Success(value)
        } else {
            StealResult::Empty
        }
    }
}

impl<T> Drop for ChaseLevDeque<T> {
    fn drop(&mut self) {
        let t = *self.top.get_mut();
        let b = *self.bottom.get_mut();
        let buf_ptr = *self.buffer.get_mut();

        unsafe {
            let buf = &*buf_ptr;
            for i in t..b {
                drop(buf.read(i));
            }
            drop(Box::from_raw(buf_ptr));
        }
    }
}

impl<T> Default for ChaseLevDeque<T> {
    fn default() -> Self {
        Self::new()
    }
}
