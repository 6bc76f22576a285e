//! Fixed-size worker pool backed by a single shared [`ChaseLevDeque`].
//!
//! There is no per-worker queue in this design. Workers steal lock-free
//! from the shared deque first; if that comes up empty they fall back to
//! holding the submission mutex and calling `take` in a loop, sleeping on
//! the condition variable between attempts. Holding the mutex makes the
//! worker the deque's temporary "owner" for the duration of that `take`
//! call, which is what makes it sound to mix `take` (an owner-only
//! operation) across many different calling threads over time: the mutex
//! guarantees only one of them plays that role at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;

use log::{debug, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};

use super::deque::{ChaseLevDeque, StealResult, TakeResult};

/// A unit of work submitted to the pool: an opaque closure that already
/// captures whatever data it needs to run.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Tunables for constructing a [`ThreadPool`].
#[derive(Debug, Clone, Copy)]
pub struct ThreadPoolConfig {
    /// Number of workers. Defaults to the reported core count, floored at 1.
    pub worker_count: usize,
    /// Initial capacity of the shared deque.
    pub initial_deque_capacity: usize,
}

impl Default for ThreadPoolConfig {
    fn default() -> ThreadPoolConfig {
        ThreadPoolConfig {
            worker_count: num_cpus::get().max(1),
            initial_deque_capacity: super::deque::DEFAULT_CAPACITY,
        }
    }
}

struct Shared {
    deque: ChaseLevDeque<Task>,
    mutex: Mutex<()>,
    cond: Condvar,
    shutdown: AtomicBool,
}

/// A fixed worker pool. The process-wide singleton in [`global`] is never
/// torn down; this type's `Drop` impl is provided mainly so pools created
/// directly in tests don't leak their threads forever.
pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    pub fn new(config: ThreadPoolConfig) -> ThreadPool {
        let shared = Arc::new(Shared {
            deque: ChaseLevDeque::with_capacity(config.initial_deque_capacity),
            mutex: Mutex::new(()),
            cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        debug!("starting thread pool with {} workers", config.worker_count);

        let workers = (0..config.worker_count)
            .map(|index| {
                let shared = shared.clone();
                std::thread::Builder::new()
                    .name(format!("voxelrender-worker-{index}"))
                    .spawn(move || worker_loop(shared))
                    .expect("failed to spawn worker thread")
            })
            .collect();

        ThreadPool { shared, workers }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Locks the shared deque for batch submission. `push_task` may only
    /// be called through the returned [`Batch`].
    pub fn submit_batch(&self) -> Batch<'_> {
        Batch { pool: self, guard: Some(self.shared.mutex.lock()) }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Relaxed);
        {
            let _guard = self.shared.mutex.lock();
            self.shared.cond.notify_all();
        }
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

/// RAII handle for pushing a batch of tasks under the submission lock.
/// Dropping it releases the mutex and then broadcasts the condition
/// variable, in that order, so workers wake only after every task of the
/// batch is visible.
pub struct Batch<'a> {
    pool: &'a ThreadPool,
    guard: Option<MutexGuard<'a, ()>>,
}

impl<'a> Batch<'a> {
    /// Pushes one task onto the shared deque. Debug-only check that we're
    /// actually still holding the lock (spec.md §4.C).
    pub fn push_task(&self, task: Task) {
        debug_assert!(self.guard.is_some(), "push_task called without holding the submission lock");
        self.pool.shared.deque.push(task);
    }
}

impl<'a> Drop for Batch<'a> {
    fn drop(&mut self) {
        self.guard.take();
        self.pool.shared.cond.notify_all();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    trace!("worker thread starting");

    loop {
        match shared.deque.steal() {
            StealResult::Success(task) => {
                task();
                continue;
            }
            StealResult::Abort => continue,
            StealResult::Empty => {}
        }

        let mut guard = shared.mutex.lock();
        loop {
            if shared.shutdown.load(Ordering::Relaxed) {
                trace!("worker thread stopping");
                return;
            }

            match shared.deque.take() {
                TakeResult::Success(task) => {
                    // Never hold the mutex while running user code
                    // (spec.md §4.C guarantee); a task may itself submit
                    // more tasks via `submit_batch`.
                    drop(guard);
                    task();
                    break;
                }
                TakeResult::Empty => {
                    shared.cond.wait(&mut guard);
                }
            }
        }
    }
}

static GLOBAL_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// The process-wide singleton pool, created lazily on first use
/// (spec.md §4.C, §5). `OnceLock::get_or_init` is the "once-style
/// atomic-CAS" spec.md §5 asks for: on contention, only one caller's
/// closure result is published; a redundant concurrent construction
/// (if `get_or_init`'s closure runs more than once) is simply dropped,
/// matching "the loser frees its unpublished pool".
pub fn global() -> &'static ThreadPool {
    GLOBAL_POOL.get_or_init(|| ThreadPool::new(ThreadPoolConfig::default()))
}
