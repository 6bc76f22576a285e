//! The work-stealing task scheduler (spec.md §4.A–§4.C): a Chase–Lev
//! deque, a fork/join wait counter, and a fixed thread pool built on top
//! of both.

pub mod deque;
pub mod pool;
pub mod trusted;
pub mod wait_counter;

pub use self::deque::{ChaseLevDeque, StealResult, TakeResult};
pub use self::pool::{global, Batch, Task, ThreadPool, ThreadPoolConfig};
pub use self::trusted::TrustedThreadSafe;
pub use self::wait_counter::WaitCounter;
