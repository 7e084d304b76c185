//! Shared coordination state
//!
//! The structures every agent touches during its turn:
//! - [`TaskPools`]: one lock-guarded item ledger per waste kind
//! - [`VisibilityTracker`]: local sensing that gates claiming
//! - [`MessageBus`]: the handshake mailbox
//!
//! They are owned by the simulation and lent to agents by reference; none of
//! them is a global.

pub mod message_bus;
pub mod task_pool;
pub mod visibility;

pub use message_bus::MessageBus;
pub use task_pool::{PoolError, TaskPool, TaskPools};
pub use visibility::VisibilityTracker;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Acquire a guard, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
