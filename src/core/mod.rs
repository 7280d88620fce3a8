//! Core module: Bounded Buffer dengan monitor semantics
//!
//! Prinsip desain:
//! - Satu Mutex: semua akses ke queue lewat satu serialization point
//! - Condvar per role: "not full" untuk producer, "not empty" untuk consumer
//! - Broadcast wake + while-loop re-check di setiap wait
//! - Cooperative cancellation: wait bisa dibatalkan tanpa merusak state

mod bounded_buffer;
mod cancel;

pub use bounded_buffer::{BoundedBuffer, Echo, Transcript};
pub use cancel::{CancelToken, Interrupt};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock tanpa propagasi poison.
///
/// Critical section di crate ini hanya operasi VecDeque/Vec dan output,
/// tidak ada yang bisa meninggalkan data setengah di-update.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
