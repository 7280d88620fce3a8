//! Handoff - Bounded Buffer untuk satu Producer dan satu Consumer
//!
//! Arsitektur:
//! - Monitor: satu Mutex + Condvar "not full" / "not empty"
//! - Broadcast wake: notify_all, setiap waiter cek ulang predicate-nya
//! - Cooperative cancellation: setiap wait bisa dibatalkan lewat CancelToken
//! - Thread-per-role: Orchestrator spawn Producer dan Consumer lalu menunggu

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod roles;
pub mod signal;

pub use crate::config::HandoffConfig;
pub use crate::core::{BoundedBuffer, CancelToken, Echo, Transcript};
pub use crate::error::{HandoffError, HandoffResult, Role};
pub use crate::orchestrator::{Orchestrator, RunReport};
