//! Error types untuk handoff

use std::fmt;
use thiserror::Error;

/// Result type untuk operasi buffer, role, dan orchestrator
pub type HandoffResult<T> = Result<T, HandoffError>;

/// Thread of control yang terlibat dalam satu run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Producer,
    Consumer,
    Main,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Producer => "Producer",
            Role::Consumer => "Consumer",
            Role::Main => "Main",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while handing items between producer and consumer
#[derive(Error, Debug)]
pub enum HandoffError {
    /// Blocking call atau wait dibatalkan lewat `CancelToken`
    #[error("{role} thread interrupted")]
    Interrupted { role: Role },

    /// Capacity 0 tidak pernah bisa menerima item
    #[error("Buffer capacity must be at least 1 (got {capacity})")]
    InvalidCapacity { capacity: usize },

    /// Jumlah item negatif
    #[error("Item count must not be negative (got {items})")]
    InvalidItemCount { items: i32 },

    /// Thread role panic sebelum melapor
    #[error("{role} thread terminated abnormally")]
    RoleFailed { role: Role },

    /// OS menolak membuat thread
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// Handler SIGINT gagal dipasang
    #[error("Failed to install interrupt handler: {0}")]
    SignalHandler(std::io::Error),
}

impl HandoffError {
    /// Create an interrupted error for `role`
    pub fn interrupted(role: Role) -> Self {
        Self::Interrupted { role }
    }

    /// `true` jika error ini adalah cancellation, bukan kegagalan lain
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}
