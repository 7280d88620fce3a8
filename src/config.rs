//! Run configuration

use crate::core::Echo;
use crate::error::{HandoffError, HandoffResult};

/// Kapasitas buffer untuk CLI
pub const DEFAULT_CAPACITY: usize = 5;

/// Jumlah item yang di-produce (0..10) dan di-consume
pub const DEFAULT_ITEMS: i32 = 10;

/// Handoff configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    pub capacity: usize,
    pub items: i32,
    pub echo: Echo,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            items: DEFAULT_ITEMS,
            echo: Echo::Stdout,
        }
    }
}

impl HandoffConfig {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_items(mut self, items: i32) -> Self {
        self.items = items;
        self
    }

    pub fn with_echo(mut self, echo: Echo) -> Self {
        self.echo = echo;
        self
    }

    /// Cek sebelum thread apa pun di-spawn
    pub fn validate(&self) -> HandoffResult<()> {
        if self.capacity == 0 {
            return Err(HandoffError::InvalidCapacity {
                capacity: self.capacity,
            });
        }
        if self.items < 0 {
            return Err(HandoffError::InvalidItemCount { items: self.items });
        }
        Ok(())
    }
}
