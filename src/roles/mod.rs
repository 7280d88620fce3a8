//! Driver roles: satu Producer dan satu Consumer
//!
//! Masing-masing berjalan di thread sendiri, memanggil buffer satu per satu
//! (tanpa batching) dan berhenti di cancellation pertama.

mod consumer;
mod producer;

pub use consumer::Consumer;
pub use producer::Producer;
