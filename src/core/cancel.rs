//! Cooperative Cancellation Token
//!
//! Token bisa di-clone dan di-share antar thread. Sekali `cancel()` dipanggil,
//! token tetap cancelled dan semua wait yang terdaftar dibangunkan.
//!
//! Yang dibangunkan adalah [`Interrupt`]: buffer mendaftarkan dirinya
//! selama ia menunggu di condvar, orchestrator mendaftarkan completion
//! channel-nya selama ia menunggu role selesai.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::lock;

/// Sesuatu yang sedang (atau akan) blocking dan harus dibangunkan saat cancel.
///
/// `interrupt()` dipanggil tanpa lock token yang dipegang, jadi implementasi
/// boleh mengambil lock miliknya sendiri.
pub trait Interrupt: Send + Sync {
    fn interrupt(&self);
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    waiters: Mutex<Vec<(u64, Arc<dyn Interrupt>)>>,
}

/// Cancellation signal untuk satu thread of control
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenInner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set token dan bangunkan semua waiter yang terdaftar.
    ///
    /// Idempotent: panggilan kedua tidak membangunkan siapa pun.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::AcqRel) {
            return;
        }

        // Copy dulu, lalu lepas lock sebelum interrupt()
        let waiters: Vec<Arc<dyn Interrupt>> = lock(&self.inner.waiters)
            .iter()
            .map(|(_, waiter)| Arc::clone(waiter))
            .collect();

        tracing::debug!(waiters = waiters.len(), "cancellation requested");

        for waiter in waiters {
            waiter.interrupt();
        }
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Daftarkan `waiter` sampai [`Registration`] di-drop.
    ///
    /// Caller wajib cek `is_cancelled()` SETELAH register dan sebelum
    /// blocking. Cancel yang terjadi sebelum register tidak membangunkan
    /// `waiter`, tapi flag-nya pasti sudah terlihat.
    pub fn register(&self, waiter: Arc<dyn Interrupt>) -> Registration<'_> {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.waiters).push((id, waiter));
        Registration { token: self, id }
    }

    #[cfg(test)]
    fn registered(&self) -> usize {
        lock(&self.inner.waiters).len()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Guard dari [`CancelToken::register`]
pub struct Registration<'a> {
    token: &'a CancelToken,
    id: u64,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        lock(&self.token.inner.waiters).retain(|(id, _)| *id != self.id);
    }
}
