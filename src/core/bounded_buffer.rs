//! Blocking Bounded Buffer (Mutex + Condvar)
//!
//! Monitor klasik: satu Mutex menjaga queue, dua Condvar untuk "not full"
//! dan "not empty". `Condvar::wait` melepas lock secara atomik dan
//! mengambilnya lagi sebelum return, jadi predicate selalu dicek ulang
//! dengan lock dipegang.

use std::collections::VecDeque;
use std::fmt::{self, Debug};
use std::sync::{Arc, Condvar, Mutex, PoisonError};

use super::cancel::{CancelToken, Interrupt, Registration};
use super::lock;
use crate::error::{HandoffError, HandoffResult, Role};

/// Tujuan output console dari buffer dan role
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Echo {
    /// Tulis setiap event ke stdout (mode CLI)
    #[default]
    Stdout,
    /// Tanpa output, untuk benchmark dan test yang berisik
    Silent,
    /// Simpan setiap baris ke [`Transcript`] bersama
    Capture(Transcript),
}

impl Echo {
    /// Tulis satu baris output sesuai mode: stdout, dibuang, atau ke transcript
    #[inline]
    pub fn line(&self, args: fmt::Arguments<'_>) {
        match self {
            Echo::Stdout => println!("{}", args),
            Echo::Silent => {}
            Echo::Capture(transcript) => lock(&transcript.lines).push(args.to_string()),
        }
    }
}

/// Baris output yang ditangkap, dalam urutan ditulis
///
/// Clone berbagi buffer yang sama.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy semua baris sejauh ini
    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    /// Berapa kali `line` muncul persis
    pub fn count(&self, line: &str) -> usize {
        lock(&self.lines).iter().filter(|l| *l == line).count()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.count(line) > 0
    }
}

// Dua transcript sama jika berbagi buffer yang sama
impl PartialEq for Transcript {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lines, &other.lines)
    }
}

impl Eq for Transcript {}

struct Shared<T> {
    queue: Mutex<VecDeque<T>>,
    // Producer menunggu di sini
    not_full: Condvar,
    // Consumer menunggu di sini
    not_empty: Condvar,
    capacity: usize,
    echo: Echo,
}

impl<T: Send> Interrupt for Shared<T> {
    fn interrupt(&self) {
        // Notify dengan lock dipegang: waiter yang sudah cek token tapi belum
        // masuk wait() tidak bisa kelewatan wakeup ini
        let _queue = lock(&self.queue);
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

/// Bounded FIFO buffer dengan blocking `produce`/`consume`
///
/// Handle ini murah untuk di-clone; semua clone berbagi queue yang sama.
pub struct BoundedBuffer<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> BoundedBuffer<T> {
    /// Membuat buffer baru dengan output ke stdout.
    ///
    /// # Panics
    /// Panic jika `capacity == 0`
    pub fn new(capacity: usize) -> Self {
        Self::with_echo(capacity, Echo::Stdout)
    }

    /// # Panics
    /// Panic jika `capacity == 0`
    pub fn with_echo(capacity: usize, echo: Echo) -> Self {
        assert!(capacity > 0, "capacity must be at least 1");

        echo.line(format_args!("Buffer created with capacity: {}", capacity));
        tracing::debug!(capacity, "bounded buffer created");

        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(VecDeque::with_capacity(capacity)),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                capacity,
                echo,
            }),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    #[inline]
    pub fn echo(&self) -> &Echo {
        &self.shared.echo
    }

    /// Jumlah item saat ini
    pub fn len(&self) -> usize {
        lock(&self.shared.queue).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.shared.queue).is_empty()
    }

    pub fn is_full(&self) -> bool {
        lock(&self.shared.queue).len() >= self.shared.capacity
    }
}

impl<T: Clone> BoundedBuffer<T> {
    /// Copy isi buffer, head dulu
    pub fn snapshot(&self) -> Vec<T> {
        lock(&self.shared.queue).iter().cloned().collect()
    }
}

impl<T: Send + Debug + 'static> BoundedBuffer<T> {
    /// Tambahkan `value` di tail; block selama buffer penuh.
    ///
    /// Setelah push, semua consumer yang menunggu dibangunkan.
    ///
    /// # Errors
    /// `HandoffError::Interrupted` jika `cancel` di-set saat (atau sebelum)
    /// menunggu. Buffer tidak berubah dan `value` dibuang.
    pub fn produce(&self, value: T, cancel: &CancelToken) -> HandoffResult<()> {
        let shared = &self.shared;
        let mut queue = lock(&shared.queue);
        let mut registration = None;

        while queue.len() >= shared.capacity {
            self.arm(&mut registration, cancel, Role::Producer)?;

            shared
                .echo
                .line(format_args!("[Producer] Buffer FULL - waiting..."));
            tracing::trace!(len = queue.len(), "producer waiting on not_full");

            queue = shared
                .not_full
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);

            if cancel.is_cancelled() {
                return Err(HandoffError::interrupted(Role::Producer));
            }
        }

        queue.push_back(value);
        if let Some(value) = queue.back() {
            shared.echo.line(format_args!(
                "[Producer] Produced: {:?} | Buffer: {:?}",
                value, *queue
            ));
        }

        shared.not_empty.notify_all();
        tracing::trace!(len = queue.len(), "producer notified not_empty");
        Ok(())
    }

    /// Ambil item dari head; block selama buffer kosong.
    ///
    /// Setelah pop, semua producer yang menunggu dibangunkan.
    ///
    /// # Errors
    /// `HandoffError::Interrupted` jika `cancel` di-set saat (atau sebelum)
    /// menunggu. Buffer tidak berubah.
    pub fn consume(&self, cancel: &CancelToken) -> HandoffResult<T> {
        let shared = &self.shared;
        let mut queue = lock(&shared.queue);
        let mut registration = None;

        let value = loop {
            if let Some(value) = queue.pop_front() {
                break value;
            }

            self.arm(&mut registration, cancel, Role::Consumer)?;

            shared
                .echo
                .line(format_args!("[Consumer] Buffer EMPTY - waiting..."));
            tracing::trace!("consumer waiting on not_empty");

            queue = shared
                .not_empty
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner);

            if cancel.is_cancelled() {
                return Err(HandoffError::interrupted(Role::Consumer));
            }
        };

        shared.echo.line(format_args!(
            "[Consumer] Consumed: {:?} | Buffer: {:?}",
            value, *queue
        ));

        shared.not_full.notify_all();
        tracing::trace!(len = queue.len(), "consumer notified not_full");
        Ok(value)
    }

    /// Register buffer ke token (sekali per call), lalu cek flag.
    ///
    /// Urutan register -> cek wajib: cancel yang datang setelah cek ini
    /// pasti membangunkan wait() berikutnya.
    fn arm<'a>(
        &self,
        registration: &mut Option<Registration<'a>>,
        cancel: &'a CancelToken,
        role: Role,
    ) -> HandoffResult<()> {
        if registration.is_none() {
            let waiter: Arc<dyn Interrupt> = self.shared.clone();
            *registration = Some(cancel.register(waiter));
        }

        if cancel.is_cancelled() {
            tracing::debug!(%role, "wait abandoned");
            return Err(HandoffError::interrupted(role));
        }
        Ok(())
    }
}
