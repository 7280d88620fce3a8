//! Orchestrator: buat buffer, spawn kedua role, tunggu sampai selesai
//!
//! Role melapor lewat completion channel (bukan langsung `join()`), supaya
//! wait di thread utama juga bisa di-cancel. Cancel di sini hanya berhenti
//! menunggu; thread role tidak dihentikan paksa. Thread yang tertinggal
//! disimpan dan bisa diminta berhenti lewat [`Orchestrator::shutdown`].

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::config::HandoffConfig;
use crate::core::{lock, BoundedBuffer, CancelToken, Interrupt};
use crate::error::{HandoffError, HandoffResult, Role};
use crate::roles::{Consumer, Producer};

/// Hasil run yang sukses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub produced: usize,
    pub consumed: Vec<i32>,
}

/// Pesan di completion channel
enum Signal {
    Produced(HandoffResult<usize>),
    Consumed(HandoffResult<Vec<i32>>),
    /// Thread role unwind sebelum sempat melapor
    Failed(Role),
    /// Token orchestrator di-cancel
    Cancelled,
}

/// Posting `Signal::Cancelled` saat token orchestrator di-cancel
struct CancelNotice {
    tx: Mutex<Sender<Signal>>,
}

impl Interrupt for CancelNotice {
    fn interrupt(&self) {
        let _ = lock(&self.tx).send(Signal::Cancelled);
    }
}

/// Laporan satu role; kalau di-drop tanpa `deliver` (panic), kirim `Failed`
struct Report {
    role: Role,
    tx: Sender<Signal>,
    delivered: bool,
}

impl Report {
    fn deliver(mut self, signal: Signal) {
        let _ = self.tx.send(signal);
        self.delivered = true;
    }
}

impl Drop for Report {
    fn drop(&mut self) {
        if !self.delivered {
            let _ = self.tx.send(Signal::Failed(self.role));
        }
    }
}

pub struct Orchestrator {
    config: HandoffConfig,
    producer_cancel: CancelToken,
    consumer_cancel: CancelToken,
    // Role yang masih jalan setelah wait utama di-cancel
    stragglers: Mutex<Vec<(Role, JoinHandle<()>)>>,
}

impl Orchestrator {
    pub fn new(config: HandoffConfig) -> Self {
        Self {
            config,
            producer_cancel: CancelToken::new(),
            consumer_cancel: CancelToken::new(),
            stragglers: Mutex::new(Vec::new()),
        }
    }

    /// Token untuk meng-interrupt thread producer
    pub fn producer_token(&self) -> &CancelToken {
        &self.producer_cancel
    }

    /// Token untuk meng-interrupt thread consumer
    pub fn consumer_token(&self) -> &CancelToken {
        &self.consumer_cancel
    }

    /// Jalankan satu handoff penuh dan tunggu kedua role.
    ///
    /// # Errors
    /// - `Interrupted { role: Main }` jika `cancel` di-set saat menunggu
    /// - `Interrupted { role }` jika salah satu role di-interrupt
    /// - `RoleFailed` jika thread role panic
    /// - `InvalidCapacity` / `InvalidItemCount` / `Spawn`
    pub fn run(&self, cancel: &CancelToken) -> HandoffResult<RunReport> {
        self.config.validate()?;

        let echo = &self.config.echo;
        let items = self.config.items;
        let buffer = BoundedBuffer::with_echo(self.config.capacity, echo.clone());

        let (tx, rx) = mpsc::channel();
        let notice = Arc::new(CancelNotice {
            tx: Mutex::new(tx.clone()),
        });
        let _registration = cancel.register(notice);

        echo.line(format_args!(""));
        tracing::info!(capacity = self.config.capacity, items, "starting handoff");

        let producer = Producer::new(buffer.clone(), items, self.producer_cancel.clone());
        let producer_handle = spawn_role(Role::Producer, tx.clone(), move || {
            Signal::Produced(producer.run())
        })?;

        let consumer = Consumer::new(buffer, items, self.consumer_cancel.clone());
        let consumer_handle = spawn_role(Role::Consumer, tx, move || {
            Signal::Consumed(consumer.run())
        })?;

        let (produced, consumed) = match self.await_roles(&rx, cancel) {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_interrupted() {
                    echo.line(format_args!("Main thread interrupted"));
                }
                lock(&self.stragglers).extend([
                    (Role::Producer, producer_handle),
                    (Role::Consumer, consumer_handle),
                ]);
                return Err(e);
            }
        };

        // Keduanya sudah melapor: join tidak akan lama
        join_role(Role::Producer, producer_handle)?;
        join_role(Role::Consumer, consumer_handle)?;

        let report = RunReport {
            produced: produced?,
            consumed: consumed?,
        };

        echo.line(format_args!(""));
        echo.line(format_args!("All threads completed successfully!"));
        tracing::info!(produced = report.produced, "handoff complete");

        Ok(report)
    }

    /// Minta semua role berhenti (cooperative) lalu join thread yang tertinggal.
    ///
    /// Dipakai setelah `run` mengembalikan `Interrupted { role: Main }`;
    /// role yang di-cancel mencetak "was interrupted" sebelum keluar.
    ///
    /// # Errors
    /// `RoleFailed` jika salah satu thread panic
    pub fn shutdown(&self) -> HandoffResult<()> {
        self.producer_cancel.cancel();
        self.consumer_cancel.cancel();

        let stragglers = std::mem::take(&mut *lock(&self.stragglers));
        tracing::debug!(threads = stragglers.len(), "joining role threads");

        let mut result = Ok(());
        for (role, handle) in stragglers {
            if let Err(e) = join_role(role, handle) {
                result = Err(e);
            }
        }
        result
    }

    /// Tunggu sampai producer dan consumer sama-sama melapor
    #[allow(clippy::type_complexity)]
    fn await_roles(
        &self,
        rx: &Receiver<Signal>,
        cancel: &CancelToken,
    ) -> HandoffResult<(HandoffResult<usize>, HandoffResult<Vec<i32>>)> {
        let mut produced: Option<HandoffResult<usize>> = None;
        let mut consumed: Option<HandoffResult<Vec<i32>>> = None;

        while produced.is_none() || consumed.is_none() {
            if cancel.is_cancelled() {
                return Err(HandoffError::interrupted(Role::Main));
            }

            match rx.recv() {
                Ok(Signal::Produced(result)) => produced = Some(result),
                Ok(Signal::Consumed(result)) => consumed = Some(result),
                Ok(Signal::Failed(role)) => {
                    tracing::warn!(%role, "role terminated without reporting");
                    let failed = HandoffError::RoleFailed { role };
                    match role {
                        Role::Producer => produced = Some(Err(failed)),
                        _ => consumed = Some(Err(failed)),
                    }
                }
                // Flag sudah di-set, dicek di awal loop
                Ok(Signal::Cancelled) => {}
                Err(_) => {
                    // `CancelNotice` memegang sender, jadi ini tidak terjadi
                    // selama registrasi masih hidup
                    let role = if produced.is_none() {
                        Role::Producer
                    } else {
                        Role::Consumer
                    };
                    return Err(HandoffError::RoleFailed { role });
                }
            }
        }

        match (produced, consumed) {
            (Some(produced), Some(consumed)) => Ok((produced, consumed)),
            _ => Err(HandoffError::RoleFailed { role: Role::Main }),
        }
    }
}

fn spawn_role<F>(role: Role, tx: Sender<Signal>, body: F) -> HandoffResult<JoinHandle<()>>
where
    F: FnOnce() -> Signal + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(role.to_string().to_lowercase())
        .spawn(move || {
            let report = Report {
                role,
                tx,
                delivered: false,
            };
            report.deliver(body());
        })?;

    Ok(handle)
}

fn join_role(role: Role, handle: JoinHandle<()>) -> HandoffResult<()> {
    handle
        .join()
        .map_err(|_| HandoffError::RoleFailed { role })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Echo, Transcript};
    use std::time::Duration;

    fn captured(capacity: usize, items: i32) -> (Orchestrator, Transcript) {
        let transcript = Transcript::new();
        let orchestrator = Orchestrator::new(
            HandoffConfig::default()
                .with_capacity(capacity)
                .with_items(items)
                .with_echo(Echo::Capture(transcript.clone())),
        );
        (orchestrator, transcript)
    }

    fn quiet(capacity: usize, items: i32) -> Orchestrator {
        Orchestrator::new(
            HandoffConfig::default()
                .with_capacity(capacity)
                .with_items(items)
                .with_echo(Echo::Silent),
        )
    }

    #[test]
    fn test_default_run() {
        let report = quiet(5, 10).run(&CancelToken::new()).unwrap();
        assert_eq!(report.produced, 10);
        assert_eq!(report.consumed, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_capacity_one_run_output() {
        let (orchestrator, transcript) = captured(1, 10);
        orchestrator.run(&CancelToken::new()).unwrap();

        let lines = transcript.lines();
        assert_eq!(lines[0], "Buffer created with capacity: 1");
        assert_eq!(lines[1], "");
        assert_eq!(
            lines.last().map(String::as_str),
            Some("All threads completed successfully!")
        );
        assert_eq!(transcript.count("[Producer] finished producing 10 items"), 1);
        assert_eq!(transcript.count("[Consumer] finished consuming 10 items"), 1);
        assert!(!lines.iter().any(|l| l.contains("interrupted")));

        // Capacity 1: setiap snapshot berisi paling banyak satu item
        for line in lines.iter().filter(|l| l.contains("| Buffer: ")) {
            assert!(!line.contains(", "), "over capacity: {}", line);
        }
    }

    #[test]
    fn test_zero_items() {
        let report = quiet(1, 0).run(&CancelToken::new()).unwrap();
        assert_eq!(report.produced, 0);
        assert!(report.consumed.is_empty());
    }

    #[test]
    fn test_invalid_capacity_spawns_nothing() {
        let err = quiet(0, 10).run(&CancelToken::new()).unwrap_err();
        assert!(matches!(err, HandoffError::InvalidCapacity { capacity: 0 }));
    }

    #[test]
    fn test_interrupted_role_is_reported() {
        let orchestrator = quiet(1, 10);
        orchestrator.producer_token().cancel();
        orchestrator.consumer_token().cancel();

        let err = orchestrator.run(&CancelToken::new()).unwrap_err();
        assert!(matches!(
            err,
            HandoffError::Interrupted {
                role: Role::Producer
            }
        ));
    }

    #[test]
    fn test_cancel_main_wait() {
        let (orchestrator, transcript) = captured(1, 10);
        // Consumer berhenti langsung, producer akan block selamanya di item ke-2
        orchestrator.consumer_token().cancel();

        let cancel = CancelToken::new();
        let canceller = {
            let cancel = cancel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                cancel.cancel();
            })
        };

        let err = orchestrator.run(&cancel).unwrap_err();
        assert!(matches!(err, HandoffError::Interrupted { role: Role::Main }));
        assert_eq!(transcript.count("Main thread interrupted"), 1);
        assert!(!transcript.contains("All threads completed successfully!"));

        canceller.join().unwrap();

        // Producer masih block di buffer penuh sampai di-shutdown
        orchestrator.shutdown().unwrap();
        assert_eq!(transcript.count("[Producer] was interrupted"), 1);
        assert_eq!(transcript.count("[Consumer] was interrupted"), 1);
        assert!(transcript.contains("[Producer] Buffer FULL - waiting..."));

        // Tidak ada thread tersisa: shutdown kedua langsung selesai
        orchestrator.shutdown().unwrap();
    }

    #[test]
    fn test_already_cancelled_main_wait() {
        let (orchestrator, transcript) = captured(5, 10);
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = orchestrator.run(&cancel).unwrap_err();
        assert!(matches!(err, HandoffError::Interrupted { role: Role::Main }));
        assert_eq!(transcript.count("Main thread interrupted"), 1);

        orchestrator.shutdown().unwrap();
        assert!(!transcript.contains("All threads completed successfully!"));
    }
}
