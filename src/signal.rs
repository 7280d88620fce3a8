//! SIGINT -> CancelToken
//!
//! Signal handler hanya boleh menyentuh atomic, jadi handler cukup set flag.
//! Thread watcher kecil yang mengubah flag itu menjadi `CancelToken::cancel`.

use crate::core::CancelToken;
use crate::error::HandoffResult;

#[cfg(unix)]
mod imp {
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    use crate::core::CancelToken;
    use crate::error::{HandoffError, HandoffResult};

    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    static SIGINT_RECEIVED: AtomicBool = AtomicBool::new(false);

    extern "C" fn on_sigint(_signum: libc::c_int) {
        SIGINT_RECEIVED.store(true, Ordering::SeqCst);
    }

    pub fn cancel_on_interrupt(token: CancelToken) -> HandoffResult<()> {
        // SAFETY: handler hanya melakukan atomic store (async-signal-safe)
        let previous = unsafe {
            libc::signal(
                libc::SIGINT,
                on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t,
            )
        };
        if previous == libc::SIG_ERR {
            return Err(HandoffError::SignalHandler(io::Error::last_os_error()));
        }

        thread::Builder::new()
            .name("sigint-watcher".to_string())
            .spawn(move || {
                while !token.is_cancelled() {
                    if SIGINT_RECEIVED.swap(false, Ordering::SeqCst) {
                        tracing::info!("SIGINT received");
                        token.cancel();
                        break;
                    }
                    thread::sleep(POLL_INTERVAL);
                }
            })?;

        Ok(())
    }
}

/// Cancel `token` saat proses menerima SIGINT (Ctrl-C).
///
/// Di platform non-unix tidak ada yang dipasang.
pub fn cancel_on_interrupt(token: CancelToken) -> HandoffResult<()> {
    #[cfg(unix)]
    {
        imp::cancel_on_interrupt(token)
    }

    #[cfg(not(unix))]
    {
        let _ = token;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_sigint_cancels_token() {
        let token = CancelToken::new();
        cancel_on_interrupt(token.clone()).unwrap();

        // SAFETY: handler di atas sudah terpasang, raise tidak mematikan proses
        let rc = unsafe { libc::raise(libc::SIGINT) };
        assert_eq!(rc, 0);

        let deadline = Instant::now() + Duration::from_secs(2);
        while !token.is_cancelled() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(token.is_cancelled());
    }
}
