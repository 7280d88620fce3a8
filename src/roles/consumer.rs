use crate::core::{BoundedBuffer, CancelToken};
use crate::error::{HandoffError, HandoffResult, Role};

/// Consume tepat `items` nilai dari buffer dan simpan urutannya
pub struct Consumer {
    buffer: BoundedBuffer<i32>,
    items: i32,
    cancel: CancelToken,
}

impl Consumer {
    pub fn new(buffer: BoundedBuffer<i32>, items: i32, cancel: CancelToken) -> Self {
        Self {
            buffer,
            items,
            cancel,
        }
    }

    /// Jalankan sampai selesai atau interrupted.
    ///
    /// Returns nilai yang di-consume, sesuai urutan.
    pub fn run(&self) -> HandoffResult<Vec<i32>> {
        let echo = self.buffer.echo();
        let result = self.consume_all();

        match &result {
            Ok(values) => {
                echo.line(format_args!(
                    "[Consumer] finished consuming {} items",
                    values.len()
                ));
                tracing::debug!(count = values.len(), "consumer finished");
            }
            Err(e) if e.is_interrupted() => {
                echo.line(format_args!("[Consumer] was interrupted"));
                tracing::debug!("consumer interrupted");
            }
            Err(e) => tracing::warn!(error = %e, "consumer failed"),
        }

        result
    }

    fn consume_all(&self) -> HandoffResult<Vec<i32>> {
        let mut values = Vec::with_capacity(usize::try_from(self.items).unwrap_or(0));
        for _ in 0..self.items {
            if self.cancel.is_cancelled() {
                return Err(HandoffError::interrupted(Role::Consumer));
            }
            values.push(self.buffer.consume(&self.cancel)?);
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Echo, Transcript};

    #[test]
    fn test_consumes_exactly_items() {
        let buffer = BoundedBuffer::with_echo(8, Echo::Silent);
        let cancel = CancelToken::new();
        for i in 0..6 {
            buffer.produce(i * 10, &cancel).unwrap();
        }

        let consumer = Consumer::new(buffer.clone(), 4, cancel);
        assert_eq!(consumer.run().unwrap(), vec![0, 10, 20, 30]);
        assert_eq!(buffer.snapshot(), vec![40, 50]);
    }

    #[test]
    fn test_non_positive_count_consumes_nothing() {
        let transcript = Transcript::new();
        let buffer = BoundedBuffer::with_echo(1, Echo::Capture(transcript.clone()));

        for items in [0, -5] {
            let consumer = Consumer::new(buffer.clone(), items, CancelToken::new());
            assert!(consumer.run().unwrap().is_empty());
        }
        assert_eq!(transcript.count("[Consumer] finished consuming 0 items"), 2);
    }

    #[test]
    fn test_interrupted_while_empty() {
        let transcript = Transcript::new();
        let buffer = BoundedBuffer::with_echo(2, Echo::Capture(transcript.clone()));
        let cancel = CancelToken::new();
        buffer.produce(1, &CancelToken::new()).unwrap();

        let handle = {
            let consumer = Consumer::new(buffer.clone(), 3, cancel.clone());
            std::thread::spawn(move || consumer.run())
        };

        // Tunggu sampai consumer benar-benar block di buffer kosong
        while !transcript.contains("[Consumer] Buffer EMPTY - waiting...") {
            std::thread::yield_now();
        }
        cancel.cancel();

        let err = handle.join().unwrap().unwrap_err();
        assert!(matches!(
            err,
            HandoffError::Interrupted {
                role: Role::Consumer
            }
        ));
        assert!(buffer.is_empty());

        assert!(transcript.contains("[Consumer] Consumed: 1 | Buffer: []"));
        assert_eq!(transcript.count("[Consumer] was interrupted"), 1);
    }
}
