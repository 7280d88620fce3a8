use crate::core::{BoundedBuffer, CancelToken};
use crate::error::{HandoffError, HandoffResult, Role};

/// Produce `0..items` ke buffer, berurutan
pub struct Producer {
    buffer: BoundedBuffer<i32>,
    items: i32,
    cancel: CancelToken,
}

impl Producer {
    pub fn new(buffer: BoundedBuffer<i32>, items: i32, cancel: CancelToken) -> Self {
        Self {
            buffer,
            items,
            cancel,
        }
    }

    /// Jalankan sampai selesai atau interrupted.
    ///
    /// Returns jumlah item yang di-produce.
    pub fn run(&self) -> HandoffResult<usize> {
        let echo = self.buffer.echo();
        let result = self.produce_all();

        match &result {
            Ok(count) => {
                echo.line(format_args!("[Producer] finished producing {} items", count));
                tracing::debug!(count, "producer finished");
            }
            Err(e) if e.is_interrupted() => {
                echo.line(format_args!("[Producer] was interrupted"));
                tracing::debug!("producer interrupted");
            }
            Err(e) => tracing::warn!(error = %e, "producer failed"),
        }

        result
    }

    fn produce_all(&self) -> HandoffResult<usize> {
        let mut produced = 0;
        for value in 0..self.items {
            if self.cancel.is_cancelled() {
                return Err(HandoffError::interrupted(Role::Producer));
            }
            self.buffer.produce(value, &self.cancel)?;
            produced += 1;
        }
        Ok(produced)
    }
}
