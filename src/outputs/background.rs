//! Background output: formatting and delivery on a dedicated worker thread
//!
//! The log call only enqueues. The wrapped output runs on the worker, so a
//! slow sink or an expensive formatter never blocks the caller.

use crate::core::dispatcher::panic_message;
use crate::core::{
    LoggerError, LoggerMetrics, Message, Output, Result, SharedFormatter, SharedOutput,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

type Job = (Message, SharedFormatter);

/// Wraps an [`Output`] behind a bounded queue and one worker thread.
///
/// A full queue drops the message and reports `QueueFull` to the dispatcher
/// instead of blocking. Dropping the output drains the queue, waiting at most
/// [`DEFAULT_SHUTDOWN_TIMEOUT`].
///
/// # Example
///
/// ```
/// use rust_log_facade::prelude::*;
///
/// # fn main() -> rust_log_facade::Result<()> {
/// let dispatcher = Dispatcher::new();
/// dispatcher.add_output(JsonFormatter::new(), BackgroundOutput::new(ConsoleOutput::new(), 1024)?);
///
/// dispatcher.create_logger(Some("jobs")).info("queued");
/// dispatcher.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct BackgroundOutput {
    name: String,
    capacity: usize,
    inner: SharedOutput,
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    pending: Arc<AtomicUsize>,
    metrics: Arc<LoggerMetrics>,
}

impl BackgroundOutput {
    /// Start the worker thread. `capacity` must be non-zero.
    pub fn new<O: Output + 'static>(inner: O, capacity: usize) -> Result<Self> {
        Self::from_shared(Arc::new(inner), capacity)
    }

    pub fn from_shared(inner: SharedOutput, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(LoggerError::config(
                "background",
                "queue capacity must be greater than zero",
            ));
        }

        let name = format!("background({})", inner.name());
        let (sender, receiver) = bounded(capacity);
        let pending = Arc::new(AtomicUsize::new(0));
        let metrics = Arc::new(LoggerMetrics::new());

        let worker = {
            let inner = Arc::clone(&inner);
            let pending = Arc::clone(&pending);
            let metrics = Arc::clone(&metrics);
            thread::Builder::new()
                .name("log-background".to_string())
                .spawn(move || run_worker(receiver, inner, pending, metrics))?
        };

        Ok(Self {
            name,
            capacity,
            inner,
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            pending,
            metrics,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Messages enqueued but not yet delivered
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Delivery counters of the worker
    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn metrics_handle(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Close the queue and wait for the worker to drain it.
    ///
    /// Returns `true` if the worker finished within `timeout`. Later calls to
    /// `emit` fail with `WorkerStopped`.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        drop(self.sender.lock().take());

        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let start = Instant::now();
        loop {
            if handle.is_finished() {
                if let Err(e) = handle.join() {
                    eprintln!("[LOGGER ERROR] Background worker panicked during shutdown: {:?}", e);
                    return false;
                }
                break;
            }

            if start.elapsed() >= timeout {
                eprintln!(
                    "[LOGGER WARNING] Background worker did not finish within {:?}. \
                     Some logs may be lost.",
                    timeout
                );
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }

        if let Err(e) = self.inner.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown: {}", e);
            return false;
        }
        true
    }

    fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.pending() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(1));
        }
        true
    }
}

fn run_worker(
    receiver: Receiver<Job>,
    inner: SharedOutput,
    pending: Arc<AtomicUsize>,
    metrics: Arc<LoggerMetrics>,
) {
    // Ends once every sender is gone and the queue is empty
    for (message, formatter) in receiver {
        let result = panic::catch_unwind(AssertUnwindSafe(|| inner.emit(&message, &formatter)));

        match result {
            Ok(Ok(())) => {
                metrics.record_delivered();
            }
            Ok(Err(e)) => {
                let previous = metrics.record_failure();
                if previous == 0 || (previous + 1) % 1000 == 0 {
                    eprintln!(
                        "[LOGGER ERROR] Background output ({}) failed: {}",
                        inner.name(),
                        e
                    );
                }
            }
            Err(panic_info) => {
                let previous = metrics.record_panic();
                if previous == 0 || (previous + 1) % 1000 == 0 {
                    eprintln!(
                        "[LOGGER CRITICAL] Background output ({}) panicked: {}",
                        inner.name(),
                        panic_message(panic_info.as_ref())
                    );
                }
            }
        }

        pending.fetch_sub(1, Ordering::AcqRel);
    }
}

impl Output for BackgroundOutput {
    fn emit(&self, message: &Message, formatter: &SharedFormatter) -> Result<()> {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            return Err(LoggerError::WorkerStopped);
        };

        self.metrics.record_dispatched();
        self.pending.fetch_add(1, Ordering::AcqRel);

        match sender.try_send((message.clone(), Arc::clone(formatter))) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                self.metrics.record_dropped();
                Err(LoggerError::queue_full(sender.len(), self.capacity))
            }
            Err(TrySendError::Disconnected(_)) => {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                Err(LoggerError::WorkerStopped)
            }
        }
    }

    /// Wait for queued messages to be delivered, then flush the wrapped output
    fn flush(&self) -> Result<()> {
        if !self.wait_idle(DEFAULT_SHUTDOWN_TIMEOUT) {
            return Err(LoggerError::output(
                self.name.clone(),
                format!("{} messages still queued after flush timeout", self.pending()),
            ));
        }
        self.inner.flush()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for BackgroundOutput {
    fn drop(&mut self) {
        self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}

impl std::fmt::Debug for BackgroundOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundOutput")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::sync::mpsc;

    fn formatter() -> SharedFormatter {
        Arc::new(|m: &Message| m.message.as_str().unwrap_or("?").to_string())
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BackgroundOutput::new(|_: &Message, _: &SharedFormatter| -> Result<()> { Ok(()) }, 0);
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_delivers_on_worker_thread() -> Result<()> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let output = BackgroundOutput::new(
            move |m: &Message, f: &SharedFormatter| -> Result<()> {
                let thread_name = thread::current().name().map(str::to_string);
                sink.lock().push((f.format(m)?, thread_name));
                Ok(())
            },
            16,
        )?;

        for text in ["a", "b", "c"] {
            output.emit(&Message::now(LogLevel::Info, text), &formatter())?;
        }
        output.flush()?;

        let lines = lines.lock();
        let texts: Vec<_> = lines.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert!(lines
            .iter()
            .all(|(_, t)| t.as_deref() == Some("log-background")));
        assert_eq!(output.metrics().delivered(), 3);
        assert_eq!(output.pending(), 0);
        Ok(())
    }

    #[test]
    fn test_full_queue_drops() -> Result<()> {
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let output = BackgroundOutput::new(
            move |_: &Message, _: &SharedFormatter| -> Result<()> {
                let _ = release_rx.lock().recv();
                Ok(())
            },
            1,
        )?;

        // Worker blocks on the first message, the second fills the queue
        let mut full = None;
        for _ in 0..10 {
            if let Err(e) = output.emit(&Message::now(LogLevel::Info, "x"), &formatter()) {
                full = Some(e);
                break;
            }
        }

        assert!(matches!(full, Some(LoggerError::QueueFull { max: 1, .. })));
        assert!(output.metrics().dropped() >= 1);

        drop(release_tx);
        output.flush()?;
        Ok(())
    }

    #[test]
    fn test_failures_are_counted() -> Result<()> {
        let output = BackgroundOutput::new(
            |_: &Message, _: &SharedFormatter| -> Result<()> { Err(LoggerError::other("sink down")) },
            4,
        )?;

        output.emit(&Message::now(LogLevel::Warn, "x"), &formatter())?;
        output.flush()?;
        assert_eq!(output.metrics().sink_failures(), 1);
        assert_eq!(output.metrics().delivered(), 0);
        Ok(())
    }

    #[test]
    fn test_emit_after_shutdown() -> Result<()> {
        let output = BackgroundOutput::new(|_: &Message, _: &SharedFormatter| -> Result<()> { Ok(()) }, 4)?;
        assert!(output.shutdown(Duration::from_secs(1)));
        assert!(output.shutdown(Duration::from_secs(1)));

        let result = output.emit(&Message::now(LogLevel::Info, "late"), &formatter());
        assert!(matches!(result, Err(LoggerError::WorkerStopped)));
        Ok(())
    }

    #[test]
    fn test_name_wraps_inner() -> Result<()> {
        let output = BackgroundOutput::new(crate::outputs::ConsoleOutput::new(), 4)?;
        assert_eq!(output.name(), "background(console)");
        Ok(())
    }
}
