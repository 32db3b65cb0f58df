//! Spawned async output: one tokio task per message, never awaited

use crate::core::dispatcher::panic_message;
use crate::core::{AsyncOutput, LoggerError, LoggerMetrics, Message, Output, Result, SharedFormatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

/// Adapts an [`AsyncOutput`] to the synchronous [`Output`] contract.
///
/// `emit` starts delivery on the captured runtime and returns immediately.
/// Task errors and panics cannot reach the dispatcher, so they are counted in
/// this output's own [`LoggerMetrics`]. Tasks cancelled by runtime shutdown
/// count as dropped.
pub struct SpawnOutput<O: AsyncOutput> {
    inner: Arc<O>,
    handle: Handle,
    name: String,
    pending: Arc<AtomicUsize>,
    metrics: Arc<LoggerMetrics>,
}

impl<O: AsyncOutput> SpawnOutput<O> {
    /// Capture the runtime of the calling context.
    ///
    /// Fails outside a tokio runtime.
    pub fn new(inner: O) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| LoggerError::config("spawn", format!("no tokio runtime: {}", e)))?;
        Ok(Self::with_handle(inner, handle))
    }

    pub fn with_handle(inner: O, handle: Handle) -> Self {
        let name = format!("spawn({})", inner.name());
        Self {
            inner: Arc::new(inner),
            handle,
            name,
            pending: Arc::new(AtomicUsize::new(0)),
            metrics: Arc::new(LoggerMetrics::new()),
        }
    }

    /// Tasks started but not yet finished
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    pub fn metrics_handle(&self) -> Arc<LoggerMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl<O: AsyncOutput> Output for SpawnOutput<O> {
    fn emit(&self, message: &Message, formatter: &SharedFormatter) -> Result<()> {
        self.metrics.record_dispatched();
        self.pending.fetch_add(1, Ordering::AcqRel);

        let inner = Arc::clone(&self.inner);
        let message = message.clone();
        let formatter = Arc::clone(formatter);
        let delivery = self
            .handle
            .spawn(async move { inner.emit(message, formatter).await });

        // Initiate only: the watcher records the outcome, nobody awaits it
        let pending = Arc::clone(&self.pending);
        let metrics = Arc::clone(&self.metrics);
        let name = self.name.clone();
        self.handle.spawn(async move {
            match delivery.await {
                Ok(Ok(())) => {
                    metrics.record_delivered();
                }
                Ok(Err(e)) => {
                    let previous = metrics.record_failure();
                    if previous == 0 || (previous + 1) % 1000 == 0 {
                        eprintln!("[LOGGER ERROR] Async output ({}) failed: {}", name, e);
                    }
                }
                Err(join_error) if join_error.is_panic() => {
                    let previous = metrics.record_panic();
                    if previous == 0 || (previous + 1) % 1000 == 0 {
                        eprintln!(
                            "[LOGGER CRITICAL] Async output ({}) panicked: {}",
                            name,
                            panic_message(join_error.into_panic().as_ref())
                        );
                    }
                }
                Err(_) => {
                    metrics.record_dropped();
                }
            }
            pending.fetch_sub(1, Ordering::AcqRel);
        });
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<O: AsyncOutput> std::fmt::Debug for SpawnOutput<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnOutput")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}
