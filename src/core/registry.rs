//! Registry of (formatter, output) pairs

use super::formatter::{Formatter, SharedFormatter};
use super::output::{Output, SharedOutput};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// One registered formatter/output pair
#[derive(Clone)]
pub struct OutputEntry {
    pub formatter: SharedFormatter,
    pub output: SharedOutput,
}

impl OutputEntry {
    pub fn new<F, O>(formatter: F, output: O) -> Self
    where
        F: Formatter + 'static,
        O: Output + 'static,
    {
        Self {
            formatter: Arc::new(formatter),
            output: Arc::new(output),
        }
    }

    /// Build from already shared handles, e.g. one formatter used by several outputs
    pub fn from_shared(formatter: SharedFormatter, output: SharedOutput) -> Self {
        Self { formatter, output }
    }
}

impl fmt::Debug for OutputEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputEntry")
            .field("formatter", &self.formatter.name())
            .field("output", &self.output.name())
            .finish()
    }
}

/// Append-only list of output entries.
///
/// Copy-on-write: readers take an `Arc` snapshot and release the lock before
/// invoking any output, so an output may log or register outputs itself.
#[derive(Debug, Default)]
pub struct OutputRegistry {
    entries: RwLock<Arc<Vec<OutputEntry>>>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: OutputEntry) {
        let mut entries = self.entries.write();
        let mut next = Vec::with_capacity(entries.len() + 1);
        next.extend(entries.iter().cloned());
        next.push(entry);
        *entries = Arc::new(next);
    }

    pub fn replace(&self, new_entries: Vec<OutputEntry>) {
        *self.entries.write() = Arc::new(new_entries);
    }

    /// Entries as of now; later registrations do not affect the snapshot
    #[inline]
    pub fn snapshot(&self) -> Arc<Vec<OutputEntry>> {
        Arc::clone(&self.entries.read())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Message, Result};

    fn noop_entry() -> OutputEntry {
        OutputEntry::new(
            |m: &Message| m.level.to_string(),
            |_: &Message, _: &SharedFormatter| -> Result<()> { Ok(()) },
        )
    }

    #[test]
    fn test_push_grows_without_dedup() {
        let registry = OutputRegistry::new();
        assert!(registry.is_empty());

        let entry = noop_entry();
        registry.push(entry.clone());
        registry.push(entry);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_push() {
        let registry = OutputRegistry::new();
        registry.push(noop_entry());

        let snapshot = registry.snapshot();
        registry.push(noop_entry());

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_replace() {
        let registry = OutputRegistry::new();
        registry.push(noop_entry());
        registry.push(noop_entry());

        registry.replace(vec![noop_entry()]);
        assert_eq!(registry.len(), 1);

        registry.replace(Vec::new());
        assert!(registry.is_empty());
    }
}
