//! Enabled-level gate consulted on every log call

use super::log_level::{LevelSelection, LevelSet, LogLevel};
use std::sync::atomic::{AtomicU8, Ordering};

/// Holds the enabled-level set.
///
/// Reads are a single relaxed load, so a disabled log call costs one bit test.
#[derive(Debug)]
pub struct LevelGate {
    enabled: AtomicU8,
}

impl LevelGate {
    /// Gate with every level enabled
    pub const fn new() -> Self {
        Self::with_levels(LevelSet::all())
    }

    pub const fn with_levels(levels: LevelSet) -> Self {
        Self {
            enabled: AtomicU8::new(levels.bits()),
        }
    }

    /// Replace the enabled set
    pub fn set(&self, selection: impl Into<LevelSelection>) {
        let levels = selection.into().resolve();
        self.enabled.store(levels.bits(), Ordering::Relaxed);
    }

    #[inline]
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.enabled.load(Ordering::Relaxed) & level.bit() != 0
    }

    pub fn levels(&self) -> LevelSet {
        LevelSet::from_bits(self.enabled.load(Ordering::Relaxed))
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new()
    }
}
