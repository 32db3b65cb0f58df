//! Log level definitions and level selections

use super::error::LoggerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a log event.
///
/// Ordered by severity: `Error > Warn > Log > Info > Debug`. The order is only
/// used for threshold comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug = 0,
    Info = 1,
    Log = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// All levels, most severe first.
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Log,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    /// Lowercase wire name (`"error"`, `"warn"`, ...)
    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }

    /// Uppercase tag used in human-readable output
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Log => "LOG",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    #[inline]
    pub(crate) const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "log" => Ok(LogLevel::Log),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            _ => Err(LoggerError::invalid_level(s)),
        }
    }
}

/// Set of enabled levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LevelSet {
    bits: u8,
}

impl LevelSet {
    const MASK: u8 = 0b1_1111;

    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    pub const fn all() -> Self {
        Self { bits: Self::MASK }
    }

    /// The given level and every more severe level.
    pub fn at_least(level: LogLevel) -> Self {
        LogLevel::ALL
            .iter()
            .copied()
            .filter(|l| *l >= level)
            .collect()
    }

    pub(crate) const fn from_bits(bits: u8) -> Self {
        Self {
            bits: bits & Self::MASK,
        }
    }

    pub(crate) const fn bits(self) -> u8 {
        self.bits
    }

    #[inline]
    pub const fn contains(self, level: LogLevel) -> bool {
        self.bits & level.bit() != 0
    }

    #[must_use]
    pub const fn with(self, level: LogLevel) -> Self {
        Self {
            bits: self.bits | level.bit(),
        }
    }

    pub fn insert(&mut self, level: LogLevel) {
        self.bits |= level.bit();
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Enabled levels, most severe first
    pub fn iter(self) -> impl Iterator<Item = LogLevel> {
        LogLevel::ALL.into_iter().filter(move |l| self.contains(*l))
    }
}

impl FromIterator<LogLevel> for LevelSet {
    fn from_iter<I: IntoIterator<Item = LogLevel>>(iter: I) -> Self {
        let mut set = LevelSet::empty();
        for level in iter {
            set.insert(level);
        }
        set
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|l| l.to_str()).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Argument accepted by `set_level`.
///
/// A single level is a threshold; a list enables exactly its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSelection {
    Threshold(LogLevel),
    Exact(LevelSet),
}

impl LevelSelection {
    /// Resolve into the concrete set of enabled levels
    pub fn resolve(self) -> LevelSet {
        match self {
            LevelSelection::Threshold(level) => LevelSet::at_least(level),
            LevelSelection::Exact(set) => set,
        }
    }
}

impl From<LogLevel> for LevelSelection {
    fn from(level: LogLevel) -> Self {
        LevelSelection::Threshold(level)
    }
}

impl From<LevelSet> for LevelSelection {
    fn from(set: LevelSet) -> Self {
        LevelSelection::Exact(set)
    }
}

impl From<&[LogLevel]> for LevelSelection {
    fn from(levels: &[LogLevel]) -> Self {
        LevelSelection::Exact(levels.iter().copied().collect())
    }
}

impl<const N: usize> From<[LogLevel; N]> for LevelSelection {
    fn from(levels: [LogLevel; N]) -> Self {
        LevelSelection::Exact(levels.into_iter().collect())
    }
}

impl From<Vec<LogLevel>> for LevelSelection {
    fn from(levels: Vec<LogLevel>) -> Self {
        LevelSelection::Exact(levels.into_iter().collect())
    }
}

/// Parses `"warn"` as a threshold and `"error,debug"` as an exact list.
/// An empty string selects no levels at all.
impl FromStr for LevelSelection {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(LevelSelection::Exact(LevelSet::empty()));
        }
        if !trimmed.contains(',') {
            return Ok(LevelSelection::Threshold(trimmed.parse()?));
        }

        let mut set = LevelSet::empty();
        for part in trimmed.split(',') {
            set.insert(part.parse()?);
        }
        Ok(LevelSelection::Exact(set))
    }
}
