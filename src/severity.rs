// SPDX-License-Identifier: Apache-2.0 OR MIT
// Severity levels (RFC 5424 syslog-style) and the shared threshold cell

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity levels (lower is more severe), plus the two admission
/// sentinels: `Off` suppresses every record, `All` admits every record.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Admit nothing (threshold sentinel, not a record level)
    Off = 0,
    /// System unusable
    Emergency = 1,
    /// Immediate action required
    Alert = 2,
    /// Critical conditions
    Critical = 3,
    /// Error conditions
    Error = 4,
    /// Warning conditions
    Warning = 5,
    /// Significant normal condition
    Notice = 6,
    /// Informational
    Info = 7,
    /// Debug-level messages
    Debug = 8,
    /// Admit everything (threshold sentinel, not a record level)
    All = 255,
}

impl Severity {
    /// Get severity level as u8
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get severity name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Off => "OFF",
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
            Severity::All => "ALL",
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Severity::Off),
            1 => Some(Severity::Emergency),
            2 => Some(Severity::Alert),
            3 => Some(Severity::Critical),
            4 => Some(Severity::Error),
            5 => Some(Severity::Warning),
            6 => Some(Severity::Notice),
            7 => Some(Severity::Info),
            8 => Some(Severity::Debug),
            255 => Some(Severity::All),
            _ => None,
        }
    }

    /// Admission test: does a record at this severity pass `threshold`?
    ///
    /// Pure comparison, no side effects. A record passes when it is at
    /// least as severe as the threshold, so `All` (255) admits every
    /// level and `Off` (0) admits none.
    #[inline]
    pub const fn passes(self, threshold: Severity) -> bool {
        self.as_u8() <= threshold.as_u8()
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared, race-free container for a current minimum severity.
///
/// One cell is owned by each named configuration and shared by reference
/// with every handler derived from it; derivation never copies the cell.
/// Reads are a single relaxed atomic load on the logging hot path.
pub struct SeverityCell {
    level: AtomicU8,
}

impl SeverityCell {
    /// Create a cell holding `level`
    pub fn new(level: Severity) -> Self {
        Self {
            level: AtomicU8::new(level.as_u8()),
        }
    }

    /// Current threshold (no blocking, no allocation)
    #[inline]
    pub fn get(&self) -> Severity {
        Severity::from_u8(self.level.load(Ordering::Relaxed)).unwrap_or(Severity::Info)
    }

    /// Replace the threshold with a single atomic store
    #[inline]
    pub fn set(&self, level: Severity) {
        self.level.store(level.as_u8(), Ordering::Relaxed);
    }
}

impl std::fmt::Debug for SeverityCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SeverityCell").field(&self.get()).finish()
    }
}
