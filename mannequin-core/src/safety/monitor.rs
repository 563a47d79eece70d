//! Endstop fault monitor
//!
//! Watches the switch levels while a move is in progress. Both endstops
//! reading closed at once means a wiring or switch fault; once it persists
//! past the debounce window the move has to be abandoned.

use crate::config::SafetyConfig;
use crate::motion::limits::EndstopLevels;
use crate::time::{elapsed_ms, Millis};

/// Hardware faults that stop the mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// The terminating endstop never closed during cruise
    EndstopTimeout,
    /// Both endstops read closed at the same time
    EndstopConflict,
}

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(FaultKind),
}

/// Fault monitor
#[derive(Debug, Clone)]
pub struct FaultMonitor {
    config: SafetyConfig,
    /// When both switches were first seen closed in the current run
    conflict_since: Option<Millis>,
}

impl FaultMonitor {
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            config,
            conflict_since: None,
        }
    }

    /// Check this tick's switch levels
    ///
    /// Conflicts only count while `moving`; an idle mechanism resets the window.
    pub fn update(&mut self, now: Millis, levels: EndstopLevels, moving: bool) -> SafetyStatus {
        if !moving || !levels.conflicting() {
            self.conflict_since = None;
            return SafetyStatus::Ok;
        }

        let since = *self.conflict_since.get_or_insert(now);
        if elapsed_ms(now, since) >= self.config.conflict_debounce_ms {
            SafetyStatus::Fault(FaultKind::EndstopConflict)
        } else {
            SafetyStatus::Ok
        }
    }
}
