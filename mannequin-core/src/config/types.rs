//! Configuration type definitions
//!
//! The defaults reproduce the reference mechanism: a 255-step duty range,
//! a 150 crawl level and a 1 ms control tick.

/// Full-scale motor output level (8-bit duty equivalent)
pub const MAX_LEVEL: u8 = 255;

/// Control tick period in milliseconds
pub const TICK_PERIOD_MS: u32 = 1;

/// Errors found while validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Cruise level must be above zero and below the maximum level
    CruiseLevelOutOfRange,
    /// A ramp step of zero would never leave its stage
    ZeroRampStep,
    /// Body hits needed for a descent must be at least one
    ZeroBodyThreshold,
}

/// Motor ramp profile
///
/// All steps are output levels per millisecond of elapsed stage time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampConfig {
    /// Output level at full power
    pub max_level: u8,
    /// Crawl level held while waiting for the endstop
    pub cruise_level: u8,
    /// Acceleration step (0 -> max)
    pub step_up: u8,
    /// Deceleration step (max -> cruise)
    pub step_down: u8,
    /// Brake step (cruise -> 0)
    pub step_brake: u8,
    /// Full power hold while descending (gravity assists)
    pub full_hold_down_ms: u32,
    /// Full power hold while ascending (gravity opposes)
    pub full_hold_up_ms: u32,
    /// Longest time allowed in cruise before the move is abandoned.
    /// `None` waits for the endstop forever.
    pub cruise_timeout_ms: Option<u32>,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            max_level: MAX_LEVEL,
            cruise_level: 150,
            step_up: 5,
            step_down: 1,
            step_brake: 3,
            full_hold_down_ms: 800,
            full_hold_up_ms: 1200,
            cruise_timeout_ms: Some(4000),
        }
    }
}

impl RampConfig {
    /// Check that every stage of the profile can terminate
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cruise_level == 0 || self.cruise_level >= self.max_level {
            return Err(ConfigError::CruiseLevelOutOfRange);
        }
        if self.step_up == 0 || self.step_down == 0 || self.step_brake == 0 {
            return Err(ConfigError::ZeroRampStep);
        }
        Ok(())
    }
}

/// Target phase timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseTiming {
    /// Pause at the bottom before redeploying
    pub hold_down_ms: u32,
    /// Pause at the top before arming again
    pub hold_up_ms: u32,
    /// Consecutive body hits that retract the target
    pub body_hits_to_descend: u8,
}

impl Default for PhaseTiming {
    fn default() -> Self {
        Self {
            hold_down_ms: 3000,
            hold_up_ms: 1000,
            body_hits_to_descend: 2,
        }
    }
}

/// Fault detection thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SafetyConfig {
    /// Both endstops must read closed this long during a move to count as a fault
    pub conflict_debounce_ms: u32,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            conflict_debounce_ms: 20,
        }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetConfig {
    pub ramp: RampConfig,
    pub timing: PhaseTiming,
    pub safety: SafetyConfig,
}

impl TargetConfig {
    /// Validate all sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ramp.validate()?;
        if self.timing.body_hits_to_descend == 0 {
            return Err(ConfigError::ZeroBodyThreshold);
        }
        Ok(())
    }
}
