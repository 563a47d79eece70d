//! Non-blocking five-stage motor ramp
//!
//! A move runs RampUp -> Full -> RampToCruise -> Cruise -> RampToStop -> Idle
//! in one direction. Every stage's level is a function of the time elapsed
//! since the stage began, so `update` may be driven from any fixed tick; the
//! reference tick is 1 ms and the per-tick steps in [`RampConfig`] assume it.
//!
//! | Stage        | Level law                               | Leaves when                 |
//! |--------------|-----------------------------------------|-----------------------------|
//! | RampUp       | `min(max, step_up * t)`                 | level reaches max           |
//! | Full         | `max`                                   | `t >= full hold(direction)` |
//! | RampToCruise | `max(cruise, max - step_down * t)`      | level reaches cruise        |
//! | Cruise       | `cruise`                                | terminating endstop closes  |
//! | RampToStop   | `max(0, brake_from - step_brake * t)`   | level reaches 0             |
//!
//! The endstop is only honored in Cruise. A move that never sees its
//! endstop stays in Cruise unless a cruise timeout is configured.

use crate::config::RampConfig;
use crate::motion::limits::LimitSnapshot;
use crate::safety::FaultKind;
use crate::time::{elapsed_ms, Millis};
use crate::traits::{Direction, MotorOutput};

/// Ramp stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampStage {
    /// Motor off, waiting for the next move
    #[default]
    Idle,
    /// Accelerating from 0 to full power
    RampUp,
    /// Holding full power
    Full,
    /// Decelerating to the crawl level
    RampToCruise,
    /// Crawling until the endstop closes
    Cruise,
    /// Braking to zero
    RampToStop,
}

/// Event emitted by [`MotorRamp::update`] when a move ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorEvent {
    /// The move reached its endstop and braked to a stop
    Completed(Direction),
    /// The move was abandoned and braked to a stop
    Faulted(Direction, FaultKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    Endstop,
    Fault(FaultKind),
}

/// Motor ramp controller
#[derive(Debug, Clone)]
pub struct MotorRamp {
    config: RampConfig,
    stage: RampStage,
    direction: Direction,
    level: u8,
    stage_start: Millis,
    /// Level the current brake started from
    brake_from: u8,
    stop_reason: StopReason,
}

impl MotorRamp {
    /// Create an idle ramp
    pub fn new(config: RampConfig) -> Self {
        Self {
            config,
            stage: RampStage::Idle,
            direction: Direction::Up,
            level: 0,
            stage_start: 0,
            brake_from: 0,
            stop_reason: StopReason::Endstop,
        }
    }

    pub fn config(&self) -> &RampConfig {
        &self.config
    }

    pub fn stage(&self) -> RampStage {
        self.stage
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// A move is in progress
    pub fn is_moving(&self) -> bool {
        self.stage != RampStage::Idle
    }

    /// Direction and level to put on the driver
    pub fn output(&self) -> MotorOutput {
        MotorOutput {
            direction: self.direction,
            level: self.level,
        }
    }

    /// Begin a move in `direction` at level 0
    pub fn start_move(&mut self, direction: Direction, now: Millis) {
        self.direction = direction;
        self.level = 0;
        self.stop_reason = StopReason::Endstop;
        self.enter(RampStage::RampUp, now);
    }

    /// Brake the current move from its present level and report `kind`
    /// when it reaches zero
    ///
    /// Does nothing while idle. A brake already in progress keeps its
    /// profile and only takes over the fault.
    pub fn abort(&mut self, kind: FaultKind, now: Millis) {
        match self.stage {
            RampStage::Idle => {}
            RampStage::RampToStop => self.stop_reason = StopReason::Fault(kind),
            _ => self.begin_brake(StopReason::Fault(kind), now),
        }
    }

    /// Advance by one tick
    ///
    /// Returns an event on the tick the level reaches zero.
    pub fn update(&mut self, now: Millis, limits: &LimitSnapshot) -> Option<MotorEvent> {
        let elapsed = elapsed_ms(now, self.stage_start);
        let cfg = self.config;

        match self.stage {
            RampStage::Idle => {
                self.level = 0;
            }

            RampStage::RampUp => {
                self.level = ramp_toward(0, cfg.max_level, cfg.step_up, elapsed);
                if self.level >= cfg.max_level {
                    self.enter(RampStage::Full, now);
                }
            }

            RampStage::Full => {
                self.level = cfg.max_level;
                if elapsed >= self.full_hold_ms() {
                    self.enter(RampStage::RampToCruise, now);
                }
            }

            RampStage::RampToCruise => {
                self.level = ramp_toward(cfg.max_level, cfg.cruise_level, cfg.step_down, elapsed);
                if self.level <= cfg.cruise_level {
                    self.enter(RampStage::Cruise, now);
                }
            }

            RampStage::Cruise => {
                self.level = cfg.cruise_level;
                if limits.end_reached(self.direction) {
                    self.begin_brake(StopReason::Endstop, now);
                } else if cfg.cruise_timeout_ms.is_some_and(|limit| elapsed >= limit) {
                    self.begin_brake(StopReason::Fault(FaultKind::EndstopTimeout), now);
                }
            }

            RampStage::RampToStop => {
                self.level = ramp_toward(self.brake_from, 0, cfg.step_brake, elapsed);
                if self.level == 0 {
                    self.stage = RampStage::Idle;
                    return Some(match self.stop_reason {
                        StopReason::Endstop => MotorEvent::Completed(self.direction),
                        StopReason::Fault(kind) => MotorEvent::Faulted(self.direction, kind),
                    });
                }
            }
        }

        None
    }

    fn full_hold_ms(&self) -> u32 {
        match self.direction {
            Direction::Down => self.config.full_hold_down_ms,
            Direction::Up => self.config.full_hold_up_ms,
        }
    }

    fn begin_brake(&mut self, reason: StopReason, now: Millis) {
        self.brake_from = self.level;
        self.stop_reason = reason;
        self.enter(RampStage::RampToStop, now);
    }

    fn enter(&mut self, stage: RampStage, now: Millis) {
        self.stage = stage;
        self.stage_start = now;
    }
}

/// Level after moving `step` per ms from `from` toward `to` for `elapsed` ms,
/// never passing `to`
fn ramp_toward(from: u8, to: u8, step: u8, elapsed: u32) -> u8 {
    let travel = (step as u32).saturating_mul(elapsed);
    if from <= to {
        (from as u32).saturating_add(travel).min(to as u32) as u8
    } else {
        (from as u32).saturating_sub(travel).max(to as u32) as u8
    }
}
