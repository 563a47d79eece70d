//! Target phase coordinator
//!
//! The target cycles ReadyUp -> MovingDown -> HoldDown -> MovingUp -> HoldUp
//! -> ReadyUp forever. Only ReadyUp is armed: hit edges drained in any other
//! phase are dropped, never queued. Moving phases end on the motor's
//! completion event; hold phases end on a wrap-safe deadline.

use crate::config::PhaseTiming;
use crate::motion::ramp::{MotorEvent, MotorRamp};
use crate::signal::EdgeSet;
use crate::state::tally::ShotTally;
use crate::time::{deadline_after, deadline_reached, Millis};
use crate::traits::Direction;

/// Operational phase of the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetPhase {
    /// Up and armed, hits are acted upon
    ReadyUp,
    /// Retracting after a hit
    MovingDown,
    /// Down, waiting to redeploy
    HoldDown,
    /// Redeploying
    MovingUp,
    /// Up, settling before arming
    HoldUp,
}

impl TargetPhase {
    /// Whether hit edges are acted upon in this phase
    pub fn is_armed(&self) -> bool {
        matches!(self, TargetPhase::ReadyUp)
    }

    /// Phase that follows this one in the cycle
    pub fn next(&self) -> Self {
        match self {
            TargetPhase::ReadyUp => TargetPhase::MovingDown,
            TargetPhase::MovingDown => TargetPhase::HoldDown,
            TargetPhase::HoldDown => TargetPhase::MovingUp,
            TargetPhase::MovingUp => TargetPhase::HoldUp,
            TargetPhase::HoldUp => TargetPhase::ReadyUp,
        }
    }

    /// Indicator level: on while the target is nominally up or just hit,
    /// off while it is down or rising
    pub fn indicator(&self) -> bool {
        matches!(
            self,
            TargetPhase::ReadyUp | TargetPhase::HoldUp | TargetPhase::MovingDown
        )
    }
}

/// Hit classification acted upon while armed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HitReport {
    /// Body hit that did not complete the tally
    BodyOnce,
    /// Body hit that completed the tally and retracts the target
    BodyTwice,
    /// Head hit, retracts the target
    Head,
}

/// Result of one coordinator update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseReport {
    /// Phase before and after, if it changed
    pub transition: Option<(TargetPhase, TargetPhase)>,
    /// Hit acted upon this tick
    pub hit: Option<HitReport>,
}

/// Phase coordinator
#[derive(Debug, Clone)]
pub struct PhaseCoordinator {
    timing: PhaseTiming,
    phase: TargetPhase,
    /// Valid only in HoldDown/HoldUp
    deadline: Millis,
    tally: ShotTally,
}

impl PhaseCoordinator {
    /// Start in MovingDown: the target is sent down once at boot
    pub fn new(timing: PhaseTiming) -> Self {
        Self {
            timing,
            phase: TargetPhase::MovingDown,
            deadline: 0,
            tally: ShotTally::new(),
        }
    }

    pub fn phase(&self) -> TargetPhase {
        self.phase
    }

    pub fn tally(&self) -> u8 {
        self.tally.count()
    }

    /// Deadline of the current hold phase
    pub fn deadline(&self) -> Option<Millis> {
        matches!(self.phase, TargetPhase::HoldDown | TargetPhase::HoldUp).then_some(self.deadline)
    }

    /// Command the boot descent
    pub fn begin(&mut self, now: Millis, motor: &mut MotorRamp) {
        if self.phase == TargetPhase::MovingDown && !motor.is_moving() {
            motor.start_move(Direction::Down, now);
        }
    }

    /// Advance by one tick
    ///
    /// `motor_event` is this tick's ramp result and `edges` the edges drained
    /// from the bus this tick; both are consumed here.
    pub fn update(
        &mut self,
        now: Millis,
        motor_event: Option<MotorEvent>,
        edges: EdgeSet,
        motor: &mut MotorRamp,
    ) -> PhaseReport {
        let from = self.phase;
        let mut hit = None;

        if let Some(MotorEvent::Completed(_)) = motor_event {
            match self.phase {
                TargetPhase::MovingDown => {
                    self.tally.reset();
                    self.enter_hold(TargetPhase::HoldDown, now, self.timing.hold_down_ms);
                }
                TargetPhase::MovingUp => {
                    self.enter_hold(TargetPhase::HoldUp, now, self.timing.hold_up_ms);
                }
                _ => {}
            }
        }

        match self.phase {
            TargetPhase::ReadyUp => hit = self.on_edges(now, edges, motor),
            TargetPhase::HoldDown => {
                if deadline_reached(self.deadline, now) {
                    motor.start_move(Direction::Up, now);
                    self.phase = TargetPhase::MovingUp;
                }
            }
            TargetPhase::HoldUp => {
                if deadline_reached(self.deadline, now) {
                    self.tally.reset();
                    self.phase = TargetPhase::ReadyUp;
                }
            }
            TargetPhase::MovingDown | TargetPhase::MovingUp => {}
        }

        PhaseReport {
            transition: (from != self.phase).then_some((from, self.phase)),
            hit,
        }
    }

    fn on_edges(&mut self, now: Millis, edges: EdgeSet, motor: &mut MotorRamp) -> Option<HitReport> {
        if edges.head() {
            self.descend(now, motor);
            Some(HitReport::Head)
        } else if edges.body() {
            if self.tally.record_body() >= self.timing.body_hits_to_descend {
                self.descend(now, motor);
                Some(HitReport::BodyTwice)
            } else {
                Some(HitReport::BodyOnce)
            }
        } else {
            None
        }
    }

    fn descend(&mut self, now: Millis, motor: &mut MotorRamp) {
        self.tally.reset();
        motor.start_move(Direction::Down, now);
        self.phase = TargetPhase::MovingDown;
    }

    fn enter_hold(&mut self, phase: TargetPhase, now: Millis, hold_ms: u32) {
        self.phase = phase;
        self.deadline = deadline_after(now, hold_ms);
    }
}
