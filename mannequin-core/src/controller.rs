//! Control tick context
//!
//! [`TargetController`] owns every piece of mutable control state and runs
//! one tick in a fixed order: limit tracker, fault monitor, motor ramp, edge
//! drain, phase coordinator. Each step reads what the previous one produced
//! during the same tick.

use crate::config::{ConfigError, TargetConfig};
use crate::motion::limits::{Endstop, EndstopLevels, LimitTracker};
use crate::motion::ramp::{MotorEvent, MotorRamp, RampStage};
use crate::safety::{FaultKind, FaultMonitor, SafetyStatus};
use crate::signal::EdgeBus;
use crate::state::phase::{HitReport, PhaseCoordinator, TargetPhase};
use crate::time::Millis;
use crate::traits::MotorOutput;

/// Indicator blink half-period while a fault is latched
pub const FAULT_BLINK_MS: u32 = 250;

/// Everything the firmware needs to act on after one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Direction and level to put on the motor driver
    pub output: MotorOutput,
    /// Ramp stage after this tick
    pub stage: RampStage,
    /// Endstop whose closure moved the position belief this tick
    pub endstop: Option<Endstop>,
    /// Indicator LED level
    pub indicator: bool,
    /// Move that finished this tick
    pub motor_event: Option<MotorEvent>,
    /// Phase change this tick
    pub transition: Option<(TargetPhase, TargetPhase)>,
    /// Hit acted upon this tick
    pub hit: Option<HitReport>,
    /// Fault latched this tick
    pub fault: Option<FaultKind>,
}

/// Controller context
#[derive(Debug, Clone)]
pub struct TargetController {
    limits: LimitTracker,
    motor: MotorRamp,
    phase: PhaseCoordinator,
    monitor: FaultMonitor,
    fault: Option<FaultKind>,
}

impl TargetController {
    /// Create a controller from a validated configuration
    pub fn new(config: TargetConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            limits: LimitTracker::new(),
            motor: MotorRamp::new(config.ramp),
            phase: PhaseCoordinator::new(config.timing),
            monitor: FaultMonitor::new(config.safety),
            fault: None,
        })
    }

    /// Command the boot descent
    pub fn begin(&mut self, now: Millis) {
        if self.fault.is_none() {
            self.phase.begin(now, &mut self.motor);
        }
    }

    pub fn phase(&self) -> TargetPhase {
        self.phase.phase()
    }

    pub fn tally(&self) -> u8 {
        self.phase.tally()
    }

    pub fn motor(&self) -> &MotorRamp {
        &self.motor
    }

    pub fn limits(&self) -> &LimitTracker {
        &self.limits
    }

    /// Latched fault, if any
    pub fn fault(&self) -> Option<FaultKind> {
        self.fault
    }

    /// Run one control tick
    ///
    /// `levels` are this tick's endstop levels (`true` = closed). Pending
    /// edges are always drained from `bus`; they only count while armed.
    pub fn tick(&mut self, now: Millis, levels: EndstopLevels, bus: &EdgeBus) -> TickReport {
        let mut raised = None;

        let snapshot = self.limits.update(levels);

        if let SafetyStatus::Fault(kind) = self.monitor.update(now, levels, self.motor.is_moving()) {
            if self.fault.is_none() {
                self.motor.abort(kind, now);
                self.fault = Some(kind);
                raised = Some(kind);
            }
        }

        let motor_event = self.motor.update(now, &snapshot);
        if let Some(MotorEvent::Faulted(_, kind)) = motor_event {
            if self.fault.is_none() {
                self.fault = Some(kind);
                raised = Some(kind);
            }
        }

        let edges = bus.drain();

        let (transition, hit) = if self.fault.is_none() {
            let report = self.phase.update(now, motor_event, edges, &mut self.motor);
            (report.transition, report.hit)
        } else {
            (None, None)
        };

        TickReport {
            output: self.motor.output(),
            stage: self.motor.stage(),
            endstop: snapshot.triggered,
            indicator: self.indicator(now),
            motor_event,
            transition,
            hit,
            fault: raised,
        }
    }

    fn indicator(&self, now: Millis) -> bool {
        match self.fault {
            Some(_) => (now / FAULT_BLINK_MS) % 2 == 0,
            None => self.phase.phase().indicator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::EdgeChannel;
    use crate::traits::Direction;
    use proptest::prelude::*;

    /// Ticks spent in cruise before the simulated carriage reaches its endstop
    const TRAVEL_IN_CRUISE: u32 = 30;

    /// Simulated mechanism: the terminating switch closes a while after the
    /// motor settles into cruise and opens again when a new move starts
    #[derive(Default)]
    struct Rig {
        closed: Option<Endstop>,
        cruise_ticks: u32,
    }

    impl Rig {
        fn levels(&self) -> EndstopLevels {
            EndstopLevels {
                top: self.closed == Some(Endstop::Top),
                under: self.closed == Some(Endstop::Under),
            }
        }

        fn follow(&mut self, motor: &MotorRamp) {
            match motor.stage() {
                RampStage::RampUp => {
                    self.closed = None;
                    self.cruise_ticks = 0;
                }
                RampStage::Cruise => {
                    self.cruise_ticks += 1;
                    if self.cruise_ticks >= TRAVEL_IN_CRUISE {
                        self.closed = Some(Endstop::terminating(motor.direction()));
                    }
                }
                _ => {}
            }
        }
    }

    struct Bench {
        ctl: TargetController,
        rig: Rig,
        bus: EdgeBus,
        now: Millis,
        transitions: Vec<(TargetPhase, TargetPhase)>,
    }

    impl Bench {
        fn new() -> Self {
            let mut ctl = TargetController::new(TargetConfig::default()).unwrap();
            ctl.begin(0);
            Self {
                ctl,
                rig: Rig::default(),
                bus: EdgeBus::new(),
                now: 0,
                transitions: Vec::new(),
            }
        }

        fn step(&mut self) -> TickReport {
            self.now += 1;
            let report = self.ctl.tick(self.now, self.rig.levels(), &self.bus);
            self.rig.follow(self.ctl.motor());
            if let Some(t) = report.transition {
                self.transitions.push(t);
            }
            report
        }

        /// Tick until the phase is `phase`, at most `limit` ticks
        fn run_until(&mut self, phase: TargetPhase, limit: u32) {
            for _ in 0..limit {
                if self.ctl.phase() == phase {
                    return;
                }
                self.step();
            }
            assert_eq!(self.ctl.phase(), phase, "timed out at {}", self.now);
        }

        fn armed() -> Self {
            let mut bench = Self::new();
            bench.run_until(TargetPhase::ReadyUp, 20_000);
            bench.transitions.clear();
            bench
        }

        fn hit(&mut self, channel: EdgeChannel) -> TickReport {
            self.bus.raise(channel);
            self.step()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = TargetConfig::default();
        config.timing.body_hits_to_descend = 0;
        assert_eq!(
            TargetController::new(config).unwrap_err(),
            ConfigError::ZeroBodyThreshold
        );
    }

    #[test]
    fn test_boot_descends_then_arms() {
        let mut bench = Bench::new();
        assert_eq!(bench.ctl.phase(), TargetPhase::MovingDown);
        assert_eq!(bench.ctl.motor().direction(), Direction::Down);

        bench.run_until(TargetPhase::ReadyUp, 20_000);
        assert_eq!(
            bench.transitions,
            [
                (TargetPhase::MovingDown, TargetPhase::HoldDown),
                (TargetPhase::HoldDown, TargetPhase::MovingUp),
                (TargetPhase::MovingUp, TargetPhase::HoldUp),
                (TargetPhase::HoldUp, TargetPhase::ReadyUp),
            ]
        );
        assert!(bench.ctl.fault().is_none());
    }

    #[test]
    fn test_endstop_stop_enters_hold_down() {
        let mut bench = Bench::new();
        let mut braking_from = None;
        loop {
            let report = bench.step();
            if report.stage == RampStage::RampToStop && braking_from.is_none() {
                braking_from = Some(bench.now);
            }
            if report.motor_event.is_some() {
                assert_eq!(report.motor_event, Some(MotorEvent::Completed(Direction::Down)));
                assert_eq!(
                    report.transition,
                    Some((TargetPhase::MovingDown, TargetPhase::HoldDown))
                );
                break;
            }
        }
        // Cruise level 150 at 3 per ms
        assert_eq!(bench.now - braking_from.unwrap(), 50);
        assert_eq!(bench.ctl.phase.deadline(), Some(bench.now + 3000));
        assert_eq!(bench.ctl.tally(), 0);
    }

    #[test]
    fn test_full_cycle_returns_to_ready() {
        let mut bench = Bench::armed();
        bench.hit(EdgeChannel::BodyA);
        assert_eq!(bench.ctl.tally(), 1);

        let report = bench.hit(EdgeChannel::Head);
        assert_eq!(report.hit, Some(HitReport::Head));
        assert_eq!(bench.ctl.tally(), 0);

        bench.run_until(TargetPhase::ReadyUp, 20_000);
        assert_eq!(
            bench.transitions,
            [
                (TargetPhase::ReadyUp, TargetPhase::MovingDown),
                (TargetPhase::MovingDown, TargetPhase::HoldDown),
                (TargetPhase::HoldDown, TargetPhase::MovingUp),
                (TargetPhase::MovingUp, TargetPhase::HoldUp),
                (TargetPhase::HoldUp, TargetPhase::ReadyUp),
            ]
        );
        assert_eq!(bench.ctl.tally(), 0);
        assert_eq!(bench.ctl.motor().stage(), RampStage::Idle);
    }

    #[test]
    fn test_two_body_hits_retract() {
        let mut bench = Bench::armed();
        let first = bench.hit(EdgeChannel::BodyB);
        assert_eq!(first.hit, Some(HitReport::BodyOnce));
        assert_eq!(first.stage, RampStage::Idle);

        let second = bench.hit(EdgeChannel::BodyA);
        assert_eq!(second.hit, Some(HitReport::BodyTwice));
        assert_eq!(bench.ctl.phase(), TargetPhase::MovingDown);
        assert_eq!(second.stage, RampStage::RampUp);
        assert_eq!(second.output.direction, Direction::Down);
        assert_eq!(second.output.level, 0);
    }

    #[test]
    fn test_edges_discarded_outside_ready() {
        let mut bench = Bench::new();
        bench.run_until(TargetPhase::HoldDown, 20_000);
        for channel in EdgeChannel::ALL {
            bench.bus.raise(channel);
        }
        let report = bench.step();
        assert_eq!(report.hit, None);
        assert!(bench.bus.peek().is_empty());
        assert_eq!(bench.ctl.tally(), 0);
        assert_eq!(bench.ctl.phase(), TargetPhase::HoldDown);
    }

    #[test]
    fn test_indicator_follows_phase() {
        let mut bench = Bench::new();
        assert!(bench.step().indicator);
        bench.run_until(TargetPhase::HoldDown, 20_000);
        assert!(!bench.step().indicator);
        bench.run_until(TargetPhase::MovingUp, 20_000);
        assert!(!bench.step().indicator);
        bench.run_until(TargetPhase::HoldUp, 20_000);
        assert!(bench.step().indicator);
    }

    #[test]
    fn test_missing_endstop_times_out() {
        let mut ctl = TargetController::new(TargetConfig::default()).unwrap();
        let bus = EdgeBus::new();
        ctl.begin(0);

        let open = EndstopLevels::default();
        let mut raised = None;
        for now in 1..=6000 {
            let report = ctl.tick(now, open, &bus);
            if report.fault.is_some() {
                raised = Some((now, report));
            }
        }
        // Cruise from 956, timeout 4000 ms, then 50 ms of braking
        let (at, report) = raised.unwrap();
        assert_eq!(at, 5006);
        assert_eq!(report.fault, Some(FaultKind::EndstopTimeout));
        assert_eq!(
            report.motor_event,
            Some(MotorEvent::Faulted(Direction::Down, FaultKind::EndstopTimeout))
        );
        assert_eq!(ctl.fault(), Some(FaultKind::EndstopTimeout));
        assert_eq!(ctl.phase(), TargetPhase::MovingDown);
        assert!(!ctl.motor().is_moving());
    }

    #[test]
    fn test_conflict_latches_and_stays_stopped() {
        let mut ctl = TargetController::new(TargetConfig::default()).unwrap();
        let bus = EdgeBus::new();
        ctl.begin(0);

        let both = EndstopLevels {
            top: true,
            under: true,
        };
        for now in 1..=20 {
            assert_eq!(ctl.tick(now, both, &bus).fault, None);
        }
        let report = ctl.tick(21, both, &bus);
        assert_eq!(report.fault, Some(FaultKind::EndstopConflict));
        assert_eq!(report.stage, RampStage::RampToStop);

        let open = EndstopLevels::default();
        for now in 22..10_000 {
            bus.raise(EdgeChannel::Head);
            let report = ctl.tick(now, open, &bus);
            assert_eq!(report.fault, None);
            assert_eq!(report.hit, None);
            assert_eq!(report.transition, None);
        }
        assert_eq!(ctl.fault(), Some(FaultKind::EndstopConflict));
        assert_eq!(ctl.motor().stage(), RampStage::Idle);
        assert_eq!(ctl.phase(), TargetPhase::MovingDown);

        // Blinks while latched
        assert!(ctl.tick(10_000, open, &bus).indicator);
        assert!(!ctl.tick(10_250, open, &bus).indicator);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Random hit traffic never produces a transition outside the cycle
        /// and is only acted upon while armed
        #[test]
        fn prop_phase_cycle_only_moves_forward(
            hits in prop::collection::vec((0u32..16_000, 1u8..8), 0..24),
        ) {
            let mut bench = Bench::new();
            for _ in 0..16_000 {
                let tick = bench.now;
                for &(at, mask) in &hits {
                    if at == tick {
                        for (i, channel) in EdgeChannel::ALL.into_iter().enumerate() {
                            if mask & (1 << i) != 0 {
                                bench.bus.raise(channel);
                            }
                        }
                    }
                }

                let before = bench.ctl.phase();
                let tally_before = bench.ctl.tally();
                let report = bench.step();

                if let Some((from, to)) = report.transition {
                    prop_assert_eq!(from, before);
                    prop_assert_eq!(to, from.next());
                }
                if before != TargetPhase::ReadyUp {
                    prop_assert_eq!(report.hit, None);
                    if report.transition.is_none() {
                        prop_assert_eq!(bench.ctl.tally(), tally_before);
                    }
                }
                prop_assert!(bench.bus.peek().is_empty());
                prop_assert!(bench.ctl.fault().is_none());
            }
        }
    }
}
