//! Limit switch tracking
//!
//! Both endstops are wired active-low with pull-ups; callers invert the raw
//! level so that `true` means closed. The tracker keeps a latched belief of
//! where the target sits and reports a trigger only on the tick where a
//! switch closes against that belief, so a switch that stays closed can't
//! re-trigger.
//!
//! Which switch terminates which travel follows the board wiring: a
//! descent ends on the top switch, an ascent on the under switch.

use crate::traits::Direction;

/// Endstop identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Endstop {
    /// LIMIT_SW_TOP
    Top,
    /// LIMIT_SW_UNDER
    Under,
}

impl Endstop {
    /// The switch that ends travel in `dir`
    pub fn terminating(dir: Direction) -> Self {
        match dir {
            Direction::Down => Endstop::Top,
            Direction::Up => Endstop::Under,
        }
    }
}

/// Sampled switch levels for one tick (`true` = closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EndstopLevels {
    pub top: bool,
    pub under: bool,
}

impl EndstopLevels {
    /// Build from raw active-low pin levels
    pub fn from_raw(top_high: bool, under_high: bool) -> Self {
        Self {
            top: !top_high,
            under: !under_high,
        }
    }

    pub fn is_closed(&self, endstop: Endstop) -> bool {
        match endstop {
            Endstop::Top => self.top,
            Endstop::Under => self.under,
        }
    }

    /// Both switches closed at once
    pub fn conflicting(&self) -> bool {
        self.top && self.under
    }
}

/// Where the tracker believes the target sits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LimitBelief {
    PositionedUp,
    PositionedDown,
}

/// Tracker output for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LimitSnapshot {
    /// Levels sampled this tick
    pub levels: EndstopLevels,
    /// Belief after this tick
    pub belief: LimitBelief,
    /// Switch whose closure changed the belief this tick
    pub triggered: Option<Endstop>,
}

impl LimitSnapshot {
    /// Whether the switch that ends travel in `dir` is closed
    pub fn end_reached(&self, dir: Direction) -> bool {
        self.levels.is_closed(Endstop::terminating(dir))
    }
}

/// Limit switch tracker
#[derive(Debug, Clone)]
pub struct LimitTracker {
    /// Top switch already honored
    up_stop: bool,
    /// Under switch already honored
    down_stop: bool,
    belief: LimitBelief,
}

impl Default for LimitTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LimitTracker {
    /// Create a tracker that believes the target starts at the top
    pub fn new() -> Self {
        Self {
            up_stop: true,
            down_stop: false,
            belief: LimitBelief::PositionedUp,
        }
    }

    pub fn belief(&self) -> LimitBelief {
        self.belief
    }

    pub fn positioned_up(&self) -> bool {
        self.belief == LimitBelief::PositionedUp
    }

    pub fn positioned_down(&self) -> bool {
        self.belief == LimitBelief::PositionedDown
    }

    /// Reduce this tick's switch levels into the latched belief
    ///
    /// The top switch is checked first; the under switch is only looked at
    /// while the top switch is open.
    pub fn update(&mut self, levels: EndstopLevels) -> LimitSnapshot {
        let mut triggered = None;

        if levels.top {
            if !self.up_stop && self.down_stop {
                self.belief = LimitBelief::PositionedUp;
                self.up_stop = true;
                self.down_stop = false;
                triggered = Some(Endstop::Top);
            }
        } else if levels.under && self.up_stop && !self.down_stop {
            self.belief = LimitBelief::PositionedDown;
            self.up_stop = false;
            self.down_stop = true;
            triggered = Some(Endstop::Under);
        }

        LimitSnapshot {
            levels,
            belief: self.belief,
            triggered,
        }
    }
}
