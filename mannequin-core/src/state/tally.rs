//! Consecutive body-hit counter

/// Count of body hits seen while armed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShotTally {
    count: u8,
}

impl ShotTally {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Record one body hit and return the new count
    pub fn record_body(&mut self) -> u8 {
        self.count = self.count.saturating_add(1);
        self.count
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
