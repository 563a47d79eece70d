//! Motor driver trait
//!
//! The ramp controller produces a [`MotorOutput`] every tick; a
//! [`MotorDrive`] implementation puts it on the direction pin and PWM.

/// Direction of target travel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Retract the target (direction pin high)
    Down,
    /// Redeploy the target (direction pin low)
    Up,
}

impl Direction {
    /// Level of the direction pin for this direction
    pub fn pin_level(self) -> bool {
        matches!(self, Direction::Down)
    }
}

/// Motor command for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorOutput {
    pub direction: Direction,
    /// Duty level, 0..=max_level
    pub level: u8,
}

impl MotorOutput {
    /// Motor off, direction pin low
    pub const OFF: MotorOutput = MotorOutput {
        direction: Direction::Up,
        level: 0,
    };
}

/// Errors that can occur while driving the motor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Direction pin could not be written
    DirectionPin,
    /// PWM duty could not be set
    Pwm,
}

/// Trait for a direction + duty motor driver
pub trait MotorDrive {
    /// Apply the direction and level for this tick
    fn apply(&mut self, output: MotorOutput) -> Result<(), MotorError>;

    /// Cut the motor
    fn stop(&mut self) -> Result<(), MotorError> {
        self.apply(MotorOutput::OFF)
    }
}
