//! DC motor output with PWM speed control
//!
//! Puts a [`MotorOutput`] on an H-bridge: the direction pin selects travel
//! (high = down) and the PWM duty is `level / max_level` of the channel's
//! full scale. The ramp itself lives in the core; this driver only writes
//! the pins, and only when the output actually changes.
//!
//! ```ignore
//! let mut motor = DcMotorOutput::new(dir_pin, pwm, MAX_LEVEL);
//!
//! // Every control tick:
//! motor.apply(report.output)?;
//! ```

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;

use mannequin_core::traits::{MotorDrive, MotorError, MotorOutput};

/// DC motor driven by a direction pin and one PWM channel
pub struct DcMotorOutput<D, P> {
    dir: D,
    pwm: P,
    max_level: u8,
    /// Last output successfully written
    last: Option<MotorOutput>,
}

impl<D: OutputPin, P: SetDutyCycle> DcMotorOutput<D, P> {
    /// Create a new motor output
    ///
    /// `max_level` is the output level that maps to 100% duty.
    pub fn new(dir: D, pwm: P, max_level: u8) -> Self {
        Self {
            dir,
            pwm,
            max_level: max_level.max(1),
            last: None,
        }
    }

    /// Last output written to the pins
    pub fn last(&self) -> Option<MotorOutput> {
        self.last
    }

    /// Release the pins
    pub fn release(self) -> (D, P) {
        (self.dir, self.pwm)
    }
}

impl<D: OutputPin, P: SetDutyCycle> MotorDrive for DcMotorOutput<D, P> {
    fn apply(&mut self, output: MotorOutput) -> Result<(), MotorError> {
        if self.last == Some(output) {
            return Ok(());
        }

        // Direction first: a move always starts at level 0
        self.dir
            .set_state(PinState::from(output.direction.pin_level()))
            .map_err(|_| MotorError::DirectionPin)?;

        let level = output.level.min(self.max_level);
        self.pwm
            .set_duty_cycle_fraction(level as u16, self.max_level as u16)
            .map_err(|_| MotorError::Pwm)?;

        self.last = Some(output);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{self, ErrorKind as PinErrorKind};
    use embedded_hal::pwm::{self, ErrorKind as PwmErrorKind};
    use mannequin_core::traits::Direction;

    #[derive(Default)]
    struct MockPin {
        high: bool,
        writes: u32,
        fail: bool,
    }

    impl digital::ErrorType for MockPin {
        type Error = PinErrorKind;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.set_state(PinState::Low)
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.set_state(PinState::High)
        }

        fn set_state(&mut self, state: PinState) -> Result<(), Self::Error> {
            if self.fail {
                return Err(PinErrorKind::Other);
            }
            self.high = state == PinState::High;
            self.writes += 1;
            Ok(())
        }
    }

    struct MockPwm {
        max: u16,
        duty: u16,
        fail: bool,
    }

    impl MockPwm {
        fn new(max: u16) -> Self {
            Self {
                max,
                duty: 0,
                fail: false,
            }
        }
    }

    impl pwm::ErrorType for MockPwm {
        type Error = PwmErrorKind;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail {
                return Err(PwmErrorKind::Other);
            }
            self.duty = duty;
            Ok(())
        }
    }

    fn out(direction: Direction, level: u8) -> MotorOutput {
        MotorOutput { direction, level }
    }

    #[test]
    fn test_direction_pin_levels() {
        let mut motor = DcMotorOutput::new(MockPin::default(), MockPwm::new(255), 255);

        motor.apply(out(Direction::Down, 0)).unwrap();
        let (dir, pwm) = motor.release();
        assert!(dir.high);
        assert_eq!(pwm.duty, 0);

        let mut motor = DcMotorOutput::new(dir, pwm, 255);
        motor.apply(out(Direction::Up, 10)).unwrap();
        let (dir, _) = motor.release();
        assert!(!dir.high);
    }

    #[test]
    fn test_duty_matches_level_on_8bit_wrap() {
        let mut motor = DcMotorOutput::new(MockPin::default(), MockPwm::new(255), 255);
        motor.apply(out(Direction::Down, 150)).unwrap();
        let (_, pwm) = motor.release();
        assert_eq!(pwm.duty, 150);
    }

    #[test]
    fn test_duty_scales_to_pwm_range() {
        let mut motor = DcMotorOutput::new(MockPin::default(), MockPwm::new(1000), 255);

        motor.apply(out(Direction::Up, 255)).unwrap();
        assert_eq!(motor.pwm.duty, 1000);

        motor.apply(out(Direction::Up, 51)).unwrap();
        assert_eq!(motor.pwm.duty, 200);
    }

    #[test]
    fn test_level_clamped_to_max() {
        let mut motor = DcMotorOutput::new(MockPin::default(), MockPwm::new(100), 200);
        motor.apply(out(Direction::Down, 255)).unwrap();
        assert_eq!(motor.pwm.duty, 100);
    }

    #[test]
    fn test_unchanged_output_not_rewritten() {
        let mut motor = DcMotorOutput::new(MockPin::default(), MockPwm::new(255), 255);
        for _ in 0..10 {
            motor.apply(out(Direction::Down, 150)).unwrap();
        }
        assert_eq!(motor.dir.writes, 1);

        motor.apply(out(Direction::Down, 147)).unwrap();
        assert_eq!(motor.dir.writes, 2);
        assert_eq!(motor.last(), Some(out(Direction::Down, 147)));
    }

    #[test]
    fn test_stop_cuts_duty() {
        let mut motor = DcMotorOutput::new(MockPin::default(), MockPwm::new(255), 255);
        motor.apply(out(Direction::Down, 200)).unwrap();
        motor.stop().unwrap();
        assert_eq!(motor.pwm.duty, 0);
        assert!(!motor.dir.high);
    }

    #[test]
    fn test_pin_errors_are_mapped() {
        let dir = MockPin {
            fail: true,
            ..Default::default()
        };
        let mut motor = DcMotorOutput::new(dir, MockPwm::new(255), 255);
        assert_eq!(
            motor.apply(out(Direction::Down, 10)),
            Err(MotorError::DirectionPin)
        );
        assert_eq!(motor.last(), None);

        let mut pwm = MockPwm::new(255);
        pwm.fail = true;
        let mut motor = DcMotorOutput::new(MockPin::default(), pwm, 255);
        assert_eq!(motor.apply(out(Direction::Down, 10)), Err(MotorError::Pwm));

        // A failed write is retried on the next tick
        motor.pwm.fail = false;
        motor.apply(out(Direction::Down, 10)).unwrap();
        assert_eq!(motor.pwm.duty, 10);
    }
}
