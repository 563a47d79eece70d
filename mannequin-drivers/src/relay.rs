//! Hit relay outputs
//!
//! Forwards each hit classification to the downstream controller board as
//! a short high pulse on one of three lines. Only one line is ever high.
//!
//! | Hit         | Line  |
//! |-------------|-------|
//! | `BodyOnce`  | HIT_1 |
//! | `BodyTwice` | HIT_2 |
//! | `Head`      | HIT_3 |

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use mannequin_core::state::HitReport;

/// Relay pulse timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayConfig {
    pub pulse_ms: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { pulse_ms: 10 }
    }
}

/// Three-line pulsed hit relay
pub struct HitRelay<P> {
    lines: [P; 3],
    config: RelayConfig,
}

impl<P: OutputPin> HitRelay<P> {
    /// Create the relay from HIT_1, HIT_2 and HIT_3, driving all lines low
    pub fn new(lines: [P; 3], config: RelayConfig) -> Result<Self, P::Error> {
        let mut relay = Self { lines, config };
        relay.all_off()?;
        Ok(relay)
    }

    fn line(hit: HitReport) -> usize {
        match hit {
            HitReport::BodyOnce => 0,
            HitReport::BodyTwice => 1,
            HitReport::Head => 2,
        }
    }

    /// Drive every line low
    pub fn all_off(&mut self) -> Result<(), P::Error> {
        for line in self.lines.iter_mut() {
            line.set_low()?;
        }
        Ok(())
    }

    /// Pulse the line for `hit`, then return all lines low
    pub async fn pulse<D: DelayNs>(&mut self, hit: HitReport, delay: &mut D) -> Result<(), P::Error> {
        let active = Self::line(hit);
        for (idx, line) in self.lines.iter_mut().enumerate() {
            if idx == active {
                line.set_high()?;
            } else {
                line.set_low()?;
            }
        }

        delay.delay_ms(self.config.pulse_ms).await;
        self.all_off()
    }
}
