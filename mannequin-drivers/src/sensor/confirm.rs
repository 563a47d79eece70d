//! Rising-edge confirmation
//!
//! Hit sensors glitch on motor noise and mechanical shock. A captured rising
//! edge only counts once the input has stayed high for a run of samples.
//! The same routine serves every detect channel.

use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;

/// Sampling used to confirm an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfirmConfig {
    /// Samples that must read high after the initial read
    pub samples: u8,
    /// Spacing between samples
    pub interval_ms: u32,
}

impl Default for ConfirmConfig {
    fn default() -> Self {
        Self {
            samples: 5,
            interval_ms: 1,
        }
    }
}

/// Confirm that `pin` is holding high
///
/// Reads the pin once, then `samples` more times spaced `interval_ms`
/// apart. Returns `Ok(false)` on the first low read.
pub async fn confirm_high<P, D>(
    pin: &mut P,
    delay: &mut D,
    config: &ConfirmConfig,
) -> Result<bool, P::Error>
where
    P: InputPin,
    D: DelayNs,
{
    if pin.is_low()? {
        return Ok(false);
    }

    for _ in 0..config.samples {
        delay.delay_ms(config.interval_ms).await;
        if pin.is_low()? {
            return Ok(false);
        }
    }

    Ok(true)
}
