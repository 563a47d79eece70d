//! Hit relay task
//!
//! Forwards hit reports from the control tick to the downstream controller
//! as pulses on HIT_1..HIT_3. Runs apart from the control tick so the pulse
//! width never stalls the motor ramp.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Delay;

use mannequin_drivers::relay::{HitRelay, RelayConfig};

use crate::channels::HIT_CHANNEL;

/// Relay task
#[embassy_executor::task]
pub async fn relay_task(lines: [Output<'static>; 3], config: RelayConfig) {
    info!("Relay task started");

    let mut delay = Delay;
    let mut relay = match HitRelay::new(lines, config) {
        Ok(relay) => relay,
        Err(e) => match e {},
    };

    loop {
        let hit = HIT_CHANNEL.receive().await;
        debug!("Relaying {:?}", hit);
        if let Err(e) = relay.pulse(hit, &mut delay).await {
            match e {}
        }
    }
}
