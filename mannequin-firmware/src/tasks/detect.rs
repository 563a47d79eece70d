//! Hit detection task
//!
//! One instance per sensor input. Waits for a rising edge, confirms the
//! input stays high, and raises the channel on the edge bus.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Delay;

use mannequin_core::signal::EdgeChannel;
use mannequin_drivers::sensor::{confirm_high, ConfirmConfig};

use crate::channels::EDGES;

/// Detect task for one sensor channel
#[embassy_executor::task(pool_size = 3)]
pub async fn detect_task(mut pin: Input<'static>, channel: EdgeChannel, config: ConfirmConfig) {
    info!("Detect task started for {:?}", channel);

    let mut delay = Delay;

    loop {
        pin.wait_for_rising_edge().await;

        match confirm_high(&mut pin, &mut delay, &config).await {
            Ok(true) => {
                debug!("Confirmed edge on {:?}", channel);
                EDGES.raise(channel);
            }
            Ok(false) => trace!("Rejected glitch on {:?}", channel),
            Err(e) => match e {},
        }
    }
}
