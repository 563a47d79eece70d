//! Control tick task
//!
//! Owns the controller context and every pin it reads or drives. Plays the
//! start-up signal, commands the boot descent, then runs one controller tick
//! per millisecond and logs what the tick reports.

use defmt::*;
use embassy_rp::gpio::{Input, Level, Output};
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Duration, Instant, Ticker, Timer};

use mannequin_core::config::TICK_PERIOD_MS;
use mannequin_core::motion::{EndstopLevels, RampStage};
use mannequin_core::time::Millis;
use mannequin_core::traits::MotorDrive;
use mannequin_core::TargetController;
use mannequin_drivers::motor::DcMotorOutput;

use crate::channels::{EDGES, HIT_CHANNEL};

/// Start-up signal LED on time
const START_SIGNAL_ON_MS: u64 = 3000;
/// Pause with the LED off before the first move
const START_SIGNAL_OFF_MS: u64 = 1000;

/// Pins owned by the control tick
pub struct ControlPins {
    pub motor: DcMotorOutput<Output<'static>, PwmOutput<'static>>,
    /// LIMIT_SW_TOP, active low
    pub limit_top: Input<'static>,
    /// LIMIT_SW_UNDER, active low
    pub limit_under: Input<'static>,
    pub led: Output<'static>,
}

fn now_ms() -> Millis {
    // Truncation wraps; every consumer compares wrap-safe
    Instant::now().as_millis() as Millis
}

async fn start_signal(led: &mut Output<'static>) {
    led.set_high();
    Timer::after_millis(START_SIGNAL_ON_MS).await;
    led.set_low();
    Timer::after_millis(START_SIGNAL_OFF_MS).await;
}

/// Control task - 1 ms tick loop
#[embassy_executor::task]
pub async fn control_task(mut controller: TargetController, mut pins: ControlPins) {
    info!("Control task started");

    if let Err(e) = pins.motor.stop() {
        error!("Motor output failed: {:?}", e);
    }

    start_signal(&mut pins.led).await;

    controller.begin(now_ms());
    info!("Start-up complete, target moving down");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_PERIOD_MS as u64));
    let mut last_stage = RampStage::Idle;

    loop {
        ticker.next().await;

        let now = now_ms();
        let levels = EndstopLevels::from_raw(pins.limit_top.is_high(), pins.limit_under.is_high());
        let report = controller.tick(now, levels, &EDGES);

        if let Err(e) = pins.motor.apply(report.output) {
            error!("Motor output failed: {:?}", e);
        }
        pins.led.set_level(Level::from(report.indicator));

        if report.stage != last_stage {
            trace!(
                "Motor {:?} -> {:?} (level {})",
                last_stage,
                report.stage,
                report.output.level
            );
            last_stage = report.stage;
        }

        if let Some(endstop) = report.endstop {
            debug!(
                "Endstop {:?} closed, belief {:?}",
                endstop,
                controller.limits().belief()
            );
        }

        if let Some((from, to)) = report.transition {
            info!("Phase {:?} -> {:?}", from, to);
        }

        if let Some(hit) = report.hit {
            debug!("Hit {:?}, tally {}", hit, controller.tally());
            if HIT_CHANNEL.try_send(hit).is_err() {
                warn!("Relay queue full, dropping {:?}", hit);
            }
        }

        if let Some(fault) = report.fault {
            error!(
                "Fault latched in {:?}: {:?}, power cycle required",
                controller.phase(),
                fault
            );
        }
    }
}
