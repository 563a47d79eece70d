//! Mannequin target firmware
//!
//! Main firmware binary for the RP2040 motorized target board. The target
//! retracts on a head hit or a second body hit, waits, redeploys, and
//! relays every hit it acts on to the scoring controller.
//!
//! Board wiring:
//!
//! | Signal          | GPIO | Notes                          |
//! |-----------------|------|--------------------------------|
//! | DETECT_1        | 3    | body sensor A, pull-down       |
//! | DETECT_2        | 4    | head sensor, pull-down         |
//! | DETECT_3        | 5    | body sensor B, pull-down       |
//! | MNQ_DIR         | 8    | high = down                    |
//! | MNQ_PWM         | 9    | 16 kHz, 8-bit wrap             |
//! | HIT_1..HIT_3    | 12-14| relay outputs, active high     |
//! | LIMIT_SW_TOP    | 15   | ends a descent, pull-up        |
//! | LIMIT_SW_UNDER  | 16   | ends an ascent, pull-up        |
//! | LED             | 25   | start-up signal and indicator  |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::types::U12F4;
use {defmt_rtt as _, panic_probe as _};

use mannequin_core::config::{TargetConfig, MAX_LEVEL};
use mannequin_core::signal::EdgeChannel;
use mannequin_core::TargetController;
use mannequin_drivers::motor::DcMotorOutput;
use mannequin_drivers::relay::RelayConfig;
use mannequin_drivers::sensor::ConfirmConfig;

mod channels;
mod tasks;

/// Motor PWM frequency
const PWM_FREQ_HZ: u32 = 16_000;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Mannequin firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = TargetConfig::default();
    let controller = unwrap!(TargetController::new(config));
    info!("Configuration: {:?}", config);

    // Motor: direction + PWM on slice 4 channel B
    let dir_pin = Output::new(p.PIN_8, Level::Low);

    let mut pwm_config = PwmConfig::default();
    pwm_config.top = MAX_LEVEL as u16;
    pwm_config.compare_b = 0;
    let divider = clk_sys_freq() as f32 / ((MAX_LEVEL as f32 + 1.0) * PWM_FREQ_HZ as f32);
    pwm_config.divider = U12F4::from_num(divider);

    let pwm = Pwm::new_output_b(p.PWM_SLICE4, p.PIN_9, pwm_config);
    let (_, pwm_b) = pwm.split();
    let pwm_b = unwrap!(pwm_b);
    let motor = DcMotorOutput::new(dir_pin, pwm_b, config.ramp.max_level);

    info!("Motor PWM initialized ({} Hz, divider {})", PWM_FREQ_HZ, divider);

    let pins = tasks::ControlPins {
        motor,
        limit_top: Input::new(p.PIN_15, Pull::Up),
        limit_under: Input::new(p.PIN_16, Pull::Up),
        led: Output::new(p.PIN_25, Level::Low),
    };

    let hit_lines = [
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
    ];

    let confirm = ConfirmConfig::default();
    let detect_1 = Input::new(p.PIN_3, Pull::Down);
    let detect_2 = Input::new(p.PIN_4, Pull::Down);
    let detect_3 = Input::new(p.PIN_5, Pull::Down);

    // Spawn tasks
    spawner
        .spawn(tasks::detect_task(detect_1, EdgeChannel::BodyA, confirm))
        .unwrap();
    spawner
        .spawn(tasks::detect_task(detect_2, EdgeChannel::Head, confirm))
        .unwrap();
    spawner
        .spawn(tasks::detect_task(detect_3, EdgeChannel::BodyB, confirm))
        .unwrap();
    spawner
        .spawn(tasks::relay_task(hit_lines, RelayConfig::default()))
        .unwrap();
    spawner.spawn(tasks::control_task(controller, pins)).unwrap();

    info!("All tasks spawned, firmware running");
}
