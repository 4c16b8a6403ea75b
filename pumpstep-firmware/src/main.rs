//! PumpStep - Pump Controller Firmware
//!
//! Main firmware binary for RP2040-based pump controllers. The host drives
//! three DC pumps over a serial link with timed multi-channel steps.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm, PwmOutput};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pumpstep_core::config::ControllerConfig;
use pumpstep_core::traits::ChannelId;
use pumpstep_core::PumpController;
use pumpstep_drivers::{DcPump, PumpBank};

use crate::tasks::Pump;
use crate::transport::SerialTransport;

mod config;
mod tasks;
mod transport;

/// Pump channels wired on the board
pub const PUMP_COUNT: usize = 3;

/// PWM counter top (duty range 0..=4095)
const PWM_TOP: u16 = 4095;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PumpStep firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load(PUMP_COUNT);

    // Host UART (UART0: TX=GPIO0, RX=GPIO1)
    let uart_config = UartConfig::default(); // 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    let transport = SerialTransport::new(rx, tx);
    info!("Host UART initialized");

    // Pump outputs (DF4 driver board): PWM on channel A of each slice
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;
    pwm_config.compare_a = 0;

    let pumps = [
        pump(
            Pwm::new_output_a(p.PWM_SLICE4, p.PIN_8, pwm_config.clone()),
            Output::new(p.PIN_9, Level::Low),
            &config,
            0,
        ),
        pump(
            Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config.clone()),
            Output::new(p.PIN_21, Level::Low),
            &config,
            1,
        ),
        pump(
            Pwm::new_output_a(p.PWM_SLICE5, p.PIN_10, pwm_config),
            Output::new(p.PIN_13, Level::Low),
            &config,
            2,
        ),
    ];
    info!("{} pumps initialized", PUMP_COUNT);

    let controller = unwrap!(PumpController::new(
        &config,
        PumpBank::new(pumps),
        transport
    ));

    spawner.spawn(tasks::control_task(controller)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Build one pump channel from a PWM slice and its direction pin
fn pump(pwm: Pwm<'static>, dir: Output<'static>, config: &ControllerConfig, index: u8) -> Pump {
    let invert = config
        .channel(ChannelId(index))
        .is_some_and(|channel| channel.invert_direction);

    match DcPump::new(channel_a(pwm), dir, config.max_speed, invert) {
        Ok(pump) => pump,
        Err(e) => defmt::panic!("Pump {} init failed: {}", index, Debug2Format(&e)),
    }
}

/// Take channel A of a PWM slice as an embedded-hal output
fn channel_a(pwm: Pwm<'static>) -> PwmOutput<'static> {
    match pwm.split() {
        (Some(output), _) => output,
        _ => defmt::panic!("PWM slice has no channel A output"),
    }
}
