//! Pump control task
//!
//! Runs the controller's polling loop: one command and one scheduler tick per
//! iteration. The ticker only paces iterations; step durations are measured
//! against the millisecond clock inside the controller.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::PwmOutput;
use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_time::{Duration, Instant, Ticker};

use pumpstep_core::{CommandError, PollOutcome, PumpController};
use pumpstep_drivers::{DcPump, PumpBank};

use crate::transport::SerialTransport;
use crate::PUMP_COUNT;

/// Loop interval in milliseconds
pub const CONTROL_INTERVAL_MS: u64 = 1;

/// One pump channel on the board
pub type Pump = DcPump<PwmOutput<'static>, Output<'static>>;

/// All pump channels
pub type Pumps = PumpBank<PwmOutput<'static>, Output<'static>, PUMP_COUNT>;

/// Serial link to the host
pub type HostLink = SerialTransport<BufferedUartRx, BufferedUartTx>;

pub type Controller = PumpController<Pumps, HostLink, PUMP_COUNT>;

/// Control task - owns the controller and polls it every millisecond
#[embassy_executor::task]
pub async fn control_task(mut controller: Controller) {
    info!("Control task started");

    controller.start();
    info!("All pumps stopped, ready message sent");

    let mut ticker = Ticker::every(Duration::from_millis(CONTROL_INTERVAL_MS));
    let mut faults = 0;
    let mut dropped = 0;

    loop {
        // Truncation wraps like the controller's millisecond counter
        let now = Instant::now().as_millis() as u32;

        let outcome = controller.poll(now);
        if !outcome.is_idle() {
            log_outcome(&outcome, &controller);
        }

        let driver_faults = controller.driver().faults();
        if driver_faults != faults {
            warn!("Pump driver write failed ({} total)", driver_faults);
            faults = driver_faults;
        }

        let dropped_frames = controller.transport().dropped_frames();
        if dropped_frames != dropped {
            debug!("{} malformed frames dropped so far", dropped_frames);
            dropped = dropped_frames;
        }

        ticker.next().await;
    }
}

/// Log what one poll did
fn log_outcome(outcome: &PollOutcome, controller: &Controller) {
    match outcome.command {
        Some(Ok(command)) => debug!("Command {:?} handled", command),
        Some(Err(CommandError::Busy)) => warn!("Step rejected: a channel is still running"),
        Some(Err(e)) => warn!("Command rejected: {:?}", e),
        None => {}
    }

    if outcome.tick.completed > 0 {
        info!(
            "{} step(s) completed ({} since startup)",
            outcome.tick.completed,
            controller.completed_steps()
        );
    }
    if outcome.tick.settled > 0 {
        trace!("{} channel(s) back to idle", outcome.tick.settled);
    }

    let status = controller.status();
    trace!("Group running={} done={}", status.running, status.done);
}
