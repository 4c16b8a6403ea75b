//! Host command handler
//!
//! Validates and dispatches one framed command against the channel group.
//! Every command gets exactly one response message.
//!
//! Step is the only command subject to the busy guard: while any channel is
//! still timing a step, a new Step is drained and answered with
//! `Error("busy")`. Otherwise all channel requests are decoded first and only
//! then applied, so a Step either updates the whole group or nothing.

pub mod step;

use heapless::String;
use pumpstep_protocol::{CommandId, DeviceMessage, Frame};

use crate::channel::{ChannelEvent, ChannelGroup, Millis};
use crate::config::{ControllerConfig, MAX_TEXT_LEN};
use crate::error::CommandError;
use crate::traits::{ActuatorDriver, Transport};

pub use step::{decode_step, drain_step};

/// Acknowledge text for an accepted Step
pub const STEP_ACK: &str = "Step";

/// Acknowledge text for Stop
pub const STOP_ACK: &str = "Stopped";

/// Command handler
#[derive(Debug, Clone)]
pub struct CommandHandler {
    device_id: String<MAX_TEXT_LEN>,
    max_speed: u16,
}

impl CommandHandler {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            device_id: config.device_id.clone(),
            max_speed: config.max_speed,
        }
    }

    /// Handle one frame and send its response
    ///
    /// Errors have already been reported to the host when this returns; the
    /// result only tells the caller what happened.
    pub fn dispatch<D, T, const N: usize>(
        &self,
        frame: &Frame,
        group: &mut ChannelGroup<N>,
        now: Millis,
        driver: &mut D,
        transport: &mut T,
    ) -> Result<CommandId, CommandError>
    where
        D: ActuatorDriver,
        T: Transport,
    {
        let result = self.handle(frame, group, now, driver, transport);
        if let Err(err) = &result {
            transport.send_event(&DeviceMessage::Error {
                text: err.response_text(),
            });
        }
        result
    }

    fn handle<D, T, const N: usize>(
        &self,
        frame: &Frame,
        group: &mut ChannelGroup<N>,
        now: Millis,
        driver: &mut D,
        transport: &mut T,
    ) -> Result<CommandId, CommandError>
    where
        D: ActuatorDriver,
        T: Transport,
    {
        let command = CommandId::from_u8(frame.command)
            .filter(CommandId::is_host_request)
            .ok_or(CommandError::UnknownCommand(frame.command))?;

        match command {
            CommandId::Watchdog => {
                transport.send_event(&DeviceMessage::Watchdog {
                    device_id: self.device_id.as_str(),
                });
            }
            CommandId::GetState => {
                transport.send_event(&DeviceMessage::StateResult {
                    pumps: &group.pump_reports(),
                });
            }
            CommandId::GetLastStep => {
                let status = group.status();
                transport.send_event(&DeviceMessage::LastStepResult {
                    running: status.running,
                    done: status.done,
                    steps: &group.step_reports(),
                });
            }
            CommandId::Step => {
                self.step(frame, group, now, driver)?;
                transport.send_event(&DeviceMessage::Acknowledge { text: STEP_ACK });
            }
            CommandId::Stop => {
                stop_all(group, driver);
                transport.send_event(&DeviceMessage::Acknowledge { text: STOP_ACK });
            }
            _ => return Err(CommandError::UnknownCommand(frame.command)),
        }

        Ok(command)
    }

    fn step<D, const N: usize>(
        &self,
        frame: &Frame,
        group: &mut ChannelGroup<N>,
        now: Millis,
        driver: &mut D,
    ) -> Result<(), CommandError>
    where
        D: ActuatorDriver,
    {
        let mut reader = frame.reader();

        if group.is_busy() {
            drain_step::<N>(&mut reader);
            return Err(CommandError::Busy);
        }

        let requests = decode_step::<N>(&mut reader, self.max_speed)?;

        for (channel, request) in group.iter_mut().zip(requests.iter()) {
            channel.begin_step(request, now);
            if request.on {
                driver.set_output(channel.id(), request.speed, request.direction);
            } else {
                driver.stop(channel.id());
            }
        }

        Ok(())
    }
}

/// Force every channel idle and zero every output
pub fn stop_all<D, const N: usize>(group: &mut ChannelGroup<N>, driver: &mut D)
where
    D: ActuatorDriver,
{
    for channel in group.iter_mut() {
        channel.apply(ChannelEvent::Stop);
        driver.stop(channel.id());
    }
}
