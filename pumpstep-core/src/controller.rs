//! Polling pump controller
//!
//! Owns the channel group and both collaborators. One `poll` call is one
//! iteration of the control loop: at most one command is taken from the
//! transport and dispatched, then the scheduler runs one tick.

use heapless::String;
use pumpstep_protocol::{CommandId, DeviceMessage};

use crate::channel::{ChannelGroup, GroupStatus, Millis};
use crate::config::{ConfigError, ControllerConfig, MAX_TEXT_LEN};
use crate::error::CommandError;
use crate::handler::{stop_all, CommandHandler};
use crate::scheduler::{StepScheduler, TickReport};
use crate::traits::{ActuatorDriver, Transport};

/// What happened during one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollOutcome {
    /// Result of the command handled this poll, if one was received
    pub command: Option<Result<CommandId, CommandError>>,
    /// Scheduler tick result
    pub tick: TickReport,
}

impl PollOutcome {
    /// Nothing received and nothing completed
    pub fn is_idle(&self) -> bool {
        self.command.is_none() && self.tick.is_quiet()
    }
}

/// Pump controller for `N` channels
pub struct PumpController<D, T, const N: usize>
where
    D: ActuatorDriver,
    T: Transport,
{
    group: ChannelGroup<N>,
    handler: CommandHandler,
    scheduler: StepScheduler,
    driver: D,
    transport: T,
    ready_message: String<MAX_TEXT_LEN>,
}

impl<D, T, const N: usize> PumpController<D, T, N>
where
    D: ActuatorDriver,
    T: Transport,
{
    /// Create a controller with every channel idle
    pub fn new(config: &ControllerConfig, driver: D, transport: T) -> Result<Self, ConfigError> {
        config.validate(N)?;

        Ok(Self {
            group: ChannelGroup::new(),
            handler: CommandHandler::new(config),
            scheduler: StepScheduler::new(),
            driver,
            transport,
            ready_message: config.ready_message.clone(),
        })
    }

    /// Stop every output and announce readiness
    ///
    /// Call once before the first `poll`.
    pub fn start(&mut self) {
        stop_all(&mut self.group, &mut self.driver);
        self.transport.send_event(&DeviceMessage::Acknowledge {
            text: self.ready_message.as_str(),
        });
    }

    /// Run one loop iteration at time `now`
    pub fn poll(&mut self, now: Millis) -> PollOutcome {
        let command = self.transport.receive_command().map(|frame| {
            self.handler.dispatch(
                &frame,
                &mut self.group,
                now,
                &mut self.driver,
                &mut self.transport,
            )
        });

        let tick = self
            .scheduler
            .tick(&mut self.group, now, &mut self.driver, &mut self.transport);

        PollOutcome { command, tick }
    }

    pub fn group(&self) -> &ChannelGroup<N> {
        &self.group
    }

    pub fn status(&self) -> GroupStatus {
        self.group.status()
    }

    /// Total channel steps completed since startup
    pub fn completed_steps(&self) -> u32 {
        self.scheduler.completed_steps()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
