//! Message types for the host serial protocol
//!
//! Command ids form a single enumeration shared by both directions:
//! - Host → Controller: Watchdog, GetState, GetLastStep, Step, Stop
//! - Controller → Host: Watchdog, Acknowledge, Error, GetStateResult,
//!   GetLastStepResult, StepDone
//!
//! The numeric values are part of the wire format and must not be reordered.

use crate::frame::{Frame, FrameError};

/// Arguments per channel in a Step command: on, speed, forward, duration
pub const STEP_ARGS_PER_CHANNEL: usize = 4;

/// Command identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandId {
    /// Identify request / device identifier response
    Watchdog = 0,
    /// A command was accepted
    Acknowledge = 1,
    /// A command failed
    Error = 2,
    /// Request current pump outputs
    GetState = 3,
    /// Current pump outputs
    GetStateResult = 4,
    /// Request the last accepted step
    GetLastStep = 5,
    /// Last accepted step
    GetLastStepResult = 6,
    /// Timed step for every channel
    Step = 7,
    /// Stop every channel
    Stop = 8,
    /// A channel finished its step
    StepDone = 9,
}

impl CommandId {
    /// Parse a command id from its wire value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CommandId::Watchdog),
            1 => Some(CommandId::Acknowledge),
            2 => Some(CommandId::Error),
            3 => Some(CommandId::GetState),
            4 => Some(CommandId::GetStateResult),
            5 => Some(CommandId::GetLastStep),
            6 => Some(CommandId::GetLastStepResult),
            7 => Some(CommandId::Step),
            8 => Some(CommandId::Stop),
            9 => Some(CommandId::StepDone),
            _ => None,
        }
    }

    /// Convert to wire value
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Returns true if the host may send this command to the controller
    pub fn is_host_request(&self) -> bool {
        matches!(
            self,
            CommandId::Watchdog
                | CommandId::GetState
                | CommandId::GetLastStep
                | CommandId::Step
                | CommandId::Stop
        )
    }
}

/// Output state of one pump, as reported by GetStateResult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PumpReport {
    pub running: bool,
    pub speed: u16,
    pub forward: bool,
}

/// Last accepted step of one pump, as reported by GetLastStepResult
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepReport {
    pub duration_ms: u32,
    pub running: bool,
    pub speed: u16,
    pub forward: bool,
}

/// Per-channel arguments of a Step command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepArgs {
    pub on: bool,
    pub speed: u16,
    pub forward: bool,
    pub duration_ms: u32,
}

/// Messages from the controller to the host
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMessage<'a> {
    /// Identify response
    Watchdog { device_id: &'a str },
    /// Command accepted (also sent once at startup)
    Acknowledge { text: &'a str },
    /// Command rejected
    Error { text: &'a str },
    /// Current output of every pump
    StateResult { pumps: &'a [PumpReport] },
    /// Group flags followed by the last step of every pump
    LastStepResult {
        running: bool,
        done: bool,
        steps: &'a [StepReport],
    },
    /// A channel finished its step
    StepDone { channel: u8 },
}

impl<'a> DeviceMessage<'a> {
    /// Command id this message is sent under
    pub fn command(&self) -> CommandId {
        match self {
            DeviceMessage::Watchdog { .. } => CommandId::Watchdog,
            DeviceMessage::Acknowledge { .. } => CommandId::Acknowledge,
            DeviceMessage::Error { .. } => CommandId::Error,
            DeviceMessage::StateResult { .. } => CommandId::GetStateResult,
            DeviceMessage::LastStepResult { .. } => CommandId::GetLastStepResult,
            DeviceMessage::StepDone { .. } => CommandId::StepDone,
        }
    }

    /// Encode this message into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut frame = Frame::empty(self.command().to_u8());
        match self {
            DeviceMessage::Watchdog { device_id } => frame.push_str(device_id)?,
            DeviceMessage::Acknowledge { text } | DeviceMessage::Error { text } => {
                frame.push_str(text)?
            }
            DeviceMessage::StateResult { pumps } => {
                for pump in pumps.iter() {
                    frame.push_bool(pump.running)?;
                    frame.push_u16(pump.speed)?;
                    frame.push_bool(pump.forward)?;
                }
            }
            DeviceMessage::LastStepResult {
                running,
                done,
                steps,
            } => {
                frame.push_bool(*running)?;
                frame.push_bool(*done)?;
                for step in steps.iter() {
                    frame.push_u32(step.duration_ms)?;
                    frame.push_bool(step.running)?;
                    frame.push_u16(step.speed)?;
                    frame.push_bool(step.forward)?;
                }
            }
            DeviceMessage::StepDone { channel } => frame.push_u8(*channel)?,
        }
        Ok(frame)
    }
}

/// Commands from the host to the controller
///
/// The controller reads arguments positionally and never decodes this type;
/// it exists for host tooling, simulation and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand<'a> {
    Watchdog,
    GetState,
    GetLastStep,
    Step { channels: &'a [StepArgs] },
    Stop,
}

impl<'a> HostCommand<'a> {
    /// Command id this command is sent under
    pub fn command(&self) -> CommandId {
        match self {
            HostCommand::Watchdog => CommandId::Watchdog,
            HostCommand::GetState => CommandId::GetState,
            HostCommand::GetLastStep => CommandId::GetLastStep,
            HostCommand::Step { .. } => CommandId::Step,
            HostCommand::Stop => CommandId::Stop,
        }
    }

    /// Encode this command into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut frame = Frame::empty(self.command().to_u8());
        if let HostCommand::Step { channels } = self {
            for args in channels.iter() {
                frame.push_bool(args.on)?;
                frame.push_u16(args.speed)?;
                frame.push_bool(args.forward)?;
                frame.push_u32(args.duration_ms)?;
            }
        }
        Ok(frame)
    }
}
