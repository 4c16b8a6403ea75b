//! Command error types

use pumpstep_protocol::ArgError;

/// Reasons a host command is rejected
///
/// None of these are fatal: each is answered with an Error message and the
/// control loop carries on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Step received while a channel is still timing a step
    Busy,
    /// Command id without a handler (includes device-only ids)
    UnknownCommand(u8),
    /// Step arguments missing, mis-sized or followed by extra arguments
    MalformedArguments(ArgError),
}

impl CommandError {
    /// Text of the Error message sent to the host
    pub fn response_text(&self) -> &'static str {
        match self {
            CommandError::Busy => "busy",
            CommandError::UnknownCommand(_) => "Command without attached callback",
            CommandError::MalformedArguments(_) => "malformed step",
        }
    }
}

impl From<ArgError> for CommandError {
    fn from(err: ArgError) -> Self {
        CommandError::MalformedArguments(err)
    }
}
