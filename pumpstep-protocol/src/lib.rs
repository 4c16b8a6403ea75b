//! PumpStep host serial protocol
//!
//! This crate defines the serial protocol between the host computer and
//! the pump controller. Messages are short, field-delimited frames whose
//! arguments are fixed-width binary values.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────────────┬───┬───────┬───┬───────┬───┬───┐
//! │ COMMAND ID   │ , │ ARG 0 │ , │ ARG 1 │ … │ ; │
//! │ ASCII digits │   │ bytes │   │ bytes │   │   │
//! └──────────────┴───┴───────┴───┴───────┴───┴───┘
//! ```
//!
//! Argument bytes that collide with a separator or the escape character are
//! prefixed with `/`. Arguments carry no type tag: both sides must agree on
//! the order and width of every argument of every command.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod args;
pub mod frame;
pub mod messages;

pub use args::{ArgError, ArgReader};
pub use frame::{
    Arg, Frame, FrameError, FrameParser, COMMAND_SEPARATOR, ESCAPE, FIELD_SEPARATOR, MAX_ARGS,
    MAX_ARG_LEN, MAX_FRAME_SIZE,
};
pub use messages::{
    CommandId, DeviceMessage, HostCommand, PumpReport, StepArgs, StepReport, STEP_ARGS_PER_CHANNEL,
};
