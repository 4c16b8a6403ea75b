//! Hand-written collaborator mocks for host tests

use std::collections::VecDeque;
use std::vec::Vec;

use pumpstep_protocol::{CommandId, DeviceMessage, Frame, HostCommand};

use crate::config::MAX_CHANNELS;
use crate::traits::{ActuatorDriver, ChannelId, Direction, Transport};

/// One recorded driver call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCall {
    Set(ChannelId, u16, Direction),
    Stop(ChannelId),
}

/// Driver that records every call and tracks the resulting outputs
#[derive(Debug, Default)]
pub struct MockDriver {
    pub calls: Vec<DriverCall>,
    pub outputs: [Option<(u16, Direction)>; MAX_CHANNELS],
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self, channel: u8) -> Option<(u16, Direction)> {
        self.outputs[channel as usize]
    }

    pub fn stop_count(&self, channel: u8) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == DriverCall::Stop(ChannelId(channel)))
            .count()
    }
}

impl ActuatorDriver for MockDriver {
    fn set_output(&mut self, channel: ChannelId, speed: u16, direction: Direction) {
        self.calls.push(DriverCall::Set(channel, speed, direction));
        self.outputs[channel.index()] = Some((speed, direction));
    }

    fn stop(&mut self, channel: ChannelId) {
        self.calls.push(DriverCall::Stop(channel));
        self.outputs[channel.index()] = None;
    }
}

/// Transport with a queued inbox and a log of sent frames
#[derive(Debug, Default)]
pub struct MockTransport {
    pub inbox: VecDeque<Frame>,
    pub sent: Vec<Frame>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&mut self, command: HostCommand<'_>) {
        self.inbox
            .push_back(command.to_frame().expect("host command fits a frame"));
    }

    pub fn queue_frame(&mut self, frame: Frame) {
        self.inbox.push_back(frame);
    }

    /// Remove and return everything sent so far
    pub fn take_sent(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.sent)
    }

    pub fn last_sent(&self) -> Option<&Frame> {
        self.sent.last()
    }

    /// Sent frames with the given command id
    pub fn sent_with(&self, command: CommandId) -> Vec<&Frame> {
        self.sent
            .iter()
            .filter(|frame| frame.command == command.to_u8())
            .collect()
    }
}

impl Transport for MockTransport {
    fn receive_command(&mut self) -> Option<Frame> {
        self.inbox.pop_front()
    }

    fn send_event(&mut self, message: &DeviceMessage<'_>) {
        self.sent
            .push(message.to_frame().expect("device message fits a frame"));
    }
}

/// Read the text argument of an Acknowledge/Error/Watchdog frame
pub fn text_of(frame: &Frame) -> &str {
    frame.reader().read_str().expect("text argument")
}
