//! Host link trait

use pumpstep_protocol::{DeviceMessage, Frame};

/// Framed, polling message transport to the host
///
/// Framing errors are the transport's own business: a malformed message is
/// dropped inside the implementation and simply never surfaces as a frame.
pub trait Transport {
    /// Take the next complete frame, if one is buffered
    ///
    /// Must not block. Returns `None` when no complete frame is available
    /// yet; partial input stays buffered for the next call.
    fn receive_command(&mut self) -> Option<Frame>;

    /// Send a message to the host
    fn send_event(&mut self, message: &DeviceMessage<'_>);
}
