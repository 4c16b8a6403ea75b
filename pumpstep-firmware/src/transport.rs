//! Serial host link
//!
//! Implements the core `Transport` trait over the buffered UART. Reads are
//! byte-wise and only happen while the RX ring buffer reports data, so
//! `receive_command` never waits on the wire. Malformed frames are logged
//! and dropped here; the parser resynchronises on the next `;`.

use defmt::*;
use embedded_io::{Error as _, Read, ReadReady, Write};

use pumpstep_core::traits::Transport;
use pumpstep_protocol::{DeviceMessage, Frame, FrameParser, MAX_FRAME_SIZE};

/// Host link over a split serial port
pub struct SerialTransport<R, W> {
    rx: R,
    tx: W,
    parser: FrameParser,
    /// Frames dropped for framing errors since startup
    dropped: u32,
}

impl<R, W> SerialTransport<R, W>
where
    R: Read + ReadReady,
    W: Write,
{
    pub fn new(rx: R, tx: W) -> Self {
        Self {
            rx,
            tx,
            parser: FrameParser::new(),
            dropped: 0,
        }
    }

    pub fn dropped_frames(&self) -> u32 {
        self.dropped
    }

    /// Read one byte if the RX buffer has one
    fn read_byte(&mut self) -> Option<u8> {
        match self.rx.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(e) => {
                warn!("UART read error: {:?}", Debug2Format(&e.kind()));
                return None;
            }
        }

        let mut byte = [0u8; 1];
        match self.rx.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                warn!("UART read error: {:?}", Debug2Format(&e.kind()));
                None
            }
        }
    }
}

impl<R, W> Transport for SerialTransport<R, W>
where
    R: Read + ReadReady,
    W: Write,
{
    fn receive_command(&mut self) -> Option<Frame> {
        while let Some(byte) = self.read_byte() {
            match self.parser.feed(byte) {
                Ok(Some(frame)) => {
                    trace!("RX: command {} with {} args", frame.command, frame.args.len());
                    return Some(frame);
                }
                Ok(None) => {
                    // Need more bytes
                }
                Err(e) => {
                    self.dropped = self.dropped.wrapping_add(1);
                    warn!("Frame dropped: {:?}", e);
                }
            }
        }
        None
    }

    /// Encode and queue one message on the TX ring buffer
    ///
    /// `write_all` only waits while the 256-byte ring is full. The UART
    /// interrupt drains it at 115200 baud (about 11 bytes per ms), so one
    /// call blocks the control loop for at most about 25 ms. Replies are
    /// never dropped: every host command still gets exactly one response.
    fn send_event(&mut self, message: &DeviceMessage<'_>) {
        let mut buf = [0u8; MAX_FRAME_SIZE];
        let len = match message.to_frame().and_then(|frame| frame.encode(&mut buf)) {
            Ok(len) => len,
            Err(e) => {
                warn!("Failed to encode {:?}: {:?}", message.command(), e);
                return;
            }
        };

        if let Err(e) = self.tx.write_all(&buf[..len]) {
            warn!(
                "Failed to send {:?}: {:?}",
                message.command(),
                Debug2Format(&e.kind())
            );
        } else {
            trace!("TX: {:?} ({} bytes)", message.command(), len);
        }
    }
}
