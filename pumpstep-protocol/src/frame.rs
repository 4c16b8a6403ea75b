//! Frame encoding and decoding for the host serial protocol.
//!
//! Frame format:
//! - COMMAND (1-3 bytes): command id as ASCII decimal digits
//! - for each argument: FIELD_SEPARATOR (`,`) followed by the argument bytes
//! - COMMAND_SEPARATOR (`;`)
//!
//! Any argument byte equal to `,`, `;`, `/` or NUL is sent as `/` followed by
//! the byte itself.

use heapless::Vec;

use crate::args::ArgReader;

/// Separates the command id and the arguments of a frame
pub const FIELD_SEPARATOR: u8 = b',';

/// Terminates a frame
pub const COMMAND_SEPARATOR: u8 = b';';

/// Marks the next byte as literal argument data
pub const ESCAPE: u8 = b'/';

/// Maximum number of arguments in one frame
pub const MAX_ARGS: usize = 20;

/// Maximum unescaped length of a single argument
pub const MAX_ARG_LEN: usize = 40;

/// Maximum encoded frame size (every argument byte escaped)
pub const MAX_FRAME_SIZE: usize = 3 + MAX_ARGS * (1 + 2 * MAX_ARG_LEN) + 1;

/// A single unescaped argument
pub type Arg = Vec<u8, MAX_ARG_LEN>;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// An argument exceeds [`MAX_ARG_LEN`]
    ArgTooLarge,
    /// The frame carries more than [`MAX_ARGS`] arguments
    TooManyArgs,
    /// The command id is not a decimal number in 0-255
    InvalidCommandId,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command identifier
    pub command: u8,
    /// Unescaped argument data, in wire order
    pub args: Vec<Arg, MAX_ARGS>,
}

impl Frame {
    /// Create a frame with no arguments
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }

    /// Append a raw argument
    pub fn push_arg(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let arg = Arg::from_slice(bytes).map_err(|_| FrameError::ArgTooLarge)?;
        self.args.push(arg).map_err(|_| FrameError::TooManyArgs)
    }

    /// Append a boolean argument (1 byte)
    pub fn push_bool(&mut self, value: bool) -> Result<(), FrameError> {
        self.push_arg(&[value as u8])
    }

    /// Append an unsigned byte argument
    pub fn push_u8(&mut self, value: u8) -> Result<(), FrameError> {
        self.push_arg(&[value])
    }

    /// Append a 16-bit little-endian argument
    pub fn push_u16(&mut self, value: u16) -> Result<(), FrameError> {
        self.push_arg(&value.to_le_bytes())
    }

    /// Append a 32-bit little-endian argument
    pub fn push_u32(&mut self, value: u32) -> Result<(), FrameError> {
        self.push_arg(&value.to_le_bytes())
    }

    /// Append a text argument
    pub fn push_str(&mut self, text: &str) -> Result<(), FrameError> {
        self.push_arg(text.as_bytes())
    }

    /// Borrow the arguments for positional reading
    pub fn reader(&self) -> ArgReader<'_> {
        ArgReader::new(&self.args)
    }

    /// Check if a byte must be escaped inside an argument
    fn needs_escape(byte: u8) -> bool {
        matches!(byte, FIELD_SEPARATOR | COMMAND_SEPARATOR | ESCAPE | 0)
    }

    /// Feed every encoded byte of this frame to `put`
    fn write_with<F>(&self, mut put: F) -> Result<(), FrameError>
    where
        F: FnMut(u8) -> Result<(), FrameError>,
    {
        let mut digits = [0u8; 3];
        let mut value = self.command;
        let mut count = 0;
        loop {
            digits[count] = b'0' + value % 10;
            count += 1;
            value /= 10;
            if value == 0 {
                break;
            }
        }
        for &digit in digits[..count].iter().rev() {
            put(digit)?;
        }

        for arg in &self.args {
            put(FIELD_SEPARATOR)?;
            for &byte in arg {
                if Self::needs_escape(byte) {
                    put(ESCAPE)?;
                }
                put(byte)?;
            }
        }

        put(COMMAND_SEPARATOR)
    }

    /// Number of bytes [`Frame::encode`] will write
    pub fn encoded_len(&self) -> usize {
        let mut len = 0;
        // Counting never fails
        let _ = self.write_with(|_| {
            len += 1;
            Ok(())
        });
        len
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let mut written = 0;
        self.write_with(|byte| {
            let slot = buffer.get_mut(written).ok_or(FrameError::BufferTooSmall)?;
            *slot = byte;
            written += 1;
            Ok(())
        })?;
        Ok(written)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut vec = Vec::new();
        self.write_with(|byte| vec.push(byte).map_err(|_| FrameError::BufferTooSmall))?;
        Ok(vec)
    }
}

/// State machine for parsing incoming frames
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    command: u16,
    args: Vec<Arg, MAX_ARGS>,
    current: Arg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for the first digit of a command id
    WaitingForCommand,
    /// Reading command id digits
    ReadingCommand,
    /// Reading argument bytes
    ReadingArg,
    /// Previous byte was ESCAPE inside an argument
    Escaped,
    /// Skipping the rest of a broken frame
    Discarding,
    /// Previous byte was ESCAPE while skipping
    DiscardingEscaped,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForCommand,
            command: 0,
            args: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForCommand;
        self.command = 0;
        self.args.clear();
        self.current.clear();
    }

    /// Check if the parser holds part of a frame
    pub fn in_frame(&self) -> bool {
        self.state != ParseState::WaitingForCommand
    }

    /// Drop the current frame and skip input up to the next COMMAND_SEPARATOR
    fn discard(&mut self, error: FrameError) -> Result<Option<Frame>, FrameError> {
        self.args.clear();
        self.current.clear();
        self.command = 0;
        self.state = ParseState::Discarding;
        Err(error)
    }

    fn finish_arg(&mut self) -> Result<(), FrameError> {
        let arg = core::mem::take(&mut self.current);
        self.args.push(arg).map_err(|_| FrameError::TooManyArgs)
    }

    fn complete(&mut self) -> Frame {
        let frame = Frame {
            command: self.command as u8,
            args: core::mem::take(&mut self.args),
        };
        self.reset();
        frame
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current
    /// frame is malformed. After an error the parser skips everything up to
    /// the next COMMAND_SEPARATOR, so the following frame parses cleanly.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::WaitingForCommand => match byte {
                b'0'..=b'9' => {
                    self.command = (byte - b'0') as u16;
                    self.state = ParseState::ReadingCommand;
                    Ok(None)
                }
                // Line endings and empty frames between commands
                b'\r' | b'\n' | COMMAND_SEPARATOR => Ok(None),
                _ => self.discard(FrameError::InvalidCommandId),
            },
            ParseState::ReadingCommand => match byte {
                b'0'..=b'9' => {
                    self.command = self.command * 10 + (byte - b'0') as u16;
                    if self.command > u8::MAX as u16 {
                        return self.discard(FrameError::InvalidCommandId);
                    }
                    Ok(None)
                }
                FIELD_SEPARATOR => {
                    self.current.clear();
                    self.state = ParseState::ReadingArg;
                    Ok(None)
                }
                COMMAND_SEPARATOR => Ok(Some(self.complete())),
                _ => self.discard(FrameError::InvalidCommandId),
            },
            ParseState::ReadingArg => match byte {
                ESCAPE => {
                    self.state = ParseState::Escaped;
                    Ok(None)
                }
                FIELD_SEPARATOR => match self.finish_arg() {
                    Ok(()) => Ok(None),
                    Err(e) => self.discard(e),
                },
                COMMAND_SEPARATOR => match self.finish_arg() {
                    Ok(()) => Ok(Some(self.complete())),
                    Err(e) => self.discard(e),
                },
                _ => match self.current.push(byte) {
                    Ok(()) => Ok(None),
                    Err(_) => self.discard(FrameError::ArgTooLarge),
                },
            },
            ParseState::Escaped => {
                self.state = ParseState::ReadingArg;
                match self.current.push(byte) {
                    Ok(()) => Ok(None),
                    Err(_) => self.discard(FrameError::ArgTooLarge),
                }
            }
            ParseState::Discarding => {
                match byte {
                    ESCAPE => self.state = ParseState::DiscardingEscaped,
                    COMMAND_SEPARATOR => self.reset(),
                    _ => {}
                }
                Ok(None)
            }
            ParseState::DiscardingEscaped => {
                self.state = ParseState::Discarding;
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}
