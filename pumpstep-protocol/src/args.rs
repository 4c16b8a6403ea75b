//! Positional argument reading
//!
//! Arguments carry no type information on the wire. A reader walks them in
//! order and each `read_*` call consumes exactly one argument, so the caller
//! must read every argument a command declares, in the declared order.

use crate::frame::Arg;

/// Errors that can occur while reading arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgError {
    /// Fewer arguments were sent than the command declares
    Missing,
    /// Argument width does not match the declared type
    WrongSize,
    /// Text argument is not valid UTF-8
    InvalidUtf8,
    /// More arguments were sent than the command declares
    Trailing,
}

/// Sequential reader over the arguments of one frame
#[derive(Debug, Clone)]
pub struct ArgReader<'a> {
    args: &'a [Arg],
    next: usize,
}

impl<'a> ArgReader<'a> {
    /// Create a reader positioned at the first argument
    pub fn new(args: &'a [Arg]) -> Self {
        Self { args, next: 0 }
    }

    /// Consume the next argument
    ///
    /// The position advances even if the caller later rejects the width,
    /// so a bad argument never shifts the ones that follow it.
    fn next_arg(&mut self) -> Result<&'a [u8], ArgError> {
        let arg = self.args.get(self.next).ok_or(ArgError::Missing)?;
        self.next += 1;
        Ok(arg.as_slice())
    }

    fn next_fixed<const W: usize>(&mut self) -> Result<[u8; W], ArgError> {
        self.next_arg()?
            .try_into()
            .map_err(|_| ArgError::WrongSize)
    }

    /// Read a 1-byte boolean (any non-zero value is `true`)
    pub fn read_bool(&mut self) -> Result<bool, ArgError> {
        let [byte] = self.next_fixed::<1>()?;
        Ok(byte != 0)
    }

    /// Read an unsigned byte
    pub fn read_u8(&mut self) -> Result<u8, ArgError> {
        let [byte] = self.next_fixed::<1>()?;
        Ok(byte)
    }

    /// Read a 16-bit little-endian integer
    pub fn read_u16(&mut self) -> Result<u16, ArgError> {
        self.next_fixed::<2>().map(u16::from_le_bytes)
    }

    /// Read a 32-bit little-endian integer
    pub fn read_u32(&mut self) -> Result<u32, ArgError> {
        self.next_fixed::<4>().map(u32::from_le_bytes)
    }

    /// Read a text argument
    pub fn read_str(&mut self) -> Result<&'a str, ArgError> {
        core::str::from_utf8(self.next_arg()?).map_err(|_| ArgError::InvalidUtf8)
    }

    /// Consume the next argument without interpreting it
    pub fn skip(&mut self) -> Result<(), ArgError> {
        self.next_arg().map(|_| ())
    }

    /// Number of arguments not yet consumed
    pub fn remaining(&self) -> usize {
        self.args.len() - self.next
    }

    /// Check that every argument has been consumed
    pub fn finish(&self) -> Result<(), ArgError> {
        if self.remaining() == 0 {
            Ok(())
        } else {
            Err(ArgError::Trailing)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::frame::Frame;

    use super::*;

    fn step_frame() -> Frame {
        let mut frame = Frame::empty(7);
        frame.push_bool(true).unwrap();
        frame.push_u16(4096).unwrap();
        frame.push_bool(false).unwrap();
        frame.push_u32(3000).unwrap();
        frame
    }

    #[test]
    fn test_reads_in_declared_order() {
        let frame = step_frame();
        let mut reader = frame.reader();

        assert_eq!(reader.read_bool(), Ok(true));
        assert_eq!(reader.read_u16(), Ok(4096));
        assert_eq!(reader.read_bool(), Ok(false));
        assert_eq!(reader.read_u32(), Ok(3000));
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.finish(), Ok(()));
    }

    #[test]
    fn test_missing_argument() {
        let frame = Frame::empty(3);
        let mut reader = frame.reader();
        assert_eq!(reader.read_bool(), Err(ArgError::Missing));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_wrong_size_still_advances() {
        let frame = step_frame();
        let mut reader = frame.reader();

        // bool read as u16: rejected, but the next read lines up with arg 1
        assert_eq!(reader.read_u16(), Err(ArgError::WrongSize));
        assert_eq!(reader.read_u16(), Ok(4096));
        assert_eq!(reader.remaining(), frame.args.len() - 2);
    }

    #[test]
    fn test_trailing_arguments() {
        let frame = step_frame();
        let mut reader = frame.reader();
        reader.skip().unwrap();
        assert_eq!(reader.remaining(), 3);
        assert_eq!(reader.finish(), Err(ArgError::Trailing));
    }

    #[test]
    fn test_read_str() {
        let mut frame = Frame::empty(1);
        frame.push_str("Step").unwrap();
        frame.push_arg(&[0xFF, 0xFE]).unwrap();

        let mut reader = frame.reader();
        assert_eq!(reader.read_str(), Ok("Step"));
        assert_eq!(reader.read_str(), Err(ArgError::InvalidUtf8));
    }

    #[test]
    fn test_nonzero_bool_is_true() {
        let mut frame = Frame::empty(7);
        frame.push_u8(2).unwrap();
        assert_eq!(frame.reader().read_bool(), Ok(true));
    }
}
