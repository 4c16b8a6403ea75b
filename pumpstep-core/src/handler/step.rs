//! Step argument decoding
//!
//! A Step frame carries one `{bool on, u16 speed, bool forward, u32 duration}`
//! tuple per channel, in address order.

use pumpstep_protocol::{ArgError, ArgReader, STEP_ARGS_PER_CHANNEL};

use crate::channel::StepRequest;
use crate::traits::Direction;

/// Decode one request per channel, rejecting missing or extra arguments
///
/// Nothing is applied here; a request is only accepted once every channel
/// decoded cleanly.
pub fn decode_step<const N: usize>(
    reader: &mut ArgReader<'_>,
    max_speed: u16,
) -> Result<[StepRequest; N], ArgError> {
    let mut requests = [StepRequest::default(); N];
    for request in requests.iter_mut() {
        let on = reader.read_bool()?;
        let speed = reader.read_u16()?;
        let forward = reader.read_bool()?;
        let duration_ms = reader.read_u32()?;
        *request = StepRequest {
            on,
            speed: speed.min(max_speed),
            direction: Direction::from_forward(forward),
            duration_ms,
        };
    }
    reader.finish()?;
    Ok(requests)
}

/// Consume the arguments of a rejected Step without interpreting them
///
/// Returns how many arguments were actually present of the N × 4 expected.
pub fn drain_step<const N: usize>(reader: &mut ArgReader<'_>) -> usize {
    let mut drained = 0;
    for _ in 0..N * STEP_ARGS_PER_CHANNEL {
        if reader.skip().is_err() {
            break;
        }
        drained += 1;
    }
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpstep_protocol::{HostCommand, StepArgs};

    fn args(on: bool, speed: u16, forward: bool, duration_ms: u32) -> StepArgs {
        StepArgs {
            on,
            speed,
            forward,
            duration_ms,
        }
    }

    #[test]
    fn test_decode_in_address_order() {
        let channels = [args(true, 100, true, 10), args(false, 200, false, 20)];
        let frame = HostCommand::Step {
            channels: &channels,
        }
        .to_frame()
        .unwrap();

        let requests = decode_step::<2>(&mut frame.reader(), 4096).unwrap();
        assert!(requests[0].on);
        assert_eq!(requests[0].speed, 100);
        assert_eq!(requests[0].direction, Direction::Forward);
        assert_eq!(requests[0].duration_ms, 10);
        assert!(!requests[1].on);
        assert_eq!(requests[1].direction, Direction::Reverse);
        assert_eq!(requests[1].duration_ms, 20);
    }

    #[test]
    fn test_speed_clamped() {
        let channels = [args(true, u16::MAX, true, 10)];
        let frame = HostCommand::Step {
            channels: &channels,
        }
        .to_frame()
        .unwrap();

        let requests = decode_step::<1>(&mut frame.reader(), 4096).unwrap();
        assert_eq!(requests[0].speed, 4096);
    }

    #[test]
    fn test_missing_channel_rejected() {
        let channels = [args(true, 100, true, 10)];
        let frame = HostCommand::Step {
            channels: &channels,
        }
        .to_frame()
        .unwrap();

        assert_eq!(
            decode_step::<2>(&mut frame.reader(), 4096),
            Err(ArgError::Missing)
        );
    }

    #[test]
    fn test_extra_channel_rejected() {
        let channels = [args(true, 100, true, 10); 2];
        let frame = HostCommand::Step {
            channels: &channels,
        }
        .to_frame()
        .unwrap();

        assert_eq!(
            decode_step::<1>(&mut frame.reader(), 4096),
            Err(ArgError::Trailing)
        );
    }

    #[test]
    fn test_drain_consumes_every_argument() {
        let channels = [args(true, 100, true, 10); 3];
        let frame = HostCommand::Step {
            channels: &channels,
        }
        .to_frame()
        .unwrap();

        let mut reader = frame.reader();
        assert_eq!(drain_step::<3>(&mut reader), 12);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_drain_short_frame() {
        let channels = [args(true, 100, true, 10)];
        let frame = HostCommand::Step {
            channels: &channels,
        }
        .to_frame()
        .unwrap();

        assert_eq!(drain_step::<3>(&mut frame.reader()), 4);
    }
}
