//! Pump bank
//!
//! Owns one `DcPump` per channel and implements the core `ActuatorDriver`
//! trait on top of them. Hardware errors cannot be reported through the
//! trait, so they are counted instead and the channel keeps its last good
//! output.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use pumpstep_core::traits::{ActuatorDriver, ChannelId, Direction};

use super::dc::{DcPump, PumpOutput};

/// All pump channels of a controller, in address order
pub struct PumpBank<P, D, const N: usize> {
    pumps: [DcPump<P, D>; N],
    faults: u32,
}

impl<P, D, const N: usize> PumpBank<P, D, N>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    pub fn new(pumps: [DcPump<P, D>; N]) -> Self {
        Self { pumps, faults: 0 }
    }

    /// Applied output of a channel
    pub fn output(&self, channel: ChannelId) -> Option<PumpOutput> {
        self.pumps.get(channel.index()).map(DcPump::output)
    }

    /// Hardware write failures since startup
    pub fn faults(&self) -> u32 {
        self.faults
    }

    fn record<E>(&mut self, result: Result<(), E>) {
        if result.is_err() {
            self.faults = self.faults.wrapping_add(1);
        }
    }
}

impl<P, D, const N: usize> ActuatorDriver for PumpBank<P, D, N>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    fn set_output(&mut self, channel: ChannelId, speed: u16, direction: Direction) {
        let Some(pump) = self.pumps.get_mut(channel.index()) else {
            return;
        };
        let result = pump.set(speed, direction);
        self.record(result);
    }

    fn stop(&mut self, channel: ChannelId) {
        let Some(pump) = self.pumps.get_mut(channel.index()) else {
            return;
        };
        let result = pump.stop();
        self.record(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump::dc::mocks::{MockPin, MockPwm};

    fn bank() -> PumpBank<MockPwm, MockPin, 3> {
        PumpBank::new(core::array::from_fn(|i| {
            DcPump::new(MockPwm::default(), MockPin::default(), 4096, i == 1).unwrap()
        }))
    }

    #[test]
    fn test_channels_addressed_independently() {
        let mut bank = bank();
        bank.set_output(ChannelId(2), 1024, Direction::Reverse);

        assert_eq!(bank.output(ChannelId(0)), Some(PumpOutput::Stopped));
        assert_eq!(bank.output(ChannelId(1)), Some(PumpOutput::Stopped));
        assert_eq!(
            bank.output(ChannelId(2)),
            Some(PumpOutput::Running {
                speed: 1024,
                direction: Direction::Reverse
            })
        );
    }

    #[test]
    fn test_stop_twice_same_as_once() {
        let mut bank = bank();
        bank.set_output(ChannelId(0), 4096, Direction::Forward);
        bank.stop(ChannelId(0));
        let once = bank.output(ChannelId(0));
        bank.stop(ChannelId(0));

        assert_eq!(bank.output(ChannelId(0)), once);
        assert_eq!(once, Some(PumpOutput::Stopped));
        assert_eq!(bank.faults(), 0);
    }

    #[test]
    fn test_out_of_range_channel_ignored() {
        let mut bank = bank();
        bank.set_output(ChannelId(3), 4096, Direction::Forward);
        bank.stop(ChannelId(200));

        assert_eq!(bank.output(ChannelId(3)), None);
        for id in 0..3 {
            assert_eq!(bank.output(ChannelId(id)), Some(PumpOutput::Stopped));
        }
    }
}
