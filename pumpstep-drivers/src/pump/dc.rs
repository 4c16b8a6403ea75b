//! DC pump channel with PWM speed control
//!
//! Maps a commanded speed in `0..=max_speed` onto the PWM's full duty range
//! and drives the direction pin. Speeds above `max_speed` are clamped.
//!
//! ```ignore
//! let mut pump = DcPump::new(pwm, dir_pin, 4096, false)?;
//! pump.set(2048, Direction::Forward)?; // half duty, DIR high
//! pump.stop()?;
//! ```
//!
//! Re-applying the current output does not touch the hardware.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;
use pumpstep_core::traits::Direction;

/// Pump driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PumpError<PE, DE> {
    /// PWM peripheral rejected the duty cycle
    Pwm(PE),
    /// Direction pin could not be driven
    Direction(DE),
}

/// Output currently applied to a pump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PumpOutput {
    /// Zero duty
    #[default]
    Stopped,
    /// Non-zero duty in a direction
    Running { speed: u16, direction: Direction },
}

/// One DC pump channel
pub struct DcPump<P, D> {
    pwm: P,
    dir: D,
    max_speed: u16,
    /// Pump plumbed backwards: forward drives DIR low
    invert_direction: bool,
    output: PumpOutput,
}

impl<P, D> DcPump<P, D>
where
    P: SetDutyCycle,
    D: OutputPin,
{
    /// Create a pump channel and force its output off
    pub fn new(
        pwm: P,
        dir: D,
        max_speed: u16,
        invert_direction: bool,
    ) -> Result<Self, PumpError<P::Error, D::Error>> {
        let mut pump = Self {
            pwm,
            dir,
            max_speed: max_speed.max(1),
            invert_direction,
            output: PumpOutput::Stopped,
        };
        pump.pwm.set_duty_cycle_fully_off().map_err(PumpError::Pwm)?;
        pump.write_direction(Direction::Forward)?;
        Ok(pump)
    }

    /// Currently applied output
    pub fn output(&self) -> PumpOutput {
        self.output
    }

    pub fn max_speed(&self) -> u16 {
        self.max_speed
    }

    /// Drive the pump at `speed` in `direction`
    ///
    /// A zero speed is the same as `stop`.
    pub fn set(
        &mut self,
        speed: u16,
        direction: Direction,
    ) -> Result<(), PumpError<P::Error, D::Error>> {
        let speed = speed.min(self.max_speed);
        if speed == 0 {
            return self.stop();
        }

        let target = PumpOutput::Running { speed, direction };
        if self.output == target {
            return Ok(());
        }

        // Direction first so the new duty never runs the wrong way
        self.write_direction(direction)?;
        self.pwm
            .set_duty_cycle_fraction(speed, self.max_speed)
            .map_err(PumpError::Pwm)?;
        self.output = target;
        Ok(())
    }

    /// Set the duty to zero, leaving the direction pin as it is
    pub fn stop(&mut self) -> Result<(), PumpError<P::Error, D::Error>> {
        if self.output == PumpOutput::Stopped {
            return Ok(());
        }
        self.pwm.set_duty_cycle_fully_off().map_err(PumpError::Pwm)?;
        self.output = PumpOutput::Stopped;
        Ok(())
    }

    fn write_direction(&mut self, direction: Direction) -> Result<(), PumpError<P::Error, D::Error>> {
        let result = if direction.is_forward() != self.invert_direction {
            self.dir.set_high()
        } else {
            self.dir.set_low()
        };
        result.map_err(PumpError::Direction)
    }

    /// Release the underlying peripherals
    pub fn release(self) -> (P, D) {
        (self.pwm, self.dir)
    }
}

#[cfg(test)]
pub(crate) mod mocks {
    use core::convert::Infallible;
    use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
    use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};

    /// PWM channel with a 0..=4095 duty range that counts writes
    #[derive(Debug, Default)]
    pub struct MockPwm {
        pub duty: u16,
        pub writes: usize,
    }

    impl PwmErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            4095
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub struct MockPin {
        pub high: bool,
    }

    impl PinErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{MockPin, MockPwm};
    use super::*;
    use proptest::prelude::*;

    fn pump(invert: bool) -> DcPump<MockPwm, MockPin> {
        DcPump::new(MockPwm::default(), MockPin::default(), 4096, invert).unwrap()
    }

    #[test]
    fn test_starts_stopped() {
        let pump = pump(false);
        assert_eq!(pump.output(), PumpOutput::Stopped);
        let (pwm, dir) = pump.release();
        assert_eq!(pwm.duty, 0);
        assert!(dir.high);
    }

    #[test]
    fn test_full_speed_is_full_duty() {
        let mut pump = pump(false);
        pump.set(4096, Direction::Forward).unwrap();
        assert_eq!(pump.pwm.duty, 4095);
        assert!(pump.dir.high);
    }

    #[test]
    fn test_half_speed() {
        let mut pump = pump(false);
        pump.set(2048, Direction::Reverse).unwrap();
        assert_eq!(pump.pwm.duty, 2047);
        assert!(!pump.dir.high);
        assert_eq!(
            pump.output(),
            PumpOutput::Running {
                speed: 2048,
                direction: Direction::Reverse
            }
        );
    }

    #[test]
    fn test_speed_clamped() {
        let mut pump = pump(false);
        pump.set(u16::MAX, Direction::Forward).unwrap();
        assert_eq!(pump.pwm.duty, 4095);
        assert_eq!(
            pump.output(),
            PumpOutput::Running {
                speed: 4096,
                direction: Direction::Forward
            }
        );
    }

    #[test]
    fn test_inverted_direction() {
        let mut pump = pump(true);
        pump.set(100, Direction::Forward).unwrap();
        assert!(!pump.dir.high);
        pump.set(100, Direction::Reverse).unwrap();
        assert!(pump.dir.high);
    }

    #[test]
    fn test_zero_speed_stops() {
        let mut pump = pump(false);
        pump.set(1000, Direction::Forward).unwrap();
        pump.set(0, Direction::Forward).unwrap();
        assert_eq!(pump.output(), PumpOutput::Stopped);
        assert_eq!(pump.pwm.duty, 0);
    }

    #[test]
    fn test_stop_idempotent() {
        let mut pump = pump(false);
        pump.set(1000, Direction::Forward).unwrap();
        pump.stop().unwrap();
        let writes = pump.pwm.writes;

        pump.stop().unwrap();
        assert_eq!(pump.pwm.writes, writes);
        assert_eq!(pump.output(), PumpOutput::Stopped);
    }

    #[test]
    fn test_same_output_not_rewritten() {
        let mut pump = pump(false);
        pump.set(1000, Direction::Forward).unwrap();
        let writes = pump.pwm.writes;

        pump.set(1000, Direction::Forward).unwrap();
        assert_eq!(pump.pwm.writes, writes);

        pump.set(1001, Direction::Forward).unwrap();
        assert_eq!(pump.pwm.writes, writes + 1);
    }

    proptest! {
        #[test]
        fn prop_duty_monotonic(a in 0u16..=4096, b in 0u16..=4096) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let mut pump = pump(false);
            pump.set(lo, Direction::Forward).unwrap();
            let lo_duty = pump.pwm.duty;
            pump.set(hi, Direction::Forward).unwrap();
            prop_assert!(pump.pwm.duty >= lo_duty);
            prop_assert!(pump.pwm.duty <= 4095);
        }
    }
}
