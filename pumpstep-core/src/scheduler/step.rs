//! Per-tick step completion
//!
//! A tick walks the channels in address order:
//! - idle channels are skipped
//! - a running channel whose duration has elapsed is stopped, marked done
//!   and announced with one StepDone message
//! - a done channel is cleared back to idle
//!
//! Completion and clearing never happen for the same channel in the same
//! tick, so a finished step is observable as "done" for exactly one tick.

use pumpstep_protocol::DeviceMessage;

use crate::channel::{ChannelEvent, ChannelGroup, ChannelPhase, Millis};
use crate::traits::{ActuatorDriver, Transport};

/// What one tick changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Channels whose step completed this tick
    pub completed: u8,
    /// Done channels cleared back to idle this tick
    pub settled: u8,
}

impl TickReport {
    /// Nothing happened
    pub fn is_quiet(&self) -> bool {
        self.completed == 0 && self.settled == 0
    }
}

/// Step scheduler
#[derive(Debug, Default)]
pub struct StepScheduler {
    completed_steps: u32,
}

impl StepScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total channel steps completed since startup
    pub fn completed_steps(&self) -> u32 {
        self.completed_steps
    }

    /// Advance every channel by one tick
    pub fn tick<D, T, const N: usize>(
        &mut self,
        group: &mut ChannelGroup<N>,
        now: Millis,
        driver: &mut D,
        transport: &mut T,
    ) -> TickReport
    where
        D: ActuatorDriver,
        T: Transport,
    {
        let mut report = TickReport::default();

        for channel in group.iter_mut() {
            match channel.phase() {
                ChannelPhase::Idle => {}
                ChannelPhase::Running => {
                    if channel.duration_elapsed(now) {
                        channel.apply(ChannelEvent::DurationElapsed);
                        driver.stop(channel.id());
                        transport.send_event(&DeviceMessage::StepDone {
                            channel: channel.id().0,
                        });
                        report.completed += 1;
                        self.completed_steps = self.completed_steps.wrapping_add(1);
                    }
                }
                ChannelPhase::Done => {
                    channel.apply(ChannelEvent::Settle);
                    report.settled += 1;
                }
            }
        }

        report
    }
}
