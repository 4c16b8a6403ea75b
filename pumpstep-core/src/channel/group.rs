//! Fixed-size channel group
//!
//! All channels of a controller are addressed together by one Step command
//! and are accepted or rejected as a unit.

use pumpstep_protocol::{PumpReport, StepReport};

use super::state::Channel;
use crate::config::MAX_CHANNELS;
use crate::traits::ChannelId;

/// Aggregated step flags for the whole group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GroupStatus {
    /// At least one channel is running (including done-but-not-cleared)
    pub running: bool,
    /// Something is running and every running channel is done
    pub done: bool,
}

impl GroupStatus {
    /// A new step would be rejected
    pub fn is_busy(&self) -> bool {
        self.running && !self.done
    }
}

/// The ordered set of pump channels
#[derive(Debug, Clone)]
pub struct ChannelGroup<const N: usize> {
    channels: [Channel; N],
}

impl<const N: usize> ChannelGroup<N> {
    const SIZE_OK: () = assert!(N > 0 && N <= MAX_CHANNELS, "channel count out of range");

    /// Create a group of idle channels with ids 0..N-1
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::SIZE_OK;
        Self {
            channels: core::array::from_fn(|i| Channel::new(ChannelId(i as u8))),
        }
    }

    /// Get a channel by id
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.channels.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Channel> {
        self.channels.iter_mut()
    }

    /// Aggregated running/done flags
    pub fn status(&self) -> GroupStatus {
        let running = self.channels.iter().any(Channel::is_running);
        let busy = self.channels.iter().any(Channel::is_busy);
        GroupStatus {
            running,
            done: running && !busy,
        }
    }

    /// Any channel still timing a step
    pub fn is_busy(&self) -> bool {
        self.status().is_busy()
    }

    /// Current output of every channel
    pub fn pump_reports(&self) -> [PumpReport; N] {
        core::array::from_fn(|i| self.channels[i].pump_report())
    }

    /// Last accepted step of every channel
    pub fn step_reports(&self) -> [StepReport; N] {
        core::array::from_fn(|i| self.channels[i].step_report())
    }
}

impl<const N: usize> Default for ChannelGroup<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::state::{ChannelEvent, StepRequest};
    use crate::traits::Direction;

    fn start(channel: &mut Channel, duration_ms: u32) {
        channel.begin_step(
            &StepRequest {
                on: true,
                speed: 1000,
                direction: Direction::Forward,
                duration_ms,
            },
            0,
        );
    }

    #[test]
    fn test_ids_follow_address_order() {
        let group = ChannelGroup::<3>::new();
        let ids: Vec<u8> = group.iter().map(|c| c.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_idle_group_status() {
        let group = ChannelGroup::<3>::new();
        let status = group.status();
        assert!(!status.running);
        assert!(!status.done);
        assert!(!group.is_busy());
    }

    #[test]
    fn test_one_running_channel_makes_group_busy() {
        let mut group = ChannelGroup::<3>::new();
        start(group.iter_mut().nth(1).unwrap(), 1000);

        let status = group.status();
        assert!(status.running);
        assert!(!status.done);
        assert!(group.is_busy());
    }

    #[test]
    fn test_group_done_when_all_running_channels_done() {
        let mut group = ChannelGroup::<3>::new();
        for channel in group.iter_mut().take(2) {
            start(channel, 1000);
        }

        group
            .iter_mut()
            .next()
            .unwrap()
            .apply(ChannelEvent::DurationElapsed);
        assert!(group.is_busy());

        group
            .iter_mut()
            .nth(1)
            .unwrap()
            .apply(ChannelEvent::DurationElapsed);
        let status = group.status();
        assert!(status.running);
        assert!(status.done);
        assert!(!group.is_busy());
    }

    #[test]
    fn test_get_out_of_range() {
        let group = ChannelGroup::<1>::new();
        assert!(group.get(ChannelId(0)).is_some());
        assert!(group.get(ChannelId(1)).is_none());
    }
}
