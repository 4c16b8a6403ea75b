//! Per-channel state machine
//!
//! Every pump channel moves through `Idle → Running → Done → Idle`.
//! `Done` lasts exactly one scheduler tick: the channel is still reported as
//! running, but its output has already been stopped and its completion
//! event sent.

use pumpstep_protocol::{PumpReport, StepReport};

use crate::traits::{ChannelId, Direction};

/// Monotonic millisecond timestamp
///
/// The counter wraps after ~49 days; elapsed times are computed with
/// wrapping subtraction so a step spanning the wrap still completes.
pub type Millis = u32;

/// Channel phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelPhase {
    /// No step in progress
    #[default]
    Idle,
    /// Step accepted, waiting for its duration to elapse
    Running,
    /// Duration elapsed and output stopped; cleared on the next tick
    Done,
}

/// Events that move a channel between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelEvent {
    /// Step accepted for this channel
    Start {
        /// Requested output state
        on: bool,
    },
    /// Requested duration has elapsed
    DurationElapsed,
    /// One tick has passed since the step was marked done
    Settle,
    /// Forced stop
    Stop,
}

impl ChannelPhase {
    /// Process an event and return the next phase
    pub fn transition(self, event: ChannelEvent) -> Self {
        use ChannelEvent::*;
        use ChannelPhase::*;

        match (self, event) {
            // Busy guard is enforced by the command handler, not here
            (_, Start { on: true }) => Running,
            (_, Start { on: false }) => Idle,

            (Running, DurationElapsed) => Done,
            (Done, Settle) => Idle,

            (_, Stop) => Idle,

            // Default: stay in current phase
            _ => self,
        }
    }

    /// Step flag: true from acceptance until the done step is cleared
    pub fn is_running(self) -> bool {
        self != ChannelPhase::Idle
    }

    /// Done flag: only meaningful while running
    pub fn is_done(self) -> bool {
        self == ChannelPhase::Done
    }
}

/// Requested step for one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepRequest {
    /// Output enabled for this step
    pub on: bool,
    /// Commanded speed (already clamped to the configured maximum)
    pub speed: u16,
    /// Rotation direction
    pub direction: Direction,
    /// Step duration in milliseconds
    pub duration_ms: u32,
}

/// One pump channel
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    id: ChannelId,
    phase: ChannelPhase,
    speed: u16,
    direction: Direction,
    requested_duration_ms: u32,
    start_ms: Millis,
}

impl Channel {
    /// Create an idle channel
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            phase: ChannelPhase::Idle,
            speed: 0,
            direction: Direction::Forward,
            requested_duration_ms: 0,
            start_ms: 0,
        }
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn phase(&self) -> ChannelPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }

    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }

    /// Running and not yet done: blocks new steps for the whole group
    pub fn is_busy(&self) -> bool {
        self.phase == ChannelPhase::Running
    }

    /// Output is energized (done channels have already been stopped)
    pub fn output_on(&self) -> bool {
        self.phase == ChannelPhase::Running
    }

    pub fn speed(&self) -> u16 {
        self.speed
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn requested_duration_ms(&self) -> u32 {
        self.requested_duration_ms
    }

    pub fn start_ms(&self) -> Millis {
        self.start_ms
    }

    /// Apply a phase event
    pub fn apply(&mut self, event: ChannelEvent) {
        self.phase = self.phase.transition(event);
    }

    /// Record an accepted step and restart timing
    pub fn begin_step(&mut self, request: &StepRequest, now: Millis) {
        self.speed = request.speed;
        self.direction = request.direction;
        self.requested_duration_ms = request.duration_ms;
        self.start_ms = now;
        self.apply(ChannelEvent::Start { on: request.on });
    }

    /// Time since the step started, only while the step is timing
    pub fn elapsed_ms(&self, now: Millis) -> Option<u32> {
        if self.phase == ChannelPhase::Running {
            Some(now.wrapping_sub(self.start_ms))
        } else {
            None
        }
    }

    /// Check if a running step has reached its requested duration
    pub fn duration_elapsed(&self, now: Millis) -> bool {
        self.elapsed_ms(now)
            .is_some_and(|elapsed| elapsed >= self.requested_duration_ms)
    }

    /// Current output, as reported by GetState
    pub fn pump_report(&self) -> PumpReport {
        PumpReport {
            running: self.output_on(),
            speed: self.speed,
            forward: self.direction.is_forward(),
        }
    }

    /// Last accepted step, as reported by GetLastStep
    pub fn step_report(&self) -> StepReport {
        StepReport {
            duration_ms: self.requested_duration_ms,
            running: self.is_running(),
            speed: self.speed,
            forward: self.direction.is_forward(),
        }
    }
}
