//! A fired event: which process, and when.

use std::fmt;

use crate::id::ProcessId;
use crate::value::SimTime;

/// Immutable record of one fired channel.
///
/// Created by the engine after sampling, or directly in tests to drive a
/// system's update hook by hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    process: ProcessId,
    time: SimTime,
}

impl Event {
    /// Record that `process` fired at `time`.
    pub fn new(process: ProcessId, time: SimTime) -> Self {
        Self { process, time }
    }

    /// The process that fired.
    pub fn process(&self) -> ProcessId {
        self.process
    }

    /// When it fired.
    pub fn time(&self) -> SimTime {
        self.time
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "process {} @ {}", self.process, self.time)
    }
}
