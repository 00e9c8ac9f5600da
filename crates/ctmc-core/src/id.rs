//! Strongly-typed identifiers and the [`PopulationSet`] type alias.

use smallvec::SmallVec;
use std::fmt;

/// Identifies a process (event channel) within a system.
///
/// Assigned at system construction; `ProcessId(n)` is the n-th entry of
/// the system's process list and never changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcessId(pub u32);

impl ProcessId {
    /// The id as a slice index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The id for slice index `index`, or `None` if it does not fit in `u32`.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ProcessId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Handle to one counter in a [`Populations`](crate::Populations) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PopulationId(pub u32);

impl PopulationId {
    /// The id as a slice index.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// The id for slice index `index`, or `None` if it does not fit in `u32`.
    pub fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(Self)
    }
}

impl fmt::Display for PopulationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PopulationId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// The populations a process reads or writes.
///
/// Inline storage for two handles covers every reference process
/// (a transition touches source and destination).
pub type PopulationSet = SmallVec<[PopulationId; 2]>;
