//! The [`System`] trait: process list, population arena, and the
//! dependency-aware update hook.

use ctmc_core::{Event, Populations, ProcessId, Rate, SimError};
use smallvec::SmallVec;

use crate::process::Process;

// ── Dependents ─────────────────────────────────────────────────────

/// Processes whose propensity may have changed after an event.
///
/// Returned by [`System::apply`]. The set is closed: every process whose
/// rate reads a counter the event mutated is included, and the engine
/// refreshes nothing else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dependents {
    /// Every process in the system (e.g. all paths share one source).
    All,
    /// Exactly these processes.
    Only(SmallVec<[ProcessId; 4]>),
}

impl Dependents {
    /// A single process, typically the one that just fired.
    pub fn one(id: ProcessId) -> Self {
        let mut ids = SmallVec::new();
        ids.push(id);
        Self::Only(ids)
    }

    /// Whether `id` is in the set.
    pub fn contains(&self, id: ProcessId) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&id),
        }
    }

    /// Number of processes in the set for a system of `process_count`.
    pub fn len(&self, process_count: usize) -> usize {
        match self {
            Self::All => process_count,
            Self::Only(ids) => ids.len(),
        }
    }

    /// Iterate the ids in the set for a system of `process_count`.
    pub fn iter(&self, process_count: usize) -> DependentsIter<'_> {
        match self {
            Self::All => DependentsIter::All(0..process_count as u32),
            Self::Only(ids) => DependentsIter::Only(ids.iter()),
        }
    }
}

impl From<&[ProcessId]> for Dependents {
    fn from(ids: &[ProcessId]) -> Self {
        Self::Only(ids.iter().copied().collect())
    }
}

/// Iterator over a [`Dependents`] set.
#[derive(Clone, Debug)]
pub enum DependentsIter<'a> {
    /// Every id in `0..len`.
    All(std::ops::Range<u32>),
    /// An explicit list.
    Only(std::slice::Iter<'a, ProcessId>),
}

impl Iterator for DependentsIter<'_> {
    type Item = ProcessId;

    fn next(&mut self) -> Option<ProcessId> {
        match self {
            Self::All(range) => range.next().map(ProcessId),
            Self::Only(iter) => iter.next().copied(),
        }
    }
}

// ── System ─────────────────────────────────────────────────────────

/// A continuous-time Markov system: ordered processes plus their counters.
///
/// Membership is fixed at construction. The engine only mutates state
/// through [`apply`](System::apply), which is the single code path holding
/// `&mut Populations` while an event is processed.
pub trait System: Send + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// The process list; `processes()[i].id() == ProcessId(i)`.
    fn processes(&self) -> &[Box<dyn Process>];

    /// Current population counters.
    fn populations(&self) -> &Populations;

    /// Apply a fired event and report which propensities may have changed.
    ///
    /// Implementations mutate exactly the counters the fired process is
    /// entitled to mutate. An out-of-range process id yields
    /// `IndexOutOfRange`; a counter driven below zero yields
    /// `InvariantViolation`.
    fn apply(&mut self, event: &Event) -> Result<Dependents, SimError>;

    /// Number of processes.
    fn process_count(&self) -> usize {
        self.processes().len()
    }

    /// Look up a process by id.
    fn process(&self, id: ProcessId) -> Result<&dyn Process, SimError> {
        process_at(self.processes(), id)
    }

    /// Current propensity of one process.
    fn rate(&self, id: ProcessId) -> Result<Rate, SimError> {
        self.process(id)?.rate(self.populations())
    }
}

/// Bounds-checked process lookup shared by system implementations.
pub fn process_at(processes: &[Box<dyn Process>], id: ProcessId) -> Result<&dyn Process, SimError> {
    processes
        .get(id.index())
        .map(|p| p.as_ref())
        .ok_or(SimError::IndexOutOfRange {
            what: "process",
            index: id.index(),
            len: processes.len(),
        })
}
