//! Process list validation and dependency-graph construction.
//!
//! [`DependencyGraph::build`] runs once at system construction. It checks
//! the process list for structural errors and precomputes, for every
//! process, the closed set of processes whose rate reads a counter that
//! process writes. The per-event hot path is then a table lookup.

use std::error::Error;
use std::fmt;

use ctmc_core::{PopulationId, Populations, ProcessId, SimError};
use indexmap::IndexSet;

use crate::process::Process;

// ── Errors ─────────────────────────────────────────────────────────

/// Errors from process list validation (construction-time, not per-event).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No processes registered.
    EmptyProcessList,

    /// A process id does not match its position in the list.
    NonContiguousId {
        /// Position in the process list.
        position: usize,
        /// The id the process reported.
        id: ProcessId,
        /// Which process.
        process: String,
    },

    /// A process references a population not present in the arena.
    UndefinedPopulation {
        /// Which process.
        process: String,
        /// The missing population.
        population: PopulationId,
        /// Number of populations in the arena.
        defined: usize,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyProcessList => write!(f, "system has no processes"),
            Self::NonContiguousId {
                position,
                id,
                process,
            } => write!(
                f,
                "process '{process}' at position {position} reports id {id}"
            ),
            Self::UndefinedPopulation {
                process,
                population,
                defined,
            } => write!(
                f,
                "process '{process}' references undefined population {population} \
                 ({defined} defined)"
            ),
        }
    }
}

impl Error for GraphError {}

impl From<GraphError> for SimError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::EmptyProcessList => SimError::EmptyProcessList,
            GraphError::UndefinedPopulation {
                population,
                defined,
                ..
            } => SimError::IndexOutOfRange {
                what: "population",
                index: population.index(),
                len: defined,
            },
            other @ GraphError::NonContiguousId { .. } => SimError::InvariantViolation {
                reason: other.to_string(),
            },
        }
    }
}

// ── Validation ─────────────────────────────────────────────────────

/// Check that a process list is non-empty, indexed `0..N` in order, and
/// only references populations present in `populations`.
pub fn validate_processes(
    processes: &[Box<dyn Process>],
    populations: &Populations,
) -> Result<(), GraphError> {
    if processes.is_empty() {
        return Err(GraphError::EmptyProcessList);
    }

    for (position, process) in processes.iter().enumerate() {
        if process.id().index() != position {
            return Err(GraphError::NonContiguousId {
                position,
                id: process.id(),
                process: process.name().to_string(),
            });
        }
        for population in process.reads().into_iter().chain(process.writes()) {
            if !populations.contains(population) {
                return Err(GraphError::UndefinedPopulation {
                    process: process.name().to_string(),
                    population,
                    defined: populations.len(),
                });
            }
        }
    }

    Ok(())
}

// ── Graph ──────────────────────────────────────────────────────────

/// Precomputed reader/dependent tables for a validated process list.
#[derive(Debug, Clone)]
#[must_use]
pub struct DependencyGraph {
    /// `readers[population]`: processes whose rate reads that population.
    readers: Vec<Vec<ProcessId>>,
    /// `dependents[process]`: readers of everything that process writes,
    /// in first-seen order, without duplicates.
    dependents: Vec<Vec<ProcessId>>,
}

impl DependencyGraph {
    /// Validate `processes` and build the dependency tables.
    pub fn build(
        processes: &[Box<dyn Process>],
        populations: &Populations,
    ) -> Result<Self, GraphError> {
        validate_processes(processes, populations)?;

        let mut readers: Vec<Vec<ProcessId>> = vec![Vec::new(); populations.len()];
        for process in processes {
            let mut seen: IndexSet<PopulationId> = IndexSet::new();
            for population in process.reads() {
                if seen.insert(population) {
                    readers[population.index()].push(process.id());
                }
            }
        }

        let dependents = processes
            .iter()
            .map(|process| {
                let mut set: IndexSet<ProcessId> = IndexSet::new();
                for population in process.writes() {
                    set.extend(readers[population.index()].iter().copied());
                }
                set.into_iter().collect()
            })
            .collect();

        Ok(Self {
            readers,
            dependents,
        })
    }

    /// Number of processes covered.
    pub fn len(&self) -> usize {
        self.dependents.len()
    }

    /// Whether the graph covers zero processes.
    pub fn is_empty(&self) -> bool {
        self.dependents.is_empty()
    }

    /// Processes whose rate may change when `process` fires.
    pub fn dependents(&self, process: ProcessId) -> Option<&[ProcessId]> {
        self.dependents.get(process.index()).map(Vec::as_slice)
    }

    /// Processes whose rate reads `population`.
    pub fn readers(&self, population: PopulationId) -> Option<&[ProcessId]> {
        self.readers.get(population.index()).map(Vec::as_slice)
    }
}
