//! Test utilities and mock types for ctmc development.
//!
//! Provides fixture processes, a [`MockSystem`] whose dependency reporting
//! can be made deliberately wrong, and canned systems for the scenarios
//! the engine tests keep coming back to.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use ctmc_core::{Event, Populations, ProcessId, SimError};
use ctmc_process::{process_at, Dependents, DependencyGraph, Process, System};
use ctmc_processes::{BifurcationSystem, DecaySystem};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// How a [`MockSystem`] answers the dependency question after an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reporting {
    /// Dependents from the declared reads/writes graph (correct).
    Graph,
    /// Every process (correct, conservative).
    All,
    /// Only the process that fired. Wrong whenever another process reads
    /// a counter the fired process writes.
    FiredOnly,
}

/// A system assembled from arbitrary boxed processes.
pub struct MockSystem {
    processes: Vec<Box<dyn Process>>,
    populations: Populations,
    graph: DependencyGraph,
    reporting: Reporting,
    applied: u64,
}

impl MockSystem {
    pub fn new(
        processes: Vec<Box<dyn Process>>,
        populations: Populations,
        reporting: Reporting,
    ) -> Result<Self, SimError> {
        let graph = DependencyGraph::build(&processes, &populations)?;
        Ok(Self {
            processes,
            populations,
            graph,
            reporting,
            applied: 0,
        })
    }

    /// Number of events applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

impl System for MockSystem {
    fn name(&self) -> &str {
        "MockSystem"
    }

    fn processes(&self) -> &[Box<dyn Process>] {
        &self.processes
    }

    fn populations(&self) -> &Populations {
        &self.populations
    }

    fn apply(&mut self, event: &Event) -> Result<Dependents, SimError> {
        process_at(&self.processes, event.process())?.fire(&mut self.populations)?;
        self.applied += 1;
        Ok(match self.reporting {
            Reporting::All => Dependents::All,
            Reporting::FiredOnly => Dependents::one(event.process()),
            Reporting::Graph => self
                .graph
                .dependents(event.process())
                .map(Dependents::from)
                .unwrap_or(Dependents::All),
        })
    }
}

/// Deterministic stream for tests.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// 100 units branching along three paths with unit rates 1, 2, 3.
pub fn three_path_bifurcation() -> BifurcationSystem {
    BifurcationSystem::new(100, &[1.0, 2.0, 3.0]).expect("valid bifurcation fixture")
}

/// `channels` identical decay channels of `initial` units at rate `k`.
pub fn uniform_decay(channels: usize, initial: u64, k: f64) -> DecaySystem {
    let layout: Vec<(u64, f64)> = (0..channels).map(|_| (initial, k)).collect();
    DecaySystem::new(&layout).expect("valid decay fixture")
}

/// Two paths sharing one source, reported with `reporting`.
///
/// With [`Reporting::FiredOnly`] the engine's dependency verification
/// must reject the first event.
pub fn shared_source(reporting: Reporting) -> MockSystem {
    use fixtures::DrainProcess;
    let mut populations = Populations::new();
    let source = populations.push(50).expect("fresh arena");
    let left = populations.push(0).expect("fresh arena");
    let right = populations.push(0).expect("fresh arena");
    let processes: Vec<Box<dyn Process>> = vec![
        Box::new(DrainProcess::new(ProcessId(0), source, left, 1.0)),
        Box::new(DrainProcess::new(ProcessId(1), source, right, 1.0)),
    ];
    MockSystem::new(processes, populations, reporting).expect("valid shared-source fixture")
}
