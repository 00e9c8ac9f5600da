//! ctmc: stochastic simulation of continuous-time Markov systems.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the ctmc sub-crates. For most users, adding `ctmc` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use ctmc::prelude::*;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! // 100 units draining along three paths with unit rates 1, 2, 3.
//! let system = BifurcationSystem::new(100, &[1.0, 2.0, 3.0]).unwrap();
//! let mut sim = Simulation::with_config(system, EngineConfig::cached()).unwrap();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//!
//! let summary = sim.run(None, None, &mut rng).unwrap();
//! assert_eq!(summary.stop, StopReason::Absorbed);
//! assert_eq!(summary.events, 100);
//! assert_eq!(sim.system().source(), 0);
//! assert_eq!(sim.system().sinks().iter().sum::<u64>(), 100);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ctmc-core` | Time, rates, ids, populations, events, errors |
//! | [`process`] | `ctmc-process` | `Process` and `System` traits, dependency graph |
//! | [`processes`] | `ctmc-processes` | Decay, bifurcation, and species systems |
//! | [`engine`] | `ctmc-engine` | Direct-method engine, trials, ensembles |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Value types, ids, the population arena, and errors (`ctmc-core`).
pub use ctmc_core as types;

/// Process and System traits (`ctmc-process`).
///
/// [`process::System::apply`] is the dependency-aware update hook.
pub use ctmc_process as process;

/// Reference systems (`ctmc-processes`).
pub use ctmc_processes as processes;

/// The direct-method engine and trial drivers (`ctmc-engine`).
pub use ctmc_engine as engine;

/// Common imports for typical ctmc usage.
///
/// ```rust
/// use ctmc::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use ctmc_core::{
        Event, PopulationId, PopulationSet, Populations, ProcessId, Rate, SimError, SimTime,
    };

    // Traits
    pub use ctmc_process::{Dependents, DependencyGraph, Process, System};

    // Reference systems
    pub use ctmc_processes::{BifurcationSystem, DecaySystem, SpeciesSystem};

    // Engine
    pub use ctmc_engine::{
        run_ensemble, run_trial, EngineConfig, EnsembleConfig, RunSummary, SelectionStrategy,
        SimState, Simulation, StopReason, TrialConfig, TrialError,
    };
}
