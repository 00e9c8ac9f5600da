//! Reference processes and systems for the ctmc simulation framework.
//!
//! Three system shapes cover the dependency patterns the engine has to
//! handle:
//!
//! - [`DecaySystem`]: independent first-order decay channels. Firing one
//!   channel never changes another's rate.
//! - [`BifurcationSystem`]: several irreversible paths draining one shared
//!   source into private sinks. Every firing changes every rate.
//! - [`SpeciesSystem`]: a multi-species network of birth, death, and
//!   transition channels. Dependents come from a [`DependencyGraph`].
//!
//! [`DependencyGraph`]: ctmc_process::DependencyGraph

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod bifurcation;
pub mod decay;
pub mod species;

pub use bifurcation::{BifurcationSystem, BranchPath};
pub use decay::{DecayProcess, DecaySystem};
pub use species::{
    BirthProcess, DeathProcess, SpeciesSystem, SpeciesSystemBuilder, TransitionProcess,
};
