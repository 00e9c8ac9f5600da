//! Process and System traits for ctmc simulations.
//!
//! A [`Process`] is one event channel: it reports a propensity computed
//! from the population arena and knows how to apply its own state change.
//! A [`System`] owns an ordered process list plus the arena, and is the
//! dependency-aware update hook the engine calls after every event.
//! [`DependencyGraph`] derives dependency sets from declared reads/writes.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dependency;
pub mod process;
pub mod system;

pub use dependency::{validate_processes, DependencyGraph, GraphError};
pub use process::Process;
pub use system::{process_at, Dependents, DependentsIter, System};
