//! Stochastic simulation engine for continuous-time Markov systems.
//!
//! [`Simulation`] runs the Gillespie direct method over any
//! [`System`](ctmc_process::System): draw an exponential waiting time from
//! the total propensity, pick a channel in proportion to its rate, let the
//! system apply the event, then refresh only the propensities the system
//! reports as dependents.
//!
//! [`trial`] layers seeded trial and ensemble drivers on top.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod cache;
pub mod config;
pub mod metrics;
mod sampling;
pub mod simulation;
pub mod trial;

pub use config::{ConfigError, EngineConfig, SelectionStrategy, TrialConfig};
pub use metrics::EngineMetrics;
pub use simulation::{RunSummary, SimState, Simulation, StopReason};
pub use trial::{derive_seed, run_ensemble, run_trial, EnsembleConfig, TrialError, TrialOutcome};
