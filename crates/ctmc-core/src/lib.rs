//! Core types for the ctmc stochastic simulation framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types shared by every other crate in the workspace:
//! simulation time and rates, process and population identifiers, the
//! population counter arena, fired events, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod event;
pub mod id;
pub mod population;
pub mod value;

pub use error::{SimError, ValueError};
pub use event::Event;
pub use id::{PopulationId, PopulationSet, ProcessId};
pub use population::Populations;
pub use value::{Rate, SimTime};
