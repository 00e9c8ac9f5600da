//! Reusable process fixtures.
//!
//! - [`ConstantProcess`]: fires at a fixed rate and counts its own events.
//! - [`DrainProcess`]: moves one unit from a source to a destination at
//!   `k × source`.
//! - [`FailingProcess`]: fails deterministically after N firings.

use std::sync::atomic::{AtomicUsize, Ordering};

use ctmc_core::{PopulationId, PopulationSet, Populations, ProcessId, Rate, SimError};
use ctmc_process::Process;

fn fixture_rate(value: f64) -> Rate {
    Rate::new(value).expect("fixture rates are finite and non-negative")
}

/// Fixed rate, no reads; each firing increments `counter`.
///
/// Useful for testing selection frequencies: the rate never depends on
/// state, so the expected share of each channel is exact.
pub struct ConstantProcess {
    pub id: ProcessId,
    pub counter: PopulationId,
    pub rate: Rate,
}

impl ConstantProcess {
    pub fn new(id: ProcessId, counter: PopulationId, rate: f64) -> Self {
        Self {
            id,
            counter,
            rate: fixture_rate(rate),
        }
    }
}

impl Process for ConstantProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Constant"
    }

    fn reads(&self) -> PopulationSet {
        PopulationSet::new()
    }

    fn writes(&self) -> PopulationSet {
        [self.counter].into_iter().collect()
    }

    fn rate(&self, _: &Populations) -> Result<Rate, SimError> {
        Ok(self.rate)
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        populations.increment(self.counter)
    }
}

/// Reads `source`; moves one unit from `source` to `destination`.
pub struct DrainProcess {
    pub id: ProcessId,
    pub source: PopulationId,
    pub destination: PopulationId,
    pub unit_rate: Rate,
}

impl DrainProcess {
    pub fn new(id: ProcessId, source: PopulationId, destination: PopulationId, k: f64) -> Self {
        Self {
            id,
            source,
            destination,
            unit_rate: fixture_rate(k),
        }
    }
}

impl Process for DrainProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Drain"
    }

    fn reads(&self) -> PopulationSet {
        [self.source].into_iter().collect()
    }

    fn writes(&self) -> PopulationSet {
        [self.source, self.destination].into_iter().collect()
    }

    fn rate(&self, populations: &Populations) -> Result<Rate, SimError> {
        Ok(Rate::per_capita(self.unit_rate, populations.get(self.source)?))
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        populations.transfer(self.source, self.destination)
    }
}

/// Constant-rate process that fails after `succeed_count` firings.
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send` behind
/// `&self`.
pub struct FailingProcess {
    pub id: ProcessId,
    pub counter: PopulationId,
    pub succeed_count: usize,
    calls: AtomicUsize,
}

impl FailingProcess {
    pub fn new(id: ProcessId, counter: PopulationId, succeed_count: usize) -> Self {
        Self {
            id,
            counter,
            succeed_count,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Process for FailingProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Failing"
    }

    fn reads(&self) -> PopulationSet {
        PopulationSet::new()
    }

    fn writes(&self) -> PopulationSet {
        [self.counter].into_iter().collect()
    }

    fn rate(&self, _: &Populations) -> Result<Rate, SimError> {
        Ok(Rate::new(1.0)?)
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(SimError::InvariantViolation {
                reason: format!(
                    "deliberate failure after {} successful firings",
                    self.succeed_count
                ),
            });
        }
        populations.increment(self.counter)
    }
}
