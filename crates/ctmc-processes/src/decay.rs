//! First-order decay: independent channels, one counter each.
//!
//! Channel `i` owns population `i`, fires at `population × k_i`, and
//! removes one individual per firing. No channel reads another channel's
//! counter, so the dependency set of every event is the fired process.

use ctmc_core::{
    Event, PopulationId, PopulationSet, Populations, ProcessId, Rate, SimError,
};
use ctmc_process::{process_at, validate_processes, Dependents, Process, System};

/// A single decaying population.
#[derive(Clone, Debug)]
pub struct DecayProcess {
    id: ProcessId,
    population: PopulationId,
    unit_rate: Rate,
}

impl DecayProcess {
    /// Create a decay channel over `population` with per-capita rate `unit_rate`.
    pub fn new(id: ProcessId, population: PopulationId, unit_rate: Rate) -> Self {
        Self {
            id,
            population,
            unit_rate,
        }
    }

    /// The decaying counter.
    pub fn population(&self) -> PopulationId {
        self.population
    }

    /// Per-capita decay constant.
    pub fn unit_rate(&self) -> Rate {
        self.unit_rate
    }
}

impl Process for DecayProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Decay"
    }

    fn reads(&self) -> PopulationSet {
        [self.population].into_iter().collect()
    }

    fn writes(&self) -> PopulationSet {
        [self.population].into_iter().collect()
    }

    fn rate(&self, populations: &Populations) -> Result<Rate, SimError> {
        Ok(Rate::per_capita(
            self.unit_rate,
            populations.get(self.population)?,
        ))
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        populations.decrement(self.population)
    }
}

/// A set of independent decay channels.
pub struct DecaySystem {
    processes: Vec<Box<dyn Process>>,
    populations: Populations,
}

impl DecaySystem {
    /// Build one channel per `(initial_population, rate_constant)` pair.
    ///
    /// # Errors
    ///
    /// `EmptyProcessList` if `channels` is empty; `InvalidValue` if a rate
    /// constant is negative or not finite.
    pub fn new(channels: &[(u64, f64)]) -> Result<Self, SimError> {
        let mut populations = Populations::new();
        let mut processes: Vec<Box<dyn Process>> = Vec::with_capacity(channels.len());
        for (i, &(initial, k)) in channels.iter().enumerate() {
            let population = populations.push(initial)?;
            processes.push(Box::new(DecayProcess::new(
                ProcessId(i as u32),
                population,
                Rate::new(k)?,
            )));
        }
        validate_processes(&processes, &populations)?;
        Ok(Self {
            processes,
            populations,
        })
    }

    /// Remaining population of channel `i`.
    pub fn population(&self, i: usize) -> Result<u64, SimError> {
        self.populations.get_index(i)
    }

    /// Remaining population across all channels.
    pub fn total_population(&self) -> u64 {
        self.populations.total()
    }
}

impl System for DecaySystem {
    fn name(&self) -> &str {
        "DecaySystem"
    }

    fn processes(&self) -> &[Box<dyn Process>] {
        &self.processes
    }

    fn populations(&self) -> &Populations {
        &self.populations
    }

    fn apply(&mut self, event: &Event) -> Result<Dependents, SimError> {
        let process = process_at(&self.processes, event.process())?;
        process.fire(&mut self.populations)?;
        Ok(Dependents::one(event.process()))
    }
}
