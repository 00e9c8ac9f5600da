//! Multi-species birth, death, and transition networks.
//!
//! Each species is one population counter. Channels are mass-action in
//! their source species:
//!
//! | Channel | Rate | Effect |
//! |---------|------|--------|
//! | [`BirthProcess`] | `n(s) × b` | `s += 1` |
//! | [`DeathProcess`] | `n(s) × d` | `s -= 1` |
//! | [`TransitionProcess`] | `n(src) × t` | `src -= 1`, `dst += 1` |
//!
//! [`SpeciesSystem`] precomputes a [`DependencyGraph`] so that an event
//! only invalidates the channels reading a species it touched.
//! Transitions conserve the total population; births and deaths do not.

use ctmc_core::{
    Event, PopulationId, PopulationSet, Populations, ProcessId, Rate, SimError,
};
use ctmc_process::{process_at, DependencyGraph, Dependents, Process, System};

// ── Processes ──────────────────────────────────────────────────────

/// Per-capita reproduction of one species.
#[derive(Clone, Debug)]
pub struct BirthProcess {
    id: ProcessId,
    species: PopulationId,
    unit_rate: Rate,
}

impl BirthProcess {
    /// Create a birth channel for `species`.
    pub fn new(id: ProcessId, species: PopulationId, unit_rate: Rate) -> Self {
        Self {
            id,
            species,
            unit_rate,
        }
    }
}

impl Process for BirthProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Birth"
    }

    fn reads(&self) -> PopulationSet {
        [self.species].into_iter().collect()
    }

    fn writes(&self) -> PopulationSet {
        [self.species].into_iter().collect()
    }

    fn rate(&self, populations: &Populations) -> Result<Rate, SimError> {
        Ok(Rate::per_capita(self.unit_rate, populations.get(self.species)?))
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        populations.increment(self.species)
    }
}

/// Per-capita death of one species.
#[derive(Clone, Debug)]
pub struct DeathProcess {
    id: ProcessId,
    species: PopulationId,
    unit_rate: Rate,
}

impl DeathProcess {
    /// Create a death channel for `species`.
    pub fn new(id: ProcessId, species: PopulationId, unit_rate: Rate) -> Self {
        Self {
            id,
            species,
            unit_rate,
        }
    }
}

impl Process for DeathProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Death"
    }

    fn reads(&self) -> PopulationSet {
        [self.species].into_iter().collect()
    }

    fn writes(&self) -> PopulationSet {
        [self.species].into_iter().collect()
    }

    fn rate(&self, populations: &Populations) -> Result<Rate, SimError> {
        Ok(Rate::per_capita(self.unit_rate, populations.get(self.species)?))
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        populations.decrement(self.species)
    }
}

/// Per-capita conversion of one species into another.
#[derive(Clone, Debug)]
pub struct TransitionProcess {
    id: ProcessId,
    source: PopulationId,
    destination: PopulationId,
    unit_rate: Rate,
}

impl TransitionProcess {
    /// Create a channel moving individuals from `source` to `destination`.
    pub fn new(
        id: ProcessId,
        source: PopulationId,
        destination: PopulationId,
        unit_rate: Rate,
    ) -> Self {
        Self {
            id,
            source,
            destination,
            unit_rate,
        }
    }
}

impl Process for TransitionProcess {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "Transition"
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

// ── System ─────────────────────────────────────────────────────────

/// A multi-species population network.
///
/// Constructed via [`SpeciesSystem::builder`].
pub struct SpeciesSystem {
    processes: Vec<Box<dyn Process>>,
    populations: Populations,
    graph: DependencyGraph,
    species_names: Vec<String>,
}

enum Channel {
    Birth(PopulationId, f64),
    Death(PopulationId, f64),
    Transition(PopulationId, PopulationId, f64),
}

/// Builder for [`SpeciesSystem`].
///
/// Species and channels are declared in order; channel `i` becomes
/// `ProcessId(i)`. Rate constants are validated in [`build`](Self::build).
#[derive(Default)]
pub struct SpeciesSystemBuilder {
    populations: Populations,
    species_names: Vec<String>,
    channels: Vec<Channel>,
}

impl SpeciesSystemBuilder {
    /// Declare a species with its initial population.
    ///
    /// Fails with `IndexOutOfRange` if the arena has no ids left.
    pub fn species(&mut self, name: &str, initial: u64) -> Result<PopulationId, SimError> {
        let id = self.populations.push(initial)?;
        self.species_names.push(name.to_string());
        Ok(id)
    }

    /// Add a birth channel; returns its process id.
    pub fn birth(&mut self, species: PopulationId, unit_rate: f64) -> ProcessId {
        self.push(Channel::Birth(species, unit_rate))
    }

    /// Add a death channel; returns its process id.
    pub fn death(&mut self, species: PopulationId, unit_rate: f64) -> ProcessId {
        self.push(Channel::Death(species, unit_rate))
    }

    /// Add a transition channel; returns its process id.
    pub fn transition(
        &mut self,
        source: PopulationId,
        destination: PopulationId,
        unit_rate: f64,
    ) -> ProcessId {
        self.push(Channel::Transition(source, destination, unit_rate))
    }

    fn push(&mut self, channel: Channel) -> ProcessId {
        let id = ProcessId(self.channels.len() as u32);
        self.channels.push(channel);
        id
    }

    /// Build the system, validating rates and population references.
    ///
    /// # Errors
    ///
    /// - `EmptyProcessList` if no channels were declared
    /// - `InvalidValue` if a rate constant is negative or not finite
    /// - `IndexOutOfRange` if a channel references an undeclared species
    pub fn build(self) -> Result<SpeciesSystem, SimError> {
        let mut processes: Vec<Box<dyn Process>> = Vec::with_capacity(self.channels.len());
        for (i, channel) in self.channels.into_iter().enumerate() {
            let id = ProcessId(i as u32);
            let process: Box<dyn Process> = match channel {
                Channel::Birth(s, k) => Box::new(BirthProcess::new(id, s, Rate::new(k)?)),
                Channel::Death(s, k) => Box::new(DeathProcess::new(id, s, Rate::new(k)?)),
                Channel::Transition(src, dst, k) => {
                    Box::new(TransitionProcess::new(id, src, dst, Rate::new(k)?))
                }
            };
            processes.push(process);
        }

        let graph = DependencyGraph::build(&processes, &self.populations)?;

        Ok(SpeciesSystem {
            processes,
            populations: self.populations,
            graph,
            species_names: self.species_names,
        })
    }
}

impl SpeciesSystem {
    /// Start declaring a new system.
    pub fn builder() -> SpeciesSystemBuilder {
        SpeciesSystemBuilder::default()
    }

    /// Current population of one species.
    pub fn population(&self, species: PopulationId) -> Result<u64, SimError> {
        self.populations.get(species)
    }

    /// Number of declared species.
    pub fn species_count(&self) -> usize {
        self.populations.len()
    }

    /// Name given to a species at declaration.
    pub fn species_name(&self, species: PopulationId) -> Option<&str> {
        self.species_names.get(species.index()).map(String::as_str)
    }

    /// Total individuals across all species.
    pub fn total_population(&self) -> u64 {
        self.populations.total()
    }

    /// The precomputed dependency tables.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }
}

impl System for SpeciesSystem {
    fn name(&self) -> &str {
        "SpeciesSystem"
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
        let dependents = self.graph.dependents(event.process()).ok_or_else(|| {
            SimError::InvariantViolation {
                reason: format!("no dependency entry for process {}", event.process()),
            }
        })?;
        Ok(Dependents::from(dependents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctmc_core::SimTime;
    use proptest::prelude::*;

    struct Sir {
        system: SpeciesSystem,
        s: PopulationId,
        i: PopulationId,
        r: PopulationId,
        infect: ProcessId,
        recover: ProcessId,
        birth: ProcessId,
        death: ProcessId,
    }

    fn sir() -> Sir {
        let mut b = SpeciesSystem::builder();
        let s = b.species("S", 50).unwrap();
        let i = b.species("I", 10).unwrap();
        let r = b.species("R", 0).unwrap();
        let infect = b.transition(s, i, 0.3);
        let recover = b.transition(i, r, 0.1);
        let birth = b.birth(s, 0.02);
        let death = b.death(r, 0.01);
        Sir {
            system: b.build().unwrap(),
            s,
            i,
            r,
            infect,
            recover,
            birth,
            death,
        }
    }

    fn fire(system: &mut SpeciesSystem, id: ProcessId) -> Result<Dependents, SimError> {
        system.apply(&Event::new(id, SimTime::ZERO))
    }

    #[test]
    fn transition_moves_one_individual() {
        let mut m = sir();
        fire(&mut m.system, m.infect).unwrap();
        assert_eq!(m.system.population(m.s).unwrap(), 49);
        assert_eq!(m.system.population(m.i).unwrap(), 11);
        assert_eq!(m.system.total_population(), 60);
    }

    #[test]
    fn birth_and_death_change_totals() {
        let mut m = sir();
        fire(&mut m.system, m.birth).unwrap();
        assert_eq!(m.system.population(m.s).unwrap(), 51);
        fire(&mut m.system, m.recover).unwrap();
        fire(&mut m.system, m.death).unwrap();
        assert_eq!(m.system.population(m.r).unwrap(), 0);
        assert_eq!(m.system.total_population(), 60);
    }

    #[test]
    fn dependents_are_readers_of_touched_species() {
        let mut m = sir();
        // infect writes S and I: readers are infect, birth (S) and recover (I).
        let deps = fire(&mut m.system, m.infect).unwrap();
        for id in [m.infect, m.birth, m.recover] {
            assert!(deps.contains(id), "missing {id}");
        }
        assert!(!deps.contains(m.death));

        // death writes R: only death reads R.
        fire(&mut m.system, m.recover).unwrap();
        let deps = fire(&mut m.system, m.death).unwrap();
        assert_eq!(deps, Dependents::one(m.death));
    }

    #[test]
    fn death_of_empty_species_fails() {
        let mut m = sir();
        let err = fire(&mut m.system, m.death).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation { .. }));
    }

    #[test]
    fn species_names_kept() {
        let m = sir();
        assert_eq!(m.system.species_count(), 3);
        assert_eq!(m.system.species_name(m.i), Some("I"));
        assert_eq!(m.system.species_name(PopulationId(7)), None);
    }

    #[test]
    fn build_errors() {
        assert!(matches!(
            SpeciesSystem::builder().build(),
            Err(SimError::EmptyProcessList)
        ));

        let mut b = SpeciesSystem::builder();
        let a = b.species("A", 1).unwrap();
        b.birth(a, -0.5);
        assert!(matches!(b.build(), Err(SimError::InvalidValue(_))));

        let mut b = SpeciesSystem::builder();
        b.species("A", 1).unwrap();
        b.death(PopulationId(4), 1.0);
        assert!(matches!(
            b.build(),
            Err(SimError::IndexOutOfRange { what: "population", index: 4, .. })
        ));
    }

    proptest! {
        #[test]
        fn pure_transitions_conserve_total(
            start in prop::collection::vec(0u64..30, 3),
            picks in prop::collection::vec(0u32..3, 0..200),
        ) {
            let mut b = SpeciesSystem::builder();
            let ids: Vec<_> = start
                .iter()
                .enumerate()
                .map(|(n, &c)| b.species(&format!("X{n}"), c).unwrap())
                .collect();
            b.transition(ids[0], ids[1], 1.0);
            b.transition(ids[1], ids[2], 1.0);
            b.transition(ids[2], ids[0], 1.0);
            let mut system = b.build().unwrap();
            let total: u64 = start.iter().sum();

            for p in picks {
                let id = ProcessId(p);
                if system.rate(id).unwrap().is_zero() {
                    prop_assert!(fire(&mut system, id).is_err());
                } else {
                    fire(&mut system, id).unwrap();
                }
                prop_assert_eq!(system.total_population(), total);
            }
        }
    }
}
