//! Irreversible branching of one shared source into absorbing sinks.
//!
//! Every [`BranchPath`] reads the same source counter and fires at
//! `source × unit_rate(path)`. Firing moves one unit from the source into
//! the path's private sink. Because all paths read the source, every event
//! invalidates every propensity.
//!
//! `source + Σ sinks` is conserved and sinks never decrease.

use ctmc_core::{
    Event, PopulationId, PopulationSet, Populations, ProcessId, Rate, SimError,
};
use ctmc_process::{process_at, validate_processes, Dependents, Process, System};

/// One outgoing path from the shared source.
#[derive(Clone, Debug)]
pub struct BranchPath {
    id: ProcessId,
    source: PopulationId,
    sink: PopulationId,
    unit_rate: Rate,
}

impl BranchPath {
    /// Create a path draining `source` into `sink` at `unit_rate` per unit.
    pub fn new(id: ProcessId, source: PopulationId, sink: PopulationId, unit_rate: Rate) -> Self {
        Self {
            id,
            source,
            sink,
            unit_rate,
        }
    }

    /// The path's private sink.
    pub fn sink(&self) -> PopulationId {
        self.sink
    }

    /// Per-unit transition rate.
    pub fn unit_rate(&self) -> Rate {
        self.unit_rate
    }
}

impl Process for BranchPath {
    fn id(&self) -> ProcessId {
        self.id
    }

    fn name(&self) -> &str {
        "BranchPath"
    }

    fn reads(&self) -> PopulationSet {
        [self.source].into_iter().collect()
    }

    fn writes(&self) -> PopulationSet {
        [self.source, self.sink].into_iter().collect()
    }

    fn rate(&self, populations: &Populations) -> Result<Rate, SimError> {
        Ok(Rate::per_capita(self.unit_rate, populations.get(self.source)?))
    }

    fn fire(&self, populations: &mut Populations) -> Result<(), SimError> {
        populations.transfer(self.source, self.sink)
    }
}

/// A shared source feeding N absorbing sinks.
///
/// Population layout: `PopulationId(0)` is the source, `PopulationId(i + 1)`
/// is the sink of path `i`.
pub struct BifurcationSystem {
    processes: Vec<Box<dyn Process>>,
    populations: Populations,
    initial_source: u64,
}

const SOURCE: PopulationId = PopulationId(0);

impl BifurcationSystem {
    /// Build a system with `source` initial units and one path per unit rate.
    ///
    /// # Errors
    ///
    /// `EmptyProcessList` if `unit_rates` is empty; `InvalidValue` if any
    /// unit rate is negative or not finite.
    pub fn new(source: u64, unit_rates: &[f64]) -> Result<Self, SimError> {
        let mut populations = Populations::new();
        let source_id = populations.push(source)?;
        debug_assert_eq!(source_id, SOURCE);

        let mut processes: Vec<Box<dyn Process>> = Vec::with_capacity(unit_rates.len());
        for (i, &rate) in unit_rates.iter().enumerate() {
            let sink = populations.push(0)?;
            processes.push(Box::new(BranchPath::new(
                ProcessId(i as u32),
                SOURCE,
                sink,
                Rate::new(rate)?,
            )));
        }
        validate_processes(&processes, &populations)?;

        Ok(Self {
            processes,
            populations,
            initial_source: source,
        })
    }

    /// Units remaining in the shared source.
    pub fn source(&self) -> u64 {
        self.populations.get(SOURCE).unwrap_or(0)
    }

    /// Units absorbed by path `i`.
    pub fn sink(&self, i: usize) -> Result<u64, SimError> {
        if i >= self.processes.len() {
            return Err(SimError::IndexOutOfRange {
                what: "sink",
                index: i,
                len: self.processes.len(),
            });
        }
        self.populations.get_index(i + 1)
    }

    /// All sink counts in path order.
    pub fn sinks(&self) -> &[u64] {
        &self.populations.as_slice()[1..]
    }

    /// Number of paths.
    pub fn path_count(&self) -> usize {
        self.processes.len()
    }

    /// Source population at construction.
    pub fn initial_source(&self) -> u64 {
        self.initial_source
    }
}

impl System for BifurcationSystem {
    fn name(&self) -> &str {
        "BifurcationSystem"
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
        Ok(Dependents::All)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctmc_core::SimTime;
    use proptest::prelude::*;

    fn fire(system: &mut BifurcationSystem, path: u32) -> Result<Dependents, SimError> {
        system.apply(&Event::new(ProcessId(path), SimTime::ZERO))
    }

    fn rates(system: &BifurcationSystem) -> Vec<f64> {
        (0..system.path_count())
            .map(|i| system.rate(ProcessId(i as u32)).unwrap().value())
            .collect()
    }

    #[test]
    fn three_path_scenario() {
        let mut system = BifurcationSystem::new(100, &[1.0, 2.0, 3.0]).unwrap();
        for (path, times) in [(0, 1), (1, 2), (2, 3)] {
            for _ in 0..times {
                assert_eq!(fire(&mut system, path).unwrap(), Dependents::All);
            }
        }
        assert_eq!(system.source(), 94);
        assert_eq!(system.sinks(), &[1, 2, 3]);
        assert_eq!(system.sink(2).unwrap(), 3);
        assert_eq!(rates(&system), vec![94.0, 188.0, 282.0]);
    }

    #[test]
    fn empty_source_rejects_firing() {
        let mut system = BifurcationSystem::new(1, &[1.0, 1.0]).unwrap();
        fire(&mut system, 1).unwrap();
        assert_eq!(rates(&system), vec![0.0, 0.0]);
        let err = fire(&mut system, 0).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation { .. }));
        assert_eq!(system.sinks(), &[0, 1]);
    }

    #[test]
    fn sink_out_of_range() {
        let system = BifurcationSystem::new(5, &[1.0]).unwrap();
        assert!(matches!(
            system.sink(1),
            Err(SimError::IndexOutOfRange { what: "sink", index: 1, len: 1 })
        ));
    }

    #[test]
    fn construction_errors() {
        assert!(matches!(
            BifurcationSystem::new(10, &[]),
            Err(SimError::EmptyProcessList)
        ));
        assert!(matches!(
            BifurcationSystem::new(10, &[1.0, f64::NAN]),
            Err(SimError::InvalidValue(_))
        ));
    }

    proptest! {
        #[test]
        fn conservation_and_monotone_sinks(
            source in 0u64..200,
            picks in prop::collection::vec(0u32..4, 0..300),
        ) {
            let mut system = BifurcationSystem::new(source, &[0.5, 1.0, 1.5, 2.0]).unwrap();
            let mut previous = system.sinks().to_vec();
            for path in picks {
                if system.source() == 0 {
                    prop_assert!(fire(&mut system, path).is_err());
                } else {
                    fire(&mut system, path).unwrap();
                }
                let total = system.source() + system.sinks().iter().sum::<u64>();
                prop_assert_eq!(total, system.initial_source());
                for (now, before) in system.sinks().iter().zip(&previous) {
                    prop_assert!(now >= before);
                }
                previous = system.sinks().to_vec();
            }
        }
    }
}
