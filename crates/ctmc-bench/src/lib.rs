//! Benchmark profiles for the ctmc simulation engine.
//!
//! Provides pre-built systems sized to expose the difference between the
//! direct and cached selection strategies:
//!
//! - [`wide_decay_profile`]: many independent decay channels, one
//!   dependent per event
//! - [`species_chain_profile`]: a linear transition chain, two or three
//!   dependents per event
//! - [`bifurcation_profile`]: one shared source, every process dependent
//!   on every event

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ctmc_core::SimError;
use ctmc_processes::{BifurcationSystem, DecaySystem, SpeciesSystem};

/// `channels` independent decay channels with `initial` units each.
///
/// Unit rates are spread deterministically over `[0.5, 1.5)` from `seed`
/// so the cumulative distribution is not flat.
pub fn wide_decay_profile(channels: usize, initial: u64, seed: u64) -> Result<DecaySystem, SimError> {
    let layout: Vec<(u64, f64)> = (0..channels)
        .map(|i| (initial, 0.5 + spread(seed, i as u64)))
        .collect();
    DecaySystem::new(&layout)
}

/// `length` species in a chain: birth into the head, transitions along the
/// chain, death out of the tail.
pub fn species_chain_profile(length: usize, initial: u64) -> Result<SpeciesSystem, SimError> {
    let mut builder = SpeciesSystem::builder();
    let species = (0..length)
        .map(|i| builder.species(&format!("S{i}"), initial))
        .collect::<Result<Vec<_>, _>>()?;
    if let (Some(&head), Some(&tail)) = (species.first(), species.last()) {
        builder.birth(head, 0.1);
        for pair in species.windows(2) {
            builder.transition(pair[0], pair[1], 1.0);
        }
        builder.death(tail, 1.0);
    }
    builder.build()
}

/// `paths` branches draining a source of `source` units.
pub fn bifurcation_profile(paths: usize, source: u64) -> Result<BifurcationSystem, SimError> {
    let rates: Vec<f64> = (1..=paths).map(|k| k as f64).collect();
    BifurcationSystem::new(source, &rates)
}

/// Deterministic value in `[0, 1)` for `(seed, i)`.
fn spread(seed: u64, i: u64) -> f64 {
    let z = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(i.wrapping_mul(1442695040888963407));
    (z >> 11) as f64 / (1u64 << 53) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctmc_engine::Simulation;

    #[test]
    fn wide_decay_profile_builds() {
        let system = wide_decay_profile(1_000, 10, 42).unwrap();
        assert_eq!(system.total_population(), 10_000);
        let sim = Simulation::new(system).unwrap();
        assert_eq!(sim.process_count(), 1_000);
        let total = sim.total_rate().unwrap().value();
        assert!(total > 5_000.0 && total < 15_000.0, "total rate {total}");
    }

    #[test]
    fn species_chain_profile_builds() {
        let system = species_chain_profile(50, 20).unwrap();
        assert_eq!(system.species_count(), 50);
        // One birth, 49 transitions, one death.
        assert_eq!(Simulation::new(system).unwrap().process_count(), 51);
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(matches!(
            species_chain_profile(0, 1),
            Err(SimError::EmptyProcessList)
        ));
    }

    #[test]
    fn spread_is_deterministic_and_bounded() {
        for i in 0..1_000 {
            let v = spread(7, i);
            assert!((0.0..1.0).contains(&v));
            assert_eq!(v, spread(7, i));
        }
    }
}
