//! Integration test: one source branching irreversibly into three sinks.
//!
//! 100 units, unit rates 1, 2, 3. Every event moves one unit from the
//! source into exactly one sink, the total is conserved, sinks never
//! decrease, and the run ends absorbed with the source empty.

use ctmc_core::SimError;
use ctmc_engine::{
    run_ensemble, EngineConfig, EnsembleConfig, SelectionStrategy, SimState, Simulation,
    StopReason,
};
use ctmc_processes::BifurcationSystem;
use ctmc_test_utils::{seeded_rng, three_path_bifurcation};
use proptest::prelude::*;

#[test]
fn first_event_moves_one_unit() {
    let mut sim = Simulation::new(three_path_bifurcation()).unwrap();
    let event = sim.fire_next(&mut seeded_rng(1)).unwrap();

    let system = sim.system();
    assert_eq!(system.source(), 99);
    assert_eq!(system.sinks().iter().sum::<u64>(), 1);
    assert_eq!(system.sink(event.process().index()).unwrap(), 1);
    assert_eq!(sim.total_rate().unwrap().value(), 6.0 * 99.0);
}

#[test]
fn runs_to_absorption() {
    for config in [EngineConfig::default(), EngineConfig::cached()] {
        let mut sim = Simulation::with_config(three_path_bifurcation(), config).unwrap();
        let mut rng = seeded_rng(9);
        let summary = sim.run(None, None, &mut rng).unwrap();

        assert_eq!(summary.stop, StopReason::Absorbed);
        assert_eq!(summary.events, 100);
        assert_eq!(sim.state(), SimState::Absorbed);
        assert_eq!(sim.system().source(), 0);
        assert_eq!(sim.system().sinks().iter().sum::<u64>(), 100);

        let clock = sim.now();
        assert_eq!(sim.fire_next(&mut rng), Err(SimError::AbsorbedState));
        assert_eq!(sim.now(), clock);
        assert_eq!(sim.event_count(), 100);
    }
}

#[test]
fn sink_shares_follow_unit_rates() {
    let config = EnsembleConfig {
        base_seed: 5,
        trials: 100,
        horizon: None,
        max_events: Some(1_000),
        engine: EngineConfig::cached(),
    };
    let outcomes = run_ensemble(
        &config,
        |_| Ok(three_path_bifurcation()),
        |sim| sim.system().sinks().to_vec(),
    )
    .unwrap();

    let mut totals = [0u64; 3];
    for outcome in &outcomes {
        assert_eq!(outcome.summary.stop, StopReason::Absorbed);
        for (total, sink) in totals.iter_mut().zip(&outcome.observation) {
            *total += sink;
        }
    }
    let grand: u64 = totals.iter().sum();
    assert_eq!(grand, 100 * 100);
    for (i, &total) in totals.iter().enumerate() {
        let share = total as f64 / grand as f64;
        let expected = (i + 1) as f64 / 6.0;
        assert!((share - expected).abs() < 0.02, "sink {i} share {share}");
    }
}

#[test]
fn strategies_produce_identical_trajectories() {
    // Integer rates keep every sum exact, so both strategies see the same
    // totals and the same interval boundaries.
    let direct = EngineConfig {
        strategy: SelectionStrategy::Direct,
        verify_dependencies: true,
    };
    let cached = EngineConfig {
        strategy: SelectionStrategy::Cached,
        verify_dependencies: true,
    };
    let mut a = Simulation::with_config(three_path_bifurcation(), direct).unwrap();
    let mut b = Simulation::with_config(three_path_bifurcation(), cached).unwrap();
    let mut ra = seeded_rng(404);
    let mut rb = seeded_rng(404);
    for _ in 0..100 {
        assert_eq!(a.fire_next(&mut ra).unwrap(), b.fire_next(&mut rb).unwrap());
    }
    assert_eq!(a.system().sinks(), b.system().sinks());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn conservation_and_monotone_sinks(
        seed in any::<u64>(),
        source in 1u64..200,
        rates in prop::collection::vec(0.1f64..10.0, 1..6),
        cached in any::<bool>(),
    ) {
        let system = BifurcationSystem::new(source, &rates).unwrap();
        let config = if cached { EngineConfig::cached() } else { EngineConfig::default() };
        let mut sim = Simulation::with_config(system, config).unwrap();
        let mut rng = seeded_rng(seed);
        let mut previous = sim.system().sinks().to_vec();
        let mut last_time = sim.now();

        while !sim.is_absorbed() {
            let event = sim.fire_next(&mut rng).unwrap();
            prop_assert!(event.time() >= last_time);
            last_time = event.time();

            let system = sim.system();
            prop_assert_eq!(system.source() + system.sinks().iter().sum::<u64>(), source);
            for (now, before) in system.sinks().iter().zip(&previous) {
                prop_assert!(now >= before);
            }
            previous = system.sinks().to_vec();
        }
        prop_assert_eq!(sim.event_count(), source);
    }
}
