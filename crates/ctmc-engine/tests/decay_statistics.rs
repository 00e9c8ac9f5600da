//! Integration test: first-order decay matches its analytic expectation.
//!
//! For `P0` units decaying at rate `k`, the expected survivors at time `T`
//! are `P0 · e^{-kT}` with binomial variance `P0 · p · (1 - p)`.

use ctmc_core::SimTime;
use ctmc_engine::{run_ensemble, EngineConfig, EnsembleConfig, Simulation, StopReason};
use ctmc_processes::DecaySystem;
use ctmc_test_utils::seeded_rng;

#[test]
fn survivors_at_horizon_match_exponential_law() {
    let p0 = 10_000u64;
    let k: f64 = 0.5;
    let horizon: f64 = 2.0;
    let expected = p0 as f64 * (-k * horizon).exp();

    for (seed, config) in [(11, EngineConfig::default()), (12, EngineConfig::cached())] {
        let system = DecaySystem::new(&[(p0, k)]).unwrap();
        let mut sim = Simulation::with_config(system, config).unwrap();
        let summary = sim
            .advance_until(SimTime::new(horizon).unwrap(), &mut seeded_rng(seed))
            .unwrap();

        assert_eq!(summary.stop, StopReason::Horizon);
        let survivors = sim.system().population(0).unwrap() as f64;
        // Standard deviation is about 48; 250 is more than five of them.
        assert!(
            (survivors - expected).abs() < 250.0,
            "survivors {survivors}, expected {expected}"
        );
        assert_eq!(summary.events, p0 - survivors as u64);
    }
}

#[test]
fn ensemble_mean_survivors() {
    let config = EnsembleConfig {
        base_seed: 31,
        trials: 200,
        horizon: Some(1.0),
        max_events: None,
        engine: EngineConfig::cached(),
    };
    let outcomes = run_ensemble(
        &config,
        |_| DecaySystem::new(&[(100, 1.0)]),
        |sim| sim.system().total_population(),
    )
    .unwrap();

    let mean = outcomes.iter().map(|o| o.observation as f64).sum::<f64>() / outcomes.len() as f64;
    let expected = 100.0 * (-1.0f64).exp();
    // Standard error of the mean is about 0.34.
    assert!((mean - expected).abs() < 2.0, "mean survivors {mean}");
}

#[test]
fn independent_channels_decay_independently() {
    let system = DecaySystem::new(&[(5_000, 1.0), (5_000, 0.1)]).unwrap();
    let mut sim = Simulation::with_config(system, EngineConfig::cached()).unwrap();
    sim.advance_until(SimTime::new(1.0).unwrap(), &mut seeded_rng(8))
        .unwrap();

    let fast = sim.system().population(0).unwrap() as f64;
    let slow = sim.system().population(1).unwrap() as f64;
    assert!((fast - 5_000.0 * (-1.0f64).exp()).abs() < 200.0, "fast {fast}");
    assert!((slow - 5_000.0 * (-0.1f64).exp()).abs() < 200.0, "slow {slow}");
}
