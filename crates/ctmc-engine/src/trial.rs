//! Seeded trials and ensembles.
//!
//! A trial is one simulation driven by its own `ChaCha8Rng` stream until
//! a horizon, an event limit, or absorption. An ensemble runs many trials
//! of freshly built systems; trial `i` is seeded with
//! [`derive_seed(base, i)`](derive_seed) so every trial is reproducible on
//! its own and streams do not overlap in practice.

use std::error::Error;
use std::fmt;

use ctmc_core::{SimError, SimTime};
use ctmc_process::System;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{ConfigError, EngineConfig, TrialConfig};
use crate::simulation::{RunSummary, Simulation};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Seed for trial `trial` of an ensemble with base seed `base`.
///
/// SplitMix64 finalizer over `base ^ trial * γ`, so neighbouring trial
/// indices produce unrelated seeds.
pub fn derive_seed(base: u64, trial: u64) -> u64 {
    let mut z = base ^ trial.wrapping_mul(GOLDEN_GAMMA);
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ── TrialError ─────────────────────────────────────────────────────

/// Failure of a trial or ensemble.
#[derive(Clone, Debug, PartialEq)]
pub enum TrialError {
    /// The trial or ensemble configuration was rejected.
    Config(ConfigError),
    /// The simulation failed (construction, hook, or verification).
    Sim(SimError),
}

impl fmt::Display for TrialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid trial configuration: {e}"),
            Self::Sim(e) => write!(f, "simulation failed: {e}"),
        }
    }
}

impl Error for TrialError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Sim(e) => Some(e),
        }
    }
}

impl From<ConfigError> for TrialError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SimError> for TrialError {
    fn from(e: SimError) -> Self {
        Self::Sim(e)
    }
}

// ── run_trial ──────────────────────────────────────────────────────

/// Run one seeded trial on `sim`.
///
/// The horizon is an absolute simulation time. Absorption before either
/// bound is a normal outcome, reported as
/// [`StopReason::Absorbed`](crate::StopReason::Absorbed).
pub fn run_trial<S: System>(
    sim: &mut Simulation<S>,
    config: &TrialConfig,
) -> Result<RunSummary, TrialError> {
    config.validate()?;
    let horizon = config
        .horizon
        .map(SimTime::new)
        .transpose()
        .map_err(SimError::from)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let summary = sim.run(horizon, config.max_events, &mut rng)?;
    debug!(
        system = sim.system().name(),
        seed = config.seed,
        events = summary.events,
        end_time = summary.end_time.value(),
        stop = ?summary.stop,
        "trial finished"
    );
    Ok(summary)
}

// ── Ensembles ──────────────────────────────────────────────────────

/// Configuration for [`run_ensemble`].
#[derive(Clone, Debug, PartialEq)]
pub struct EnsembleConfig {
    /// Base seed; trial `i` uses `derive_seed(base_seed, i)`.
    pub base_seed: u64,
    /// Number of trials. Must be at least 1.
    pub trials: u32,
    /// Per-trial horizon.
    pub horizon: Option<f64>,
    /// Per-trial event limit.
    pub max_events: Option<u64>,
    /// Engine configuration used for every trial.
    pub engine: EngineConfig,
}

impl EnsembleConfig {
    /// Validate the trial count and the shared stop conditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        self.trial_config(0).validate()
    }

    /// Configuration of trial `trial`.
    pub fn trial_config(&self, trial: u32) -> TrialConfig {
        TrialConfig {
            seed: derive_seed(self.base_seed, u64::from(trial)),
            horizon: self.horizon,
            max_events: self.max_events,
        }
    }
}

/// Result of one ensemble trial.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialOutcome<O> {
    /// Trial index in `0..trials`.
    pub trial: u32,
    /// Seed the trial ran with.
    pub seed: u64,
    /// How the trial stopped.
    pub summary: RunSummary,
    /// What `observe` extracted from the final simulation.
    pub observation: O,
}

/// Run `config.trials` independent trials.
///
/// `build` receives the trial seed and returns a fresh system; `observe`
/// extracts whatever the caller needs from the finished simulation.
/// Trials run sequentially in index order. The first failure aborts the
/// ensemble.
pub fn run_ensemble<S, O, B, F>(
    config: &EnsembleConfig,
    mut build: B,
    mut observe: F,
) -> Result<Vec<TrialOutcome<O>>, TrialError>
where
    S: System,
    B: FnMut(u64) -> Result<S, SimError>,
    F: FnMut(&Simulation<S>) -> O,
{
    config.validate()?;
    let mut outcomes = Vec::with_capacity(config.trials as usize);
    for trial in 0..config.trials {
        let trial_config = config.trial_config(trial);
        let system = build(trial_config.seed)?;
        let mut sim = Simulation::with_config(system, config.engine.clone())?;
        let summary = run_trial(&mut sim, &trial_config)?;
        outcomes.push(TrialOutcome {
            trial,
            seed: trial_config.seed,
            summary,
            observation: observe(&sim),
        });
    }
    debug!(
        trials = config.trials,
        base_seed = config.base_seed,
        "ensemble finished"
    );
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StopReason;
    use ctmc_processes::{BifurcationSystem, DecaySystem};

    fn ensemble(trials: u32) -> EnsembleConfig {
        EnsembleConfig {
            base_seed: 99,
            trials,
            horizon: None,
            max_events: Some(1_000),
            engine: EngineConfig::default(),
        }
    }

    #[test]
    fn derive_seed_is_stable_and_spreads() {
        assert_eq!(derive_seed(1, 0), derive_seed(1, 0));
        assert_ne!(derive_seed(1, 0), derive_seed(1, 1));
        assert_ne!(derive_seed(1, 0), derive_seed(2, 0));
        let seeds: std::collections::HashSet<u64> = (0..1_000).map(|i| derive_seed(7, i)).collect();
        assert_eq!(seeds.len(), 1_000);
    }

    #[test]
    fn trial_rejects_bad_config() {
        let mut sim = Simulation::new(DecaySystem::new(&[(5, 1.0)]).unwrap()).unwrap();
        let config = TrialConfig {
            seed: 1,
            horizon: None,
            max_events: None,
        };
        assert_eq!(
            run_trial(&mut sim, &config),
            Err(TrialError::Config(ConfigError::NoStopCondition))
        );
        assert_eq!(sim.event_count(), 0);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let config = TrialConfig {
            seed: 2024,
            horizon: Some(0.5),
            max_events: None,
        };
        let mut a = Simulation::new(BifurcationSystem::new(100, &[1.0, 2.0, 3.0]).unwrap()).unwrap();
        let mut b = Simulation::new(BifurcationSystem::new(100, &[1.0, 2.0, 3.0]).unwrap()).unwrap();
        let sa = run_trial(&mut a, &config).unwrap();
        let sb = run_trial(&mut b, &config).unwrap();
        assert_eq!(sa, sb);
        assert_eq!(a.system().sinks(), b.system().sinks());
        assert_eq!(a.last_event(), b.last_event());
    }

    #[test]
    fn trial_stops_on_absorption_before_limit() {
        let mut sim = Simulation::new(BifurcationSystem::new(5, &[1.0]).unwrap()).unwrap();
        let config = TrialConfig {
            seed: 3,
            horizon: None,
            max_events: Some(100),
        };
        let summary = run_trial(&mut sim, &config).unwrap();
        assert_eq!(summary.stop, StopReason::Absorbed);
        assert_eq!(summary.events, 5);
    }

    #[test]
    fn ensemble_runs_every_trial_with_derived_seeds() {
        let config = ensemble(8);
        let outcomes = run_ensemble(
            &config,
            |_| BifurcationSystem::new(20, &[1.0, 1.0]),
            |sim| sim.system().sinks().to_vec(),
        )
        .unwrap();

        assert_eq!(outcomes.len(), 8);
        for (i, outcome) in outcomes.iter().enumerate() {
            assert_eq!(outcome.trial, i as u32);
            assert_eq!(outcome.seed, derive_seed(99, i as u64));
            assert_eq!(outcome.summary.stop, StopReason::Absorbed);
            assert_eq!(outcome.observation.iter().sum::<u64>(), 20);
        }
    }

    #[test]
    fn ensemble_is_reproducible() {
        let run = || {
            run_ensemble(
                &ensemble(4),
                |_| DecaySystem::new(&[(50, 1.0), (50, 2.0)]),
                |sim| sim.now(),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn ensemble_rejects_zero_trials() {
        let result = run_ensemble(
            &ensemble(0),
            |_| DecaySystem::new(&[(1, 1.0)]),
            |_| (),
        );
        assert_eq!(result, Err(TrialError::Config(ConfigError::ZeroTrials)));
    }

    #[test]
    fn ensemble_propagates_build_failure() {
        let result = run_ensemble(
            &ensemble(2),
            |_| DecaySystem::new(&[(1, -1.0)]),
            |_| (),
        );
        assert!(matches!(result, Err(TrialError::Sim(SimError::InvalidValue(_)))));
    }
}
