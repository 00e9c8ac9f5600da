//! Engine and trial configuration, validation, and error types.
//!
//! [`EngineConfig`] selects how propensities are held between events.
//! [`TrialConfig`] describes one seeded run and is checked by
//! [`validate()`](TrialConfig::validate) before any event is drawn.

use std::error::Error;
use std::fmt;

// ── SelectionStrategy ──────────────────────────────────────────────

/// How the engine obtains propensities and selects the firing channel.
///
/// Both strategies use half-open cumulative intervals and sample the same
/// distribution; they differ only in cost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Recompute every rate before each event and scan linearly.
    /// O(N) per event; nothing is cached.
    #[default]
    Direct,
    /// Keep rates in a binary sum tree, refresh only the dependency set
    /// returned by the system, and select by tree descent.
    /// O(|deps| log N) per event.
    Cached,
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Cached => write!(f, "cached"),
        }
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Propensity strategy. Default: [`SelectionStrategy::Direct`].
    pub strategy: SelectionStrategy,
    /// After every event, recompute all rates and fail with
    /// `InvariantViolation` if a process outside the reported dependency
    /// set changed. Default: on in debug builds, off in release.
    pub verify_dependencies: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strategy: SelectionStrategy::Direct,
            verify_dependencies: cfg!(debug_assertions),
        }
    }
}

impl EngineConfig {
    /// Default configuration with the cached strategy.
    pub fn cached() -> Self {
        Self {
            strategy: SelectionStrategy::Cached,
            ..Self::default()
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected by [`TrialConfig::validate()`] and
/// [`EnsembleConfig::validate()`](crate::EnsembleConfig::validate).
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Neither a horizon nor an event limit was given; a system with a
    /// birth channel would never stop.
    NoStopCondition,
    /// Horizon is NaN, infinite, or negative.
    InvalidHorizon {
        /// The invalid value.
        value: f64,
    },
    /// `max_events` is zero.
    ZeroEventLimit,
    /// An ensemble was configured with zero trials.
    ZeroTrials,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoStopCondition => {
                write!(f, "trial needs a horizon or an event limit")
            }
            Self::InvalidHorizon { value } => {
                write!(f, "horizon must be finite and non-negative, got {value}")
            }
            Self::ZeroEventLimit => write!(f, "max_events must be at least 1"),
            Self::ZeroTrials => write!(f, "ensemble needs at least one trial"),
        }
    }
}

impl Error for ConfigError {}

// ── TrialConfig ────────────────────────────────────────────────────

/// One seeded run of a simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct TrialConfig {
    /// Seed for the trial's `ChaCha8Rng` stream.
    pub seed: u64,
    /// Stop before the first event after this simulation time.
    pub horizon: Option<f64>,
    /// Stop after this many events.
    pub max_events: Option<u64>,
}

impl TrialConfig {
    /// Validate the stop conditions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.horizon.is_none() && self.max_events.is_none() {
            return Err(ConfigError::NoStopCondition);
        }
        if let Some(h) = self.horizon {
            if !h.is_finite() || h < 0.0 {
                return Err(ConfigError::InvalidHorizon { value: h });
            }
        }
        if self.max_events == Some(0) {
            return Err(ConfigError::ZeroEventLimit);
        }
        Ok(())
    }
}
