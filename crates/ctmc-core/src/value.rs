//! Non-negative scalar wrappers: [`SimTime`] and [`Rate`].
//!
//! Both reject negative, NaN, and infinite input at construction, which
//! makes a total order sound and lets the engine skip re-validation on
//! every step.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::ValueError;

fn check(what: &'static str, value: f64) -> Result<f64, ValueError> {
    if value.is_finite() && value >= 0.0 {
        // Normalise -0.0 so equality and hashing of the bits agree.
        Ok(value + 0.0)
    } else {
        Err(ValueError::InvalidValue { what, value })
    }
}

// ── SimTime ────────────────────────────────────────────────────────

/// A point on the simulation clock.
///
/// Zero at trial start and non-decreasing across an engine's lifetime.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimTime(f64);

impl SimTime {
    /// The start of a trial.
    pub const ZERO: Self = Self(0.0);

    /// Construct from a finite, non-negative value.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        check("simulation time", value).map(Self)
    }

    /// The raw value.
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for SimTime {
    type Output = Self;

    /// Saturates at `f64::MAX` so the result stays finite.
    fn add(self, rhs: Self) -> Self {
        Self((self.0 + rhs.0).min(f64::MAX))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t={}", self.0)
    }
}

impl TryFrom<f64> for SimTime {
    type Error = ValueError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}

// ── Rate ───────────────────────────────────────────────────────────

/// Events per unit simulation time.
///
/// A rate of exactly zero is valid: the channel cannot fire given the
/// current populations.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rate(f64);

impl Rate {
    /// A channel that will never fire.
    pub const ZERO: Self = Self(0.0);

    /// Construct from a finite, non-negative value.
    pub fn new(value: f64) -> Result<Self, ValueError> {
        check("rate", value).map(Self)
    }

    /// Mass-action propensity: `population × unit`.
    pub fn per_capita(unit: Rate, population: u64) -> Self {
        Self((unit.0 * population as f64).min(f64::MAX))
    }

    /// The raw value.
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether this rate is exactly zero.
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl PartialEq for Rate {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Rate {}

impl PartialOrd for Rate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Add for Rate {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self((self.0 + rhs.0).min(f64::MAX))
    }
}

impl Sum for Rate {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, r| acc + r)
    }
}

impl<'a> Sum<&'a Rate> for Rate {
    fn sum<I: Iterator<Item = &'a Rate>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/t", self.0)
    }
}

impl TryFrom<f64> for Rate {
    type Error = ValueError;

    fn try_from(v: f64) -> Result<Self, Self::Error> {
        Self::new(v)
    }
}
