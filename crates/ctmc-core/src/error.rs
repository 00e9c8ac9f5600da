//! Error types for the ctmc simulation framework.
//!
//! Two layers: [`ValueError`] for rejected scalar construction, and
//! [`SimError`] for everything the engine and systems report while
//! building or stepping a simulation.

use std::error::Error;
use std::fmt;

/// A scalar value was rejected by a value-type constructor.
#[derive(Clone, Debug, PartialEq)]
pub enum ValueError {
    /// The value was negative, NaN, or infinite.
    InvalidValue {
        /// Which quantity was being constructed (e.g. `"rate"`).
        what: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { what, value } => {
                write!(f, "{what} must be finite and non-negative, got {value}")
            }
        }
    }
}

impl Error for ValueError {}

/// Errors from system construction and simulation stepping.
///
/// Construction failures (`EmptyProcessList`, `InvalidValue`) are not
/// recoverable by the engine. `InvariantViolation` signals a modeling bug
/// and is never clamped. `AbsorbedState` is returned when a caller asks a
/// zero-propensity system for another event.
#[derive(Clone, Debug, PartialEq)]
pub enum SimError {
    /// A scalar failed validation.
    InvalidValue(ValueError),
    /// A system was built with no processes.
    EmptyProcessList,
    /// Total propensity is zero; no further event can be drawn.
    AbsorbedState,
    /// An index was outside `[0, len)`.
    IndexOutOfRange {
        /// What was being indexed (`"process"`, `"population"`, ...).
        what: &'static str,
        /// The offending index.
        index: usize,
        /// Number of valid entries.
        len: usize,
    },
    /// A domain invariant would have been broken (e.g. a counter driven
    /// below zero, or a stale propensity after an event).
    InvariantViolation {
        /// Description of the violated invariant.
        reason: String,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue(e) => write!(f, "invalid value: {e}"),
            Self::EmptyProcessList => write!(f, "system has no processes"),
            Self::AbsorbedState => {
                write!(f, "total propensity is zero; system is absorbed")
            }
            Self::IndexOutOfRange { what, index, len } => {
                write!(f, "{what} index {index} out of range (len {len})")
            }
            Self::InvariantViolation { reason } => {
                write!(f, "invariant violation: {reason}")
            }
        }
    }
}

impl Error for SimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValueError> for SimError {
    fn from(e: ValueError) -> Self {
        Self::InvalidValue(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = SimError::IndexOutOfRange {
            what: "process",
            index: 7,
            len: 3,
        };
        assert_eq!(e.to_string(), "process index 7 out of range (len 3)");
        assert_eq!(
            SimError::AbsorbedState.to_string(),
            "total propensity is zero; system is absorbed"
        );
    }

    #[test]
    fn value_error_is_source() {
        let inner = ValueError::InvalidValue {
            what: "rate",
            value: -1.0,
        };
        let outer: SimError = inner.clone().into();
        assert_eq!(outer, SimError::InvalidValue(inner));
        assert!(outer.source().is_some());
        assert!(SimError::EmptyProcessList.source().is_none());
    }
}
