//! The population counter arena.
//!
//! [`Populations`] owns every integer counter in a system. Processes hold
//! [`PopulationId`] handles and only ever see `&Populations` when
//! computing rates; the system's update hook is the single holder of
//! `&mut Populations` while an event is applied.

use crate::error::{SimError, ValueError};
use crate::id::PopulationId;

/// Index-addressed, non-negative integer counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Populations {
    counts: Vec<u64>,
}

impl Populations {
    /// An empty arena.
    pub fn new() -> Self {
        Self { counts: Vec::new() }
    }

    /// Build an arena from initial counts; `PopulationId(i)` maps to `counts[i]`.
    pub fn from_counts(counts: Vec<u64>) -> Self {
        Self { counts }
    }

    /// Build an arena from signed initial counts, rejecting negatives.
    pub fn from_signed(counts: &[i64]) -> Result<Self, SimError> {
        let counts = counts
            .iter()
            .map(|&c| {
                u64::try_from(c).map_err(|_| {
                    SimError::from(ValueError::InvalidValue {
                        what: "initial population",
                        value: c as f64,
                    })
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { counts })
    }

    /// Register a new counter and return its handle.
    ///
    /// Fails with `IndexOutOfRange` once the arena holds `u32::MAX + 1`
    /// counters.
    pub fn push(&mut self, initial: u64) -> Result<PopulationId, SimError> {
        let len = self.counts.len();
        let id = PopulationId::from_index(len).ok_or(SimError::IndexOutOfRange {
            what: "population",
            index: len,
            len,
        })?;
        self.counts.push(initial);
        Ok(id)
    }

    /// Number of counters.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the arena holds no counters.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Whether `id` names a counter in this arena.
    pub fn contains(&self, id: PopulationId) -> bool {
        id.index() < self.counts.len()
    }

    /// Current value of a counter.
    pub fn get(&self, id: PopulationId) -> Result<u64, SimError> {
        self.counts
            .get(id.index())
            .copied()
            .ok_or(SimError::IndexOutOfRange {
                what: "population",
                index: id.index(),
                len: self.counts.len(),
            })
    }

    /// Add one individual.
    pub fn increment(&mut self, id: PopulationId) -> Result<(), SimError> {
        let slot = self.slot_mut(id)?;
        *slot = slot.checked_add(1).ok_or_else(|| SimError::InvariantViolation {
            reason: format!("population {id} overflowed"),
        })?;
        Ok(())
    }

    /// Remove one individual. Fails rather than clamping at zero.
    pub fn decrement(&mut self, id: PopulationId) -> Result<(), SimError> {
        let slot = self.slot_mut(id)?;
        *slot = slot
            .checked_sub(1)
            .ok_or_else(|| SimError::InvariantViolation {
                reason: format!("population {id} would become negative"),
            })?;
        Ok(())
    }

    /// Move one individual from `from` to `to`.
    ///
    /// Both counters are checked before either is touched, so a failed
    /// transfer leaves the arena unchanged.
    pub fn transfer(&mut self, from: PopulationId, to: PopulationId) -> Result<(), SimError> {
        if self.get(from)? == 0 {
            return Err(SimError::InvariantViolation {
                reason: format!("population {from} would become negative"),
            });
        }
        if self.get(to)? == u64::MAX {
            return Err(SimError::InvariantViolation {
                reason: format!("population {to} overflowed"),
            });
        }
        self.decrement(from)?;
        self.increment(to)
    }

    /// Sum of all counters, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts.iter().fold(0u64, |acc, &c| acc.saturating_add(c))
    }

    /// Counter at raw slice index `index`.
    ///
    /// `IndexOutOfRange` for any index outside `[0, len)`, including ones
    /// too large to be a [`PopulationId`].
    pub fn get_index(&self, index: usize) -> Result<u64, SimError> {
        self.counts
            .get(index)
            .copied()
            .ok_or(SimError::IndexOutOfRange {
                what: "population",
                index,
                len: self.counts.len(),
            })
    }

    /// All counters in id order.
    pub fn as_slice(&self) -> &[u64] {
        &self.counts
    }

    fn slot_mut(&mut self, id: PopulationId) -> Result<&mut u64, SimError> {
        let len = self.counts.len();
        self.counts
            .get_mut(id.index())
            .ok_or(SimError::IndexOutOfRange {
                what: "population",
                index: id.index(),
                len,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_sequential_ids() {
        let mut pops = Populations::new();
        assert_eq!(pops.push(5).unwrap(), PopulationId(0));
        assert_eq!(pops.push(7).unwrap(), PopulationId(1));
        assert_eq!(pops.len(), 2);
        assert_eq!(pops.total(), 12);
    }

    #[test]
    fn decrement_below_zero_fails() {
        let mut pops = Populations::from_counts(vec![1]);
        pops.decrement(PopulationId(0)).unwrap();
        let err = pops.decrement(PopulationId(0)).unwrap_err();
        assert!(matches!(err, SimError::InvariantViolation { .. }));
        assert_eq!(pops.get(PopulationId(0)).unwrap(), 0);
    }

    #[test]
    fn transfer_is_atomic() {
        let mut pops = Populations::from_counts(vec![0, 3]);
        assert!(pops.transfer(PopulationId(0), PopulationId(1)).is_err());
        assert_eq!(pops.as_slice(), &[0, 3]);

        pops.transfer(PopulationId(1), PopulationId(0)).unwrap();
        assert_eq!(pops.as_slice(), &[1, 2]);
    }

    #[test]
    fn out_of_range_reported() {
        let mut pops = Populations::from_counts(vec![1, 2]);
        assert_eq!(
            pops.increment(PopulationId(4)),
            Err(SimError::IndexOutOfRange {
                what: "population",
                index: 4,
                len: 2
            })
        );
        assert!(!pops.contains(PopulationId(2)));
    }

    #[test]
    fn from_signed_rejects_negative() {
        assert!(Populations::from_signed(&[3, 0, 9]).is_ok());
        let err = Populations::from_signed(&[3, -1]).unwrap_err();
        assert!(matches!(err, SimError::InvalidValue(_)));
    }

    #[test]
    fn total_saturates_instead_of_overflowing() {
        let pops = Populations::from_counts(vec![u64::MAX, 5, 1]);
        assert_eq!(pops.total(), u64::MAX);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn raw_index_beyond_u32_is_out_of_range() {
        let pops = Populations::from_counts(vec![7, 3]);
        assert_eq!(pops.get_index(1).unwrap(), 3);
        assert!(matches!(
            pops.get_index(1usize << 32),
            Err(SimError::IndexOutOfRange { what: "population", len: 2, .. })
        ));
        assert_eq!(PopulationId::from_index(1usize << 32), None);
        assert_eq!(PopulationId::from_index(4), Some(PopulationId(4)));
    }
}
