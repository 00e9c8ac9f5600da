//! The [`Process`] trait.
//!
//! Processes are event channels. They hold population handles rather than
//! references, declare which counters they read and write, and compute
//! their propensity on demand from the arena.

use ctmc_core::{PopulationSet, Populations, ProcessId, Rate, SimError};

/// One event channel in a continuous-time Markov system.
///
/// # Contract
///
/// - `id()` is assigned at construction and equals the process's position
///   in its system's process list.
/// - `rate()` is a pure function of the populations listed in `reads()`,
///   and is cheap (O(1) for every reference process).
/// - `fire()` touches only the populations listed in `writes()`, and
///   applies exactly one unit of the channel's state change.
/// - `reads()` and `writes()` are called at system construction, not per
///   event.
///
/// # Object safety
///
/// Systems store processes as `Vec<Box<dyn Process>>`.
///
/// # Examples
///
/// A channel that fires at a constant rate and counts its firings:
///
/// ```
/// use ctmc_core::{PopulationId, PopulationSet, Populations, ProcessId, Rate, SimError};
/// use ctmc_process::Process;
///
/// struct Ticker {
///     id: ProcessId,
///     counter: PopulationId,
///     rate: Rate,
/// }
///
/// impl Process for Ticker {
///     fn id(&self) -> ProcessId { self.id }
///     fn name(&self) -> &str { "ticker" }
///     fn reads(&self) -> PopulationSet { PopulationSet::new() }
///     fn writes(&self) -> PopulationSet { [self.counter].into_iter().collect() }
///     fn rate(&self, _: &Populations) -> Result<Rate, SimError> { Ok(self.rate) }
///     fn fire(&self, pops: &mut Populations) -> Result<(), SimError> {
///         pops.increment(self.counter)
///     }
/// }
///
/// let mut pops = Populations::new();
/// let counter = pops.push(0).unwrap();
/// let ticker = Ticker { id: ProcessId(0), counter, rate: Rate::new(2.0).unwrap() };
/// ticker.fire(&mut pops).unwrap();
/// assert_eq!(pops.get(counter).unwrap(), 1);
/// ```
pub trait Process: Send + 'static {
    /// Stable zero-based position within the owning system.
    fn id(&self) -> ProcessId;

    /// Human-readable name for error reporting and logging.
    fn name(&self) -> &str;

    /// Populations the rate depends on.
    fn reads(&self) -> PopulationSet;

    /// Populations `fire()` mutates.
    fn writes(&self) -> PopulationSet;

    /// Current propensity given the arena.
    fn rate(&self, populations: &Populations) -> Result<Rate, SimError>;

    /// Apply one firing of this channel.
    ///
    /// Returns `InvariantViolation` instead of clamping if a counter would
    /// go negative.
    fn fire(&self, populations: &mut Populations) -> Result<(), SimError>;
}
