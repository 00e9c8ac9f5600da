//! The direct-method state machine.
//!
//! [`Simulation`] owns a [`System`], the simulation clock, and trial
//! bookkeeping. Each [`fire_next()`](Simulation::fire_next) call runs one
//! complete step:
//!
//! 1. total propensity `A` (cached tree root, or a fresh sum of all rates)
//! 2. `A == 0` → `AbsorbedState`, nothing is drawn
//! 3. waiting time `~ Exp(A)`; event time = clock + wait
//! 4. uniform draw on `[0, A)` selects the channel by half-open
//!    cumulative intervals
//! 5. `System::apply` mutates the populations and names the dependents
//! 6. cached propensities are refreshed for exactly those dependents
//! 7. event count, last event, and clock are updated
//!
//! # Ownership model
//!
//! `Simulation` is [`Send`] but every mutating method takes `&mut self`,
//! and the random source is borrowed mutably for the duration of a call.
//! Independent trials use independent simulations and independent
//! streams; nothing here locks.

use ctmc_core::{Event, Populations, ProcessId, Rate, SimError, SimTime};
use ctmc_process::{validate_processes, Dependents, Process, System};
use rand::Rng;
use tracing::{debug, trace};

use crate::cache::PropensityTree;
use crate::config::{EngineConfig, SelectionStrategy};
use crate::metrics::EngineMetrics;
use crate::sampling::{exponential_wait, select_linear, uniform_below};

// Compile-time assertion: a simulation can be moved into a worker thread.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check<S: System>() {
        assert_send::<Simulation<S>>();
    }
};

// ── SimState / StopReason / RunSummary ─────────────────────────────

/// Lifecycle of a simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimState {
    /// Constructed; no event fired yet; propensity is positive.
    Idle,
    /// At least one event fired; propensity is positive.
    Running,
    /// Total propensity is zero; no further events can occur.
    Absorbed,
}

/// Why a bulk driver returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The next event would have occurred after the horizon.
    Horizon,
    /// Total propensity reached zero.
    Absorbed,
    /// The event limit was reached.
    EventLimit,
}

/// Outcome of a bulk driver call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Events fired during this call.
    pub events: u64,
    /// Clock when the call started.
    pub start_time: SimTime,
    /// Clock when the call returned.
    pub end_time: SimTime,
    /// Why the call returned.
    pub stop: StopReason,
}

// ── Simulation ─────────────────────────────────────────────────────

/// Gillespie direct-method engine over a [`System`].
///
/// # Example
///
/// ```
/// use ctmc_engine::Simulation;
/// use ctmc_processes::BifurcationSystem;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// # fn main() -> Result<(), ctmc_core::SimError> {
/// let system = BifurcationSystem::new(100, &[1.0, 2.0, 3.0])?;
/// let mut sim = Simulation::new(system)?;
/// let mut rng = ChaCha8Rng::seed_from_u64(42);
/// while !sim.is_absorbed() {
///     sim.fire_next(&mut rng)?;
/// }
/// assert_eq!(sim.system().source(), 0);
/// assert_eq!(sim.event_count(), 100);
/// # Ok(())
/// # }
/// ```
pub struct Simulation<S: System> {
    system: S,
    config: EngineConfig,
    clock: SimTime,
    event_count: u64,
    last_event: Option<Event>,
    /// Present only for [`SelectionStrategy::Cached`].
    tree: Option<PropensityTree>,
    /// Per-step rates for the direct strategy, reused across steps.
    scratch: Vec<f64>,
    metrics: EngineMetrics,
}

impl<S: System> Simulation<S> {
    /// Wrap `system` with the default [`EngineConfig`].
    pub fn new(system: S) -> Result<Self, SimError> {
        Self::with_config(system, EngineConfig::default())
    }

    /// Wrap `system` with an explicit configuration.
    ///
    /// Fails with `EmptyProcessList` if the system has no processes, and
    /// with `InvariantViolation` / `IndexOutOfRange` if process ids are not
    /// contiguous or reference missing populations.
    pub fn with_config(system: S, config: EngineConfig) -> Result<Self, SimError> {
        validate_processes(system.processes(), system.populations())?;

        let n = system.process_count();
        let mut sim = Self {
            system,
            config,
            clock: SimTime::ZERO,
            event_count: 0,
            last_event: None,
            tree: None,
            scratch: Vec::with_capacity(n),
            metrics: EngineMetrics::default(),
        };

        if sim.config.strategy == SelectionStrategy::Cached {
            let rates = sim.current_rates()?;
            let mut tree = PropensityTree::new(n);
            tree.rebuild(&rates);
            sim.tree = Some(tree);
            sim.metrics.rate_evaluations += n as u64;
            sim.metrics.full_refreshes += 1;
        }

        debug!(
            system = sim.system.name(),
            processes = n,
            strategy = %sim.config.strategy,
            verify = sim.config.verify_dependencies,
            "simulation constructed"
        );
        Ok(sim)
    }

    // ── Stepping ───────────────────────────────────────────────────

    /// Fire exactly one event and return it.
    ///
    /// # Errors
    ///
    /// - `AbsorbedState` if total propensity is zero (state unchanged)
    /// - `InvariantViolation` if the system's update hook breaks a
    ///   population invariant (nothing is committed), or, with
    ///   `verify_dependencies`, omits a process whose rate changed (the
    ///   event is committed and the cache rebuilt before the error returns)
    pub fn fire_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Event, SimError> {
        let (process, time) = self.sample(rng)?;
        self.commit(process, time)
    }

    /// Fire events until the next one would fall after `horizon`, or the
    /// system absorbs.
    ///
    /// The first event past the horizon is discarded and the clock is set
    /// to `horizon`; by memorylessness the next call continues correctly.
    /// A horizon at or before the current clock returns immediately.
    pub fn advance_until<R: Rng + ?Sized>(
        &mut self,
        horizon: SimTime,
        rng: &mut R,
    ) -> Result<RunSummary, SimError> {
        self.run(Some(horizon), None, rng)
    }

    /// Fire up to `max_events` events, stopping early on absorption.
    pub fn advance_events<R: Rng + ?Sized>(
        &mut self,
        max_events: u64,
        rng: &mut R,
    ) -> Result<RunSummary, SimError> {
        self.run(None, Some(max_events), rng)
    }

    /// General driver: stop at whichever of horizon, event limit, or
    /// absorption comes first. With neither bound it runs to absorption.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        horizon: Option<SimTime>,
        max_events: Option<u64>,
        rng: &mut R,
    ) -> Result<RunSummary, SimError> {
        let start_time = self.clock;
        let mut events = 0u64;

        let stop = loop {
            if max_events.is_some_and(|limit| events >= limit) {
                break StopReason::EventLimit;
            }
            if horizon.is_some_and(|h| h <= self.clock) {
                break StopReason::Horizon;
            }
            let (process, time) = match self.sample(rng) {
                Ok(drawn) => drawn,
                Err(SimError::AbsorbedState) => break StopReason::Absorbed,
                Err(e) => return Err(e),
            };
            if let Some(h) = horizon {
                if time > h {
                    self.clock = h;
                    break StopReason::Horizon;
                }
            }
            self.commit(process, time)?;
            events += 1;
        };

        Ok(RunSummary {
            events,
            start_time,
            end_time: self.clock,
            stop,
        })
    }

    /// Draw the waiting time and channel without touching any state other
    /// than the direct-strategy scratch buffer and metrics.
    fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(ProcessId, SimTime), SimError> {
        let total = match self.tree.as_ref().map(PropensityTree::total) {
            Some(total) => total,
            None => {
                self.refresh_scratch()?;
                self.scratch.iter().sum()
            }
        };

        if total <= 0.0 {
            if self.metrics.absorbed_at.is_none() {
                self.metrics.absorbed_at = Some(self.clock);
                debug!(
                    system = self.system.name(),
                    time = self.clock.value(),
                    events = self.event_count,
                    "system absorbed"
                );
            }
            return Err(SimError::AbsorbedState);
        }

        let wait = SimTime::new(exponential_wait(rng, total))?;
        let target = uniform_below(rng, total);
        let index = match &self.tree {
            Some(tree) => tree.select(target),
            None => select_linear(&self.scratch, target).ok_or(SimError::AbsorbedState)?,
        };

        let process = ProcessId::from_index(index).ok_or(SimError::IndexOutOfRange {
            what: "process",
            index,
            len: self.system.process_count(),
        })?;
        Ok((process, self.clock + wait))
    }

    /// Apply a drawn event, refresh dependents, and update bookkeeping.
    ///
    /// Once `apply` has succeeded the event has happened: the clock, event
    /// count, and last event are updated even if dependency verification
    /// then fails. On a verification failure the cache is rebuilt from
    /// fresh rates, so the simulation stays consistent with its populations.
    fn commit(&mut self, process: ProcessId, time: SimTime) -> Result<Event, SimError> {
        let event = Event::new(process, time);

        let before = if self.config.verify_dependencies {
            Some(match &self.tree {
                Some(tree) => tree.leaves().to_vec(),
                None => self.scratch.clone(),
            })
        } else {
            None
        };

        let dependents = self.system.apply(&event)?;
        let n = self.system.process_count();

        self.event_count += 1;
        self.metrics.events_fired += 1;
        self.clock = time;
        self.last_event = Some(event);

        if self.tree.is_some() {
            self.refresh_tree(&dependents)?;
        }
        if let Some(before) = before {
            if let Err(e) = self.verify(&event, &dependents, &before) {
                if self.tree.is_some() {
                    self.rebuild_tree()?;
                }
                return Err(e);
            }
        }

        trace!(
            process = process.0,
            time = time.value(),
            dependents = dependents.len(n),
            "event fired"
        );
        Ok(event)
    }

    fn refresh_scratch(&mut self) -> Result<(), SimError> {
        self.scratch.clear();
        let populations = self.system.populations();
        for process in self.system.processes() {
            self.scratch.push(process.rate(populations)?.value());
        }
        self.metrics.rate_evaluations += self.scratch.len() as u64;
        Ok(())
    }

    fn rebuild_tree(&mut self) -> Result<(), SimError> {
        let rates = self.current_rates()?;
        if let Some(tree) = self.tree.as_mut() {
            tree.rebuild(&rates);
        }
        self.metrics.rate_evaluations += rates.len() as u64;
        self.metrics.full_refreshes += 1;
        Ok(())
    }

    fn refresh_tree(&mut self, dependents: &Dependents) -> Result<(), SimError> {
        let n = self.system.process_count();
        let populations = self.system.populations();
        let processes = self.system.processes();
        if let Some(tree) = self.tree.as_mut() {
            for id in dependents.iter(n) {
                let process = processes.get(id.index()).ok_or(SimError::IndexOutOfRange {
                    what: "process",
                    index: id.index(),
                    len: n,
                })?;
                tree.update(id.index(), process.rate(populations)?.value());
            }
        }
        self.metrics.rate_evaluations += dependents.len(n) as u64;
        match dependents {
            Dependents::All => self.metrics.full_refreshes += 1,
            Dependents::Only(_) => self.metrics.partial_refreshes += 1,
        }
        Ok(())
    }

    /// Every process outside `dependents` must report the rate it had
    /// before the event.
    fn verify(&self, event: &Event, dependents: &Dependents, before: &[f64]) -> Result<(), SimError> {
        let populations = self.system.populations();
        for (process, &old) in self.system.processes().iter().zip(before) {
            if dependents.contains(process.id()) {
                continue;
            }
            let now = process.rate(populations)?.value();
            if now != old {
                return Err(SimError::InvariantViolation {
                    reason: format!(
                        "rate of process {} ('{}') changed from {old} to {now} after process {} \
                         fired, but {} did not report it as a dependent",
                        process.id(),
                        process.name(),
                        event.process(),
                        self.system.name(),
                    ),
                });
            }
        }
        Ok(())
    }

    fn current_rates(&self) -> Result<Vec<f64>, SimError> {
        let populations = self.system.populations();
        self.system
            .processes()
            .iter()
            .map(|p| p.rate(populations).map(Rate::value))
            .collect()
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Number of processes.
    pub fn process_count(&self) -> usize {
        self.system.process_count()
    }

    /// Process by index; `IndexOutOfRange` outside `[0, N)`.
    pub fn process(&self, index: usize) -> Result<&dyn Process, SimError> {
        let id = ProcessId::from_index(index).ok_or(SimError::IndexOutOfRange {
            what: "process",
            index,
            len: self.process_count(),
        })?;
        self.system.process(id)
    }

    /// Current rate of one process, computed from current populations.
    pub fn rate(&self, index: usize) -> Result<Rate, SimError> {
        self.process(index)?.rate(self.system.populations())
    }

    /// Total propensity `A`.
    pub fn total_rate(&self) -> Result<Rate, SimError> {
        match &self.tree {
            Some(tree) => Ok(Rate::new(tree.total())?),
            None => {
                let populations = self.system.populations();
                self.system
                    .processes()
                    .iter()
                    .map(|p| p.rate(populations))
                    .sum()
            }
        }
    }

    /// Whether total propensity is zero.
    pub fn is_absorbed(&self) -> bool {
        matches!(self.total_rate(), Ok(total) if total.is_zero())
    }

    /// Lifecycle state.
    pub fn state(&self) -> SimState {
        if self.is_absorbed() {
            SimState::Absorbed
        } else if self.event_count == 0 {
            SimState::Idle
        } else {
            SimState::Running
        }
    }

    /// Events fired so far.
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// The most recent event, if any.
    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }

    /// Time of the most recent event, if any.
    pub fn last_event_time(&self) -> Option<SimTime> {
        self.last_event.map(|e| e.time())
    }

    /// Current simulation clock.
    pub fn now(&self) -> SimTime {
        self.clock
    }

    /// The wrapped system.
    pub fn system(&self) -> &S {
        &self.system
    }

    /// Current populations.
    pub fn populations(&self) -> &Populations {
        self.system.populations()
    }

    /// Cumulative work counters.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// The active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consume the simulation and return the system.
    pub fn into_system(self) -> S {
        self.system
    }
}

impl<S: System> std::fmt::Debug for Simulation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("system", &self.system.name())
            .field("strategy", &self.config.strategy)
            .field("clock", &self.clock)
            .field("event_count", &self.event_count)
            .finish()
    }
}
