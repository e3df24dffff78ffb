//! The simulation driver: unit registry, dispatch loop, and observer tap.
//!
//! The driver owns the units (keyed by [`UnitId`] in a slotmap) and the
//! event queue, and does exactly one thing per step: advance the queue to
//! the next due signal and hand it to the addressed unit. All lifecycle
//! logic lives in the units; the driver never mutates unit internals.
//!
//! Observations surfaced during dispatch are buffered, then drained by
//! [`Driver::update`] into the run [`Trace`] and the optional passive
//! observer callback.

use crate::id::UnitId;
use crate::fixed::Micros;
use crate::sched::EventQueue;
use crate::signal::Signal;
use crate::trace::{Observation, Trace};
use crate::unit::{ProcessingUnit, UnitCtx};
use slotmap::SlotMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Errors and run modes
// ---------------------------------------------------------------------------

/// Registration failures.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("unit has an empty name")]
    EmptyName,
    #[error("unit name '{0}' is already registered")]
    DuplicateName(String),
    #[error("unit '{0}': biological units need a nonzero heartbeat and subdivisions")]
    InvalidHeartbeat(String),
}

/// How [`Driver::run`] loops over [`Driver::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Step until the queue is idle.
    Continuous,
    /// Dispatch exactly one signal.
    EventWise,
    /// Step while the next signal is due at or before `horizon`.
    Timed { horizon: Micros },
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

type Observer = Box<dyn FnMut(&Observation)>;

/// Registry plus dispatch loop. See the module docs.
#[derive(Default)]
pub struct Driver {
    units: SlotMap<UnitId, ProcessingUnit>,
    queue: EventQueue,
    /// Observations surfaced since the last `update`.
    staged: Vec<Observation>,
    trace: Trace,
    observer: Option<Observer>,
    dispatched: u64,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("units", &self.units.len())
            .field("pending", &self.queue.pending())
            .field("now", &self.queue.now())
            .field("dispatched", &self.dispatched)
            .finish()
    }
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Registration -------------------------------------------------------

    /// Register a unit and prime its `Initialize` at the current instant.
    pub fn register(&mut self, unit: ProcessingUnit) -> Result<UnitId, RegisterError> {
        if unit.name().is_empty() {
            return Err(RegisterError::EmptyName);
        }
        if self.units.values().any(|u| u.name() == unit.name()) {
            return Err(RegisterError::DuplicateName(unit.name().to_string()));
        }
        if unit.membrane().is_some()
            && (unit.config().heartbeat == 0 || unit.config().subdivisions == 0)
        {
            return Err(RegisterError::InvalidHeartbeat(unit.name().to_string()));
        }

        let id = self.units.insert(unit);
        self.queue.schedule(id, Signal::Initialize, 0);
        Ok(id)
    }

    /// Install the passive observer. Replaces any previous one.
    pub fn set_observer(&mut self, observer: impl FnMut(&Observation) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    // -- Stepping -----------------------------------------------------------

    /// Dispatch the next due signal, then drain observations. Returns
    /// whether further activity remains.
    pub fn step(&mut self) -> bool {
        if let Some(due) = self.queue.pop_due() {
            // Units are never removed, so the id always resolves.
            if let Some(unit) = self.units.get_mut(due.unit) {
                let mut ctx = UnitCtx::new(&mut self.queue, &mut self.staged, due.unit);
                unit.handle(due.signal, &mut ctx);
                self.dispatched += 1;
            }
        }
        self.update();
        !self.queue.is_idle()
    }

    /// Drain buffered observations into the trace and the observer.
    pub fn update(&mut self) {
        if let Some(observer) = &mut self.observer {
            for observation in &self.staged {
                observer(observation);
            }
        }
        self.trace.extend(self.staged.drain(..));
    }

    /// Loop `step` according to `mode`. Returns the number of signals
    /// dispatched by this call.
    pub fn run(&mut self, mode: RunMode) -> u64 {
        let before = self.dispatched;
        match mode {
            RunMode::Continuous => while self.step() {},
            RunMode::EventWise => {
                self.step();
            }
            RunMode::Timed { horizon } => {
                while let Some(due) = self.queue.peek_due_time() {
                    if due > horizon {
                        break;
                    }
                    self.step();
                }
            }
        }
        let count = self.dispatched - before;
        debug!(?mode, count, now = self.queue.now(), "run finished");
        count
    }

    /// Rewind to a pristine t = 0: drop pending signals and the trace,
    /// re-prime every unit with `Initialize`.
    pub fn reset(&mut self) {
        self.queue.rewind();
        self.staged.clear();
        self.trace = Trace::new();
        self.dispatched = 0;
        for id in self.units.keys() {
            self.queue.schedule(id, Signal::Initialize, 0);
        }
    }

    // -- External signals ---------------------------------------------------

    /// Schedule an external input for `unit` after `delay` microseconds.
    pub fn inject(&mut self, unit: UnitId, delay: Micros, source: u32) {
        self.queue
            .schedule(unit, Signal::InputReceived { source }, delay);
    }

    /// Schedule an arbitrary external signal (Sleep, Wakeup, Fail, ...).
    pub fn send(&mut self, unit: UnitId, signal: Signal, delay: Micros) {
        self.queue.schedule(unit, signal, delay);
    }

    // -- Accessors ----------------------------------------------------------

    pub fn now(&self) -> Micros {
        self.queue.now()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    /// Signals dispatched since construction or the last `reset`.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    pub fn unit(&self, id: UnitId) -> Option<&ProcessingUnit> {
        self.units.get(id)
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &ProcessingUnit)> {
        self.units.iter()
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Take the accumulated trace, leaving an empty one behind.
    pub fn take_trace(&mut self) -> Trace {
        std::mem::take(&mut self.trace)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
