//! The deterministic event queue: the scheduler collaborator the core is
//! written against.
//!
//! Provides exactly the four operations the lifecycle machinery needs:
//! raise a named signal after a delay (zero allowed), advance simulated time
//! to the next due signal and hand it out, cancel a unit's not-yet-delivered
//! signals, and report whether anything is pending.
//!
//! # Ordering
//!
//! Signals are keyed by `(due_time, sequence)` where the sequence number is
//! a monotonic emission counter. Two signals raised for the same instant are
//! therefore delivered in emission order -- zero-delay batches rely on this
//! to sequence multiple logical actions within one simulated instant.

use crate::fixed::Micros;
use crate::id::UnitId;
use crate::signal::Signal;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Queue entries
// ---------------------------------------------------------------------------

/// A signal waiting in the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueuedSignal {
    unit: UnitId,
    signal: Signal,
}

/// A signal that has become due, handed to the driver for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueSignal {
    /// Simulated time at which the signal fires.
    pub time: Micros,
    /// The unit the signal is addressed to.
    pub unit: UnitId,
    pub signal: Signal,
}

// ---------------------------------------------------------------------------
// EventQueue
// ---------------------------------------------------------------------------

/// Calendar of pending signals plus the simulated clock.
///
/// `BTreeMap` keyed by `(due, seq)` gives time-ordered iteration, cheap
/// pop-first, and real removal on cancellation.
#[derive(Debug, Default)]
pub struct EventQueue {
    calendar: BTreeMap<(Micros, u64), QueuedSignal>,
    now: Micros,
    next_seq: u64,
}

impl EventQueue {
    /// Create an empty queue at t = 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time in microseconds.
    pub fn now(&self) -> Micros {
        self.now
    }

    /// Raise `signal` for `unit` after `delay` microseconds. A zero delay
    /// schedules for the current instant, after everything already raised
    /// for this instant.
    pub fn schedule(&mut self, unit: UnitId, signal: Signal, delay: Micros) {
        let due = self.now + delay;
        let seq = self.next_seq;
        self.next_seq += 1;
        self.calendar.insert((due, seq), QueuedSignal { unit, signal });
    }

    /// Remove every pending signal addressed to `unit`. Returns how many
    /// were cancelled. Used when forcing re-initialization; a unit may only
    /// ever cancel its own signals.
    pub fn cancel_unit(&mut self, unit: UnitId) -> usize {
        let before = self.calendar.len();
        self.calendar.retain(|_, queued| queued.unit != unit);
        before - self.calendar.len()
    }

    /// Advance the clock to the next due signal and remove it from the
    /// calendar. Returns `None` when the calendar is empty.
    pub fn pop_due(&mut self) -> Option<DueSignal> {
        let ((due, _seq), queued) = self.calendar.pop_first()?;
        debug_assert!(due >= self.now, "calendar key behind the clock");
        self.now = due;
        Some(DueSignal {
            time: due,
            unit: queued.unit,
            signal: queued.signal,
        })
    }

    /// Due time of the next pending signal without removing it or moving
    /// the clock.
    pub fn peek_due_time(&self) -> Option<Micros> {
        self.calendar.keys().next().map(|(due, _)| *due)
    }

    /// Number of pending signals.
    pub fn pending(&self) -> usize {
        self.calendar.len()
    }

    /// Whether nothing is pending.
    pub fn is_idle(&self) -> bool {
        self.calendar.is_empty()
    }

    /// Drop all pending signals and rewind the clock to zero.
    pub fn rewind(&mut self) {
        self.calendar.clear();
        self.now = 0;
        self.next_seq = 0;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
