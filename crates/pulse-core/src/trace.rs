//! Observation records and trace comparison.
//!
//! Units surface flagged signals as [`Observation`]s; collecting them into a
//! [`Trace`] gives a reproducible transcript of a run. Comparing the traces
//! of two runs is how determinism is checked: identical parameters must
//! produce identical transcripts, timestamps included.

use crate::fixed::Micros;
use crate::id::UnitId;
use crate::policy::Phase;
use crate::signal::SignalKind;

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// One surfaced signal: what fired, when, for whom, and the phase the unit
/// was left in after handling it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Observation {
    pub time: Micros,
    #[serde(skip)]
    pub unit: UnitId,
    /// Unit name, stable across runs (unlike `UnitId`).
    pub name: String,
    pub kind: SignalKind,
    pub phase: Phase,
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// An ordered transcript of observations.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Trace {
    entries: Vec<Observation>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one observation.
    pub fn push(&mut self, observation: Observation) {
        self.entries.push(observation);
    }

    /// Append a batch, preserving order.
    pub fn extend(&mut self, observations: impl IntoIterator<Item = Observation>) {
        self.entries.extend(observations);
    }

    pub fn entries(&self) -> &[Observation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of one kind, for counting spikes, inputs, etc.
    pub fn of_kind(&self, kind: SignalKind) -> impl Iterator<Item = &Observation> {
        self.entries.iter().filter(move |o| o.kind == kind)
    }

    /// Time of the first entry of a kind, if any.
    pub fn first_time_of(&self, kind: SignalKind) -> Option<Micros> {
        self.of_kind(kind).next().map(|o| o.time)
    }
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

/// Result of comparing two traces entry by entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceDiff {
    /// Index of the first differing entry, if any. Compares name, kind,
    /// time, and phase -- not `UnitId`, which differs between drivers.
    pub first_divergence: Option<usize>,
    pub len_a: usize,
    pub len_b: usize,
}

impl TraceDiff {
    /// Whether the two traces are equivalent transcripts.
    pub fn is_identical(&self) -> bool {
        self.first_divergence.is_none() && self.len_a == self.len_b
    }
}

/// Compare two traces. `UnitId`s are ignored; everything else must match.
pub fn diff_traces(a: &Trace, b: &Trace) -> TraceDiff {
    let first_divergence = a
        .entries
        .iter()
        .zip(&b.entries)
        .position(|(x, y)| {
            x.time != y.time || x.name != y.name || x.kind != y.kind || x.phase != y.phase
        });

    TraceDiff {
        first_divergence,
        len_a: a.len(),
        len_b: b.len(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================
