//! Named lifecycle signals and per-unit observation flags.
//!
//! A [`Signal`] is the payload of every queue entry: units drive their own
//! lifecycle by scheduling signals against themselves, and the driver injects
//! `Initialize` / `InputReceived` / `Sleep` / `Wakeup` from outside. Each
//! signal has a [`SignalKind`] discriminant used for observation filtering.
//!
//! # Observation
//!
//! A unit reports a signal to the driver only when its own per-kind flag in
//! [`ObservationFlags`] is set. This decouples "this event exists" from
//! "this event is worth surfacing" -- unflagged signals cost nothing.

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A lifecycle signal delivered to a unit by the event queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Signal {
    /// Force the unit back to `Ready`, clearing all in-flight state.
    Initialize,
    /// An input arrived from the given source tag.
    InputReceived { source: u32 },
    /// Enter the Processing phase.
    ProcessBegin,
    /// Processing finished; enter the Delivering phase.
    ProcessEnd,
    /// Delivering finished; enter the Relaxing phase.
    DeliverEnd,
    /// Relaxing finished; return to `Ready`.
    RelaxEnd,
    /// Periodic integration tick for the current phase.
    Heartbeat,
    /// Enter the low-power `Sleeping` state.
    Sleep,
    /// Leave `Sleeping` via a full re-initialization.
    Wakeup,
    /// Abort the current Processing cycle and reset.
    Fail,
}

/// Discriminant tag for signals, used for observation flags and traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SignalKind {
    Initialize,
    InputReceived,
    ProcessBegin,
    ProcessEnd,
    DeliverEnd,
    RelaxEnd,
    Heartbeat,
    Sleep,
    Wakeup,
    Fail,
}

/// Total number of signal kinds.
pub const SIGNAL_KIND_COUNT: usize = 10;

impl Signal {
    /// Get the discriminant kind for this signal.
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::Initialize => SignalKind::Initialize,
            Signal::InputReceived { .. } => SignalKind::InputReceived,
            Signal::ProcessBegin => SignalKind::ProcessBegin,
            Signal::ProcessEnd => SignalKind::ProcessEnd,
            Signal::DeliverEnd => SignalKind::DeliverEnd,
            Signal::RelaxEnd => SignalKind::RelaxEnd,
            Signal::Heartbeat => SignalKind::Heartbeat,
            Signal::Sleep => SignalKind::Sleep,
            Signal::Wakeup => SignalKind::Wakeup,
            Signal::Fail => SignalKind::Fail,
        }
    }
}

impl SignalKind {
    /// Convert to usize index for array lookups.
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// All kinds in declaration order.
    pub fn all() -> [SignalKind; SIGNAL_KIND_COUNT] {
        [
            SignalKind::Initialize,
            SignalKind::InputReceived,
            SignalKind::ProcessBegin,
            SignalKind::ProcessEnd,
            SignalKind::DeliverEnd,
            SignalKind::RelaxEnd,
            SignalKind::Heartbeat,
            SignalKind::Sleep,
            SignalKind::Wakeup,
            SignalKind::Fail,
        ]
    }
}

// ---------------------------------------------------------------------------
// ObservationFlags
// ---------------------------------------------------------------------------

/// Per-kind observation switches for one unit. All off by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ObservationFlags([bool; SIGNAL_KIND_COUNT]);

impl ObservationFlags {
    /// No signals observed.
    pub fn none() -> Self {
        Self([false; SIGNAL_KIND_COUNT])
    }

    /// Every signal observed. Heartbeats included -- noisy, test use mostly.
    pub fn all() -> Self {
        Self([true; SIGNAL_KIND_COUNT])
    }

    /// The lifecycle boundaries without heartbeats. The usual demo setting.
    pub fn transitions() -> Self {
        let mut flags = Self::all();
        flags.clear(SignalKind::Heartbeat);
        flags
    }

    /// Enable observation of a kind. Builder-style.
    pub fn with(mut self, kind: SignalKind) -> Self {
        self.0[kind.index()] = true;
        self
    }

    /// Enable observation of a kind.
    pub fn set(&mut self, kind: SignalKind) {
        self.0[kind.index()] = true;
    }

    /// Disable observation of a kind.
    pub fn clear(&mut self, kind: SignalKind) {
        self.0[kind.index()] = false;
    }

    /// Whether a kind is observed.
    pub fn is_set(&self, kind: SignalKind) -> bool {
        self.0[kind.index()]
    }
}

impl Default for ObservationFlags {
    fn default() -> Self {
        Self::none()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
