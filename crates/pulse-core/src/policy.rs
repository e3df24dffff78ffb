//! The state-machine policy: pure rules mapping (current phase, requested
//! transition) to an outcome.
//!
//! The policy is stateless -- a single pure function over value types. Units
//! own their phase field and call [`evaluate`] before every mutation; the
//! policy never touches unit internals.
//!
//! # Outcome classes
//!
//! - [`Outcome::Apply`] -- the transition is legal; assign the new phase.
//! - [`Outcome::Ignore`] -- expected-but-out-of-window traffic (input while
//!   relaxing, a stray `Fail`). Dropped by the caller, never a state change.
//! - [`Outcome::Violation`] -- a request from a phase that structurally
//!   cannot reach it. This indicates a sequencing bug in the core itself,
//!   so handlers abort on it rather than limping on.
//!
//! The split between `Ignore` and `Violation` is deliberate and asymmetric:
//! misuse of the synchronous `Process`/`Deliver`/`Relax`/`Sleep` machinery is
//! a contract violation, while out-of-window `InputReceived`/`Fail`/`Wakeup`
//! are ordinary runtime traffic.

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of a processing unit. Exactly one is current at any
/// simulated instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    Sleeping,
    Ready,
    Processing,
    Delivering,
    Relaxing,
}

impl Phase {
    /// All phases, for exhaustive table tests.
    pub fn all() -> [Phase; 5] {
        [
            Phase::Sleeping,
            Phase::Ready,
            Phase::Processing,
            Phase::Delivering,
            Phase::Relaxing,
        ]
    }
}

// ---------------------------------------------------------------------------
// Transition requests
// ---------------------------------------------------------------------------

/// A requested lifecycle transition, named after the operation that raises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Transition {
    /// Begin processing (from `Ready`) or end it (from `Processing`).
    Process,
    /// Begin delivering (from `Processing`) or end it (from `Delivering`).
    /// Intentionally requested twice per cycle.
    Deliver,
    /// Begin relaxing. Only legal from `Delivering`.
    Relax,
    /// Synchronous start: all required inputs present. Technical units only.
    Synchronize,
    /// Abort the current processing cycle.
    Fail,
    /// Enter the low-power state. Only legal from `Ready`.
    Sleep,
    /// Leave the low-power state via full re-initialization.
    Wakeup,
    /// Unconditional reset to `Ready`.
    Initialize,
    /// An input arrived. Accepted in `Ready`/`Processing`, dropped elsewhere.
    InputReceived,
}

impl Transition {
    /// All transitions, for exhaustive table tests.
    pub fn all() -> [Transition; 9] {
        [
            Transition::Process,
            Transition::Deliver,
            Transition::Relax,
            Transition::Synchronize,
            Transition::Fail,
            Transition::Sleep,
            Transition::Wakeup,
            Transition::Initialize,
            Transition::InputReceived,
        ]
    }
}

// ---------------------------------------------------------------------------
// Policy variants
// ---------------------------------------------------------------------------

/// Which legality table a unit consults. Selected at construction; the
/// policy itself holds no per-unit data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PolicyKind {
    /// Synchronous units: start only once all required inputs are present.
    Technical,
    /// Asynchronous units: start on first input, never synchronize.
    Biological,
}

/// Result of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Legal: assign the new phase.
    Apply(Phase),
    /// Out-of-window traffic: drop without changing state.
    Ignore,
    /// Structurally unreachable request: a sequencing bug. Callers abort.
    Violation,
}

// ---------------------------------------------------------------------------
// evaluate
// ---------------------------------------------------------------------------

/// Validate a transition request against the current phase.
///
/// Never panics itself; the caller decides what a [`Outcome::Violation`]
/// means (unit handlers abort on it).
pub fn evaluate(kind: PolicyKind, current: Phase, transition: Transition) -> Outcome {
    use Outcome::*;
    use Phase::*;

    match transition {
        Transition::Initialize => Apply(Ready),

        Transition::Process => match current {
            Ready => Apply(Processing),
            // End of processing: the phase work is done, move on.
            Processing => Apply(Delivering),
            _ => Violation,
        },

        Transition::Deliver => match current {
            Processing => Apply(Delivering),
            Delivering => Apply(Relaxing),
            _ => Violation,
        },

        Transition::Relax => match current {
            Delivering => Apply(Relaxing),
            _ => Violation,
        },

        Transition::Synchronize => match (kind, current) {
            (PolicyKind::Technical, Ready) => Apply(Processing),
            // A late synchronize (inputs completed while already busy) is
            // ordinary traffic for a technical unit.
            (PolicyKind::Technical, _) => Ignore,
            // Biological units start on first input; a synchronize request
            // cannot be produced by a correctly sequenced unit.
            (PolicyKind::Biological, _) => Violation,
        },

        Transition::Sleep => match current {
            Ready => Apply(Sleeping),
            _ => Violation,
        },

        Transition::Wakeup => match current {
            Sleeping => Apply(Ready),
            _ => Ignore,
        },

        Transition::Fail => match current {
            Processing => Apply(Ready),
            _ => Ignore,
        },

        Transition::InputReceived => match current {
            Ready => Apply(Ready),
            Processing => Apply(Processing),
            _ => Ignore,
        },
    }
}

// ===========================================================================
// Tests
// ===========================================================================
