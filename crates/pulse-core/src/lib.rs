//! Pulse Core -- an event-driven processing-unit lifecycle simulator.
//!
//! This crate provides the state machine policy, the deterministic event
//! queue, the heartbeat-driven membrane integration, and the simulation
//! driver for networks of abstract computing units.
//!
//! # Lifecycle
//!
//! Every unit cycles through five phases, driven entirely by named,
//! time-stamped signals:
//!
//! ```text
//! Ready -> Processing -> Delivering -> Relaxing -> Ready
//!   \-> Sleeping -> Ready
//! ```
//!
//! Two unit families share the cycle but enter it differently:
//!
//! - **Technical** units synchronize: they wait in `Ready` until every
//!   required input has arrived, then walk fixed-delay phases.
//! - **Biological** units fire on the first input and spend `Processing`
//!   and `Relaxing` integrating a membrane-potential equation on periodic
//!   heartbeats until a threshold condition ends the phase.
//!
//! # Key Types
//!
//! - [`driver::Driver`] -- Unit registry, dispatch loop, and observer tap.
//! - [`unit::ProcessingUnit`] -- One simulated computing element: phase,
//!   input buffer, timing stats, membrane.
//! - [`policy`] -- The stateless transition policy: `(family, phase,
//!   transition) -> Apply | Ignore | Violation`.
//! - [`sched::EventQueue`] -- Calendar of pending signals with FIFO
//!   tie-break at equal timestamps and per-unit cancellation.
//! - [`membrane::Membrane`] -- Izhikevich-style continuous state in Q32.32
//!   fixed-point for bit-reproducible firing times.
//! - [`trace::Trace`] -- Observation transcript plus diffing, the
//!   determinism check.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod config;
pub mod driver;
pub mod fixed;
pub mod id;
pub mod membrane;
pub mod policy;
pub mod sched;
pub mod signal;
pub mod trace;
pub mod unit;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
