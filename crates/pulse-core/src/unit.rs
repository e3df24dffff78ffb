//! The processing unit: lifecycle state, input buffer, timing bookkeeping,
//! and the self-driving signal handlers.
//!
//! A unit owns everything about itself -- phase, inputs, stats, membrane --
//! and mutates it only inside [`ProcessingUnit::handle`]. The driver and the
//! policy touch unit state exclusively through public operations.
//!
//! # Families
//!
//! [`UnitKind`] dispatches via enum match (no trait objects):
//!
//! - **Technical**: synchronous. Inputs accumulate in `Ready`; once
//!   `required_inputs` are present the unit synchronizes into `Processing`
//!   and walks fixed-delay phases.
//! - **Biological**: asynchronous. The first input in `Ready` triggers
//!   `ProcessBegin` and re-issues itself in the same zero-delay batch, so
//!   the triggering input is recorded while `Processing`. Processing and
//!   Relaxing then run heartbeat integration sub-loops until their stopping
//!   predicates hold.
//!
//! # Timing idioms
//!
//! One-shot phases record a timestamp baseline on entry and raise their
//! "-end" signal after a fixed delay. Heartbeat phases raise an immediate
//! first heartbeat and re-raise it each interval until the predicate fires,
//! then raise the "-end" signal at zero delay.

use crate::config::UnitConfig;
use crate::fixed::{Fixed64, Micros, micros_to_millis};
use crate::id::UnitId;
use crate::membrane::{Membrane, PhaseRule};
use crate::policy::{self, Outcome, Phase, PolicyKind, Transition};
use crate::sched::EventQueue;
use crate::signal::{ObservationFlags, Signal};
use crate::trace::Observation;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Inputs and stats
// ---------------------------------------------------------------------------

/// A received-input marker: arrival time plus an opaque source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InputRecord {
    pub time: Micros,
    pub source: u32,
}

/// Accumulated per-unit timing statistics, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UnitStats {
    /// Duration of the last completed Processing phase.
    pub last_busy: Micros,
    /// Time spent in `Ready` before the last cycle started.
    pub last_idle: Micros,
    /// Duration of the last completed Delivering phase.
    pub last_transmit: Micros,
    /// Duration of the last completed Relaxing phase.
    pub last_result: Micros,
    /// Completed-or-started operation counter.
    pub operations: u64,
}

// ---------------------------------------------------------------------------
// Unit families
// ---------------------------------------------------------------------------

/// Family-specific state. Dispatches via enum match.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum UnitKind {
    /// Synchronous fixed-delay unit.
    Technical,
    /// Asynchronous integrating unit.
    Biological { membrane: Membrane },
}

// ---------------------------------------------------------------------------
// UnitCtx
// ---------------------------------------------------------------------------

/// A unit's view of its collaborators while handling one signal: the event
/// queue (restricted to the unit's own signals) and the observation buffer.
pub struct UnitCtx<'a> {
    queue: &'a mut EventQueue,
    observations: &'a mut Vec<Observation>,
    id: UnitId,
}

impl<'a> UnitCtx<'a> {
    pub(crate) fn new(
        queue: &'a mut EventQueue,
        observations: &'a mut Vec<Observation>,
        id: UnitId,
    ) -> Self {
        Self {
            queue,
            observations,
            id,
        }
    }

    /// Current simulated time.
    pub fn now(&self) -> Micros {
        self.queue.now()
    }

    /// Raise a signal for this unit after `delay` microseconds.
    fn schedule(&mut self, signal: Signal, delay: Micros) {
        self.queue.schedule(self.id, signal, delay);
    }

    /// Cancel every pending signal addressed to this unit. A unit may never
    /// cancel another unit's signals; the id is fixed at construction.
    fn cancel_own(&mut self) -> usize {
        self.queue.cancel_unit(self.id)
    }

    fn push_observation(&mut self, observation: Observation) {
        self.observations.push(observation);
    }
}

// ---------------------------------------------------------------------------
// ProcessingUnit
// ---------------------------------------------------------------------------

/// A single simulated computing element with the five-phase lifecycle.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ProcessingUnit {
    name: String,
    kind: UnitKind,
    config: UnitConfig,
    phase: Phase,
    /// Simulated timestamp marking the start of the current phase.
    phase_started: Micros,
    /// Received-input markers; cleared at the start of each Processing phase.
    inputs: Vec<InputRecord>,
    stats: UnitStats,
    flags: ObservationFlags,
    /// Guards against raising a second `ProcessBegin` inside one zero-delay
    /// batch of same-instant inputs.
    begin_raised: bool,
}

impl ProcessingUnit {
    /// Create a technical unit in `Ready`.
    pub fn technical(name: impl Into<String>, config: UnitConfig) -> Self {
        Self::with_kind(name, config, UnitKind::Technical)
    }

    /// Create a biological unit in `Ready`, membrane at rest.
    pub fn biological(
        name: impl Into<String>,
        config: UnitConfig,
        params: crate::membrane::MembraneParams,
    ) -> Self {
        Self::with_kind(
            name,
            config,
            UnitKind::Biological {
                membrane: Membrane::new(params),
            },
        )
    }

    fn with_kind(name: impl Into<String>, config: UnitConfig, kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            kind,
            config,
            phase: Phase::Ready,
            phase_started: 0,
            inputs: Vec::new(),
            stats: UnitStats::default(),
            flags: ObservationFlags::none(),
            begin_raised: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn stats(&self) -> &UnitStats {
        &self.stats
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn inputs(&self) -> &[InputRecord] {
        &self.inputs
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    /// The membrane, for biological units.
    pub fn membrane(&self) -> Option<&Membrane> {
        match &self.kind {
            UnitKind::Biological { membrane } => Some(membrane),
            UnitKind::Technical => None,
        }
    }

    pub fn observation(&self) -> &ObservationFlags {
        &self.flags
    }

    pub fn set_observation(&mut self, flags: ObservationFlags) {
        self.flags = flags;
    }

    /// Builder-style observation flags.
    pub fn with_observation(mut self, flags: ObservationFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Which policy table this unit consults.
    pub fn policy_kind(&self) -> PolicyKind {
        match self.kind {
            UnitKind::Technical => PolicyKind::Technical,
            UnitKind::Biological { .. } => PolicyKind::Biological,
        }
    }

    // -- Signal dispatch ----------------------------------------------------

    /// Handle one due signal: validate via the policy, perform the phase's
    /// timed work, schedule the successor, then surface an observation if
    /// this signal kind is flagged.
    pub fn handle(&mut self, signal: Signal, ctx: &mut UnitCtx<'_>) {
        match signal {
            Signal::Initialize => self.do_initialize(ctx),
            Signal::InputReceived { source } => self.on_input(source, ctx),
            Signal::ProcessBegin => self.on_process_begin(ctx),
            Signal::ProcessEnd => self.on_process_end(ctx),
            Signal::DeliverEnd => self.on_deliver_end(ctx),
            Signal::RelaxEnd => self.on_relax_end(ctx),
            Signal::Heartbeat => self.on_heartbeat(ctx),
            Signal::Sleep => self.on_sleep(ctx),
            Signal::Wakeup => self.on_wakeup(ctx),
            Signal::Fail => self.on_fail(ctx),
        }

        if self.flags.is_set(signal.kind()) {
            ctx.push_observation(Observation {
                time: ctx.now(),
                unit: ctx.id,
                name: self.name.clone(),
                kind: signal.kind(),
                phase: self.phase,
            });
        }
    }

    /// Ask the policy to validate and apply a transition. Returns whether
    /// the phase changed. Aborts on contract violation: those phases are
    /// unreachable by construction, so reaching one is a sequencing bug in
    /// the core, not bad input.
    fn apply(&mut self, transition: Transition) -> bool {
        match policy::evaluate(self.policy_kind(), self.phase, transition) {
            Outcome::Apply(next) => {
                trace!(unit = %self.name, from = ?self.phase, to = ?next, ?transition, "transition");
                self.phase = next;
                true
            }
            Outcome::Ignore => {
                debug!(unit = %self.name, phase = ?self.phase, ?transition, "out-of-window transition dropped");
                false
            }
            Outcome::Violation => panic!(
                "contract violation: {transition:?} requested while {:?} (unit '{}')",
                self.phase, self.name
            ),
        }
    }

    // -- Handlers -----------------------------------------------------------

    /// Fresh start: discard inputs and continuous state, return to `Ready`.
    /// Deliberately leaves the calendar alone -- the priming `Initialize`
    /// raised at registration must not swallow inputs the caller injected
    /// in the same instant. Recovery paths go through [`Self::do_recover`].
    fn do_initialize(&mut self, ctx: &mut UnitCtx<'_>) {
        self.inputs.clear();
        self.begin_raised = false;
        if let UnitKind::Biological { membrane } = &mut self.kind {
            membrane.reset_full();
        }
        self.apply(Transition::Initialize);
        self.phase_started = ctx.now();
    }

    /// Abandon the in-flight cycle: cancel own pending signals, then
    /// re-initialize. The `Fail` and `Wakeup` paths.
    fn do_recover(&mut self, ctx: &mut UnitCtx<'_>) {
        let cancelled = ctx.cancel_own();
        if cancelled > 0 {
            debug!(unit = %self.name, cancelled, "cancelled pending signals on recovery");
        }
        self.do_initialize(ctx);
    }

    fn on_input(&mut self, source: u32, ctx: &mut UnitCtx<'_>) {
        if !self.apply(Transition::InputReceived) {
            return; // out of window, dropped
        }

        let record = InputRecord {
            time: ctx.now(),
            source,
        };

        match (&self.kind, self.phase) {
            (UnitKind::Biological { .. }, Phase::Ready) => {
                // First input triggers processing. The input itself is
                // re-issued in the same zero-delay batch so it is recorded
                // once the unit is in Processing.
                if !self.begin_raised {
                    ctx.schedule(Signal::ProcessBegin, 0);
                    self.begin_raised = true;
                }
                ctx.schedule(Signal::InputReceived { source }, 0);
            }
            (UnitKind::Biological { .. }, _) => {
                self.inputs.push(record);
            }
            (UnitKind::Technical, Phase::Ready) => {
                self.inputs.push(record);
                if self.inputs.len() >= self.config.required_inputs as usize && !self.begin_raised {
                    ctx.schedule(Signal::ProcessBegin, 0);
                    self.begin_raised = true;
                }
            }
            (UnitKind::Technical, _) => {
                self.inputs.push(record);
            }
        }
    }

    fn on_process_begin(&mut self, ctx: &mut UnitCtx<'_>) {
        let transition = match self.kind {
            UnitKind::Technical => Transition::Synchronize,
            UnitKind::Biological { .. } => Transition::Process,
        };
        if !self.apply(transition) {
            return; // late synchronize while already busy
        }

        let now = ctx.now();
        self.stats.last_idle = now - self.phase_started;
        self.stats.operations += 1;
        self.phase_started = now;
        self.inputs.clear();
        self.begin_raised = false;

        match self.kind {
            UnitKind::Technical => ctx.schedule(Signal::ProcessEnd, self.config.process_time),
            UnitKind::Biological { .. } => ctx.schedule(Signal::Heartbeat, 0),
        }
    }

    fn on_heartbeat(&mut self, ctx: &mut UnitCtx<'_>) {
        let rule = match self.phase {
            Phase::Processing => PhaseRule::Charge,
            Phase::Relaxing => PhaseRule::Decay,
            _ => {
                debug!(unit = %self.name, phase = ?self.phase, "stray heartbeat dropped");
                return;
            }
        };

        let UnitKind::Biological { membrane } = &mut self.kind else {
            debug!(unit = %self.name, "heartbeat on a technical unit dropped");
            return;
        };

        let dt = micros_to_millis(self.config.heartbeat)
            / Fixed64::from_num(self.config.subdivisions);
        let done = membrane.integrate(rule, dt, self.config.subdivisions);

        let end = match rule {
            PhaseRule::Charge => Signal::ProcessEnd,
            PhaseRule::Decay => Signal::RelaxEnd,
        };
        if done {
            ctx.schedule(end, 0);
        } else {
            ctx.schedule(Signal::Heartbeat, self.config.heartbeat);
        }
    }

    fn on_process_end(&mut self, ctx: &mut UnitCtx<'_>) {
        // First of the two Deliver requests in a cycle.
        self.apply(Transition::Deliver);
        let now = ctx.now();
        self.stats.last_busy = now - self.phase_started;
        self.phase_started = now;
        ctx.schedule(Signal::DeliverEnd, self.config.transmit_time);
    }

    fn on_deliver_end(&mut self, ctx: &mut UnitCtx<'_>) {
        // Technical units relax explicitly; biological units make the
        // second Deliver request of the cycle. Both land in Relaxing.
        let transition = match self.kind {
            UnitKind::Technical => Transition::Relax,
            UnitKind::Biological { .. } => Transition::Deliver,
        };
        self.apply(transition);

        let now = ctx.now();
        self.stats.last_transmit = now - self.phase_started;
        self.phase_started = now;

        match self.kind {
            UnitKind::Technical => ctx.schedule(Signal::RelaxEnd, self.config.relax_time),
            UnitKind::Biological { .. } => ctx.schedule(Signal::Heartbeat, 0),
        }
    }

    fn on_relax_end(&mut self, ctx: &mut UnitCtx<'_>) {
        let now = ctx.now();
        self.stats.last_result = now - self.phase_started;

        // The hard reset, not the decay equation, re-arms the unit.
        if let UnitKind::Biological { membrane } = &mut self.kind {
            membrane.reset_spike();
        }
        self.apply(Transition::Initialize);
        self.phase_started = now;
    }

    fn on_sleep(&mut self, ctx: &mut UnitCtx<'_>) {
        self.apply(Transition::Sleep);
        // Sleep is a reset point: an in-flight `ProcessBegin` raised by an
        // input earlier in this same instant must not fire while Sleeping.
        let cancelled = ctx.cancel_own();
        if cancelled > 0 {
            debug!(unit = %self.name, cancelled, "cancelled pending signals on sleep");
        }
        self.begin_raised = false;
        self.phase_started = ctx.now();
    }

    fn on_wakeup(&mut self, ctx: &mut UnitCtx<'_>) {
        match policy::evaluate(self.policy_kind(), self.phase, Transition::Wakeup) {
            Outcome::Apply(_) => {
                // Waking always re-runs full initialization: sleep is a
                // reset point, not pause/resume.
                self.do_recover(ctx);
            }
            _ => {
                debug!(unit = %self.name, phase = ?self.phase, "wakeup outside sleeping dropped");
            }
        }
    }

    fn on_fail(&mut self, ctx: &mut UnitCtx<'_>) {
        match policy::evaluate(self.policy_kind(), self.phase, Transition::Fail) {
            Outcome::Apply(_) => {
                debug!(unit = %self.name, "processing failed, forcing re-initialization");
                self.do_recover(ctx);
            }
            _ => {
                debug!(unit = %self.name, phase = ?self.phase, "fail outside processing dropped");
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
