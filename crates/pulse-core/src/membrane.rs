//! Membrane-potential state for biological units.
//!
//! Two coupled continuous variables -- potential `v` and recovery `u` --
//! advanced by explicit Euler substeps inside heartbeat handlers. All math is
//! Q32.32 fixed-point so that firing times are bit-reproducible.
//!
//! Two phase rules share one integration skeleton ([`Membrane::integrate`]):
//!
//! - [`PhaseRule::Charge`] (Processing): an Izhikevich-style quadratic
//!   charge toward the firing peak, `v' = 0.04v^2 + 5v + 140 - u + i`,
//!   `u' = a(bv - u)`.
//! - [`PhaseRule::Decay`] (Relaxing): exponential decay back toward the
//!   reset potential `c`.
//!
//! The Relaxing -> Ready hard reset (`v = c`, `u += d`) is what re-arms the
//! unit, not a limit of the equations.

use crate::fixed::{Fixed64, fixed64_to_f64};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Model constants, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MembraneParams {
    /// Recovery time scale.
    pub a: Fixed64,
    /// Recovery sensitivity to `v`.
    pub b: Fixed64,
    /// Post-spike reset potential (also the rest target while relaxing).
    pub c: Fixed64,
    /// Post-spike recovery increment.
    pub d: Fixed64,
    /// Constant input current applied while charging.
    pub i: Fixed64,
    /// Hard lower bound on `v`; every substep clamps to this.
    pub v_min: Fixed64,
    /// Firing peak: charging stops once `v` reaches it.
    pub peak: Fixed64,
    /// Decay rate (per millisecond) toward `c` while relaxing.
    pub relax_rate: Fixed64,
    /// Relaxing ends when `|v - c|` falls within this tolerance.
    pub settle_tol: Fixed64,
}

impl Default for MembraneParams {
    /// Regular-spiking constants with a constant 10 pA drive.
    fn default() -> Self {
        Self {
            a: Fixed64::from_num(0.02),
            b: Fixed64::from_num(0.2),
            c: Fixed64::from_num(-65),
            d: Fixed64::from_num(8),
            i: Fixed64::from_num(10),
            v_min: Fixed64::from_num(-90),
            peak: Fixed64::from_num(30),
            relax_rate: Fixed64::from_num(0.5),
            settle_tol: Fixed64::from_num(0.5),
        }
    }
}

// ---------------------------------------------------------------------------
// Phase rules
// ---------------------------------------------------------------------------

/// Which update rule and stopping predicate a heartbeat phase uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseRule {
    /// Charge toward the firing peak (Processing).
    Charge,
    /// Decay toward the reset potential (Relaxing).
    Decay,
}

// ---------------------------------------------------------------------------
// Membrane
// ---------------------------------------------------------------------------

/// Continuous state of one biological unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Membrane {
    params: MembraneParams,
    v: Fixed64,
    u: Fixed64,
}

impl Membrane {
    /// Create a membrane at rest: `v = c`, `u = b * c`.
    pub fn new(params: MembraneParams) -> Self {
        Self {
            params,
            v: params.c,
            u: params.b * params.c,
        }
    }

    /// Current potential.
    pub fn v(&self) -> Fixed64 {
        self.v
    }

    /// Current recovery variable.
    pub fn u(&self) -> Fixed64 {
        self.u
    }

    /// Model constants.
    pub fn params(&self) -> &MembraneParams {
        &self.params
    }

    /// Potential as f64, for display only.
    pub fn v_f64(&self) -> f64 {
        fixed64_to_f64(self.v)
    }

    /// Whether the charging predicate holds.
    pub fn fired(&self) -> bool {
        self.v >= self.params.peak
    }

    /// Whether the relaxing predicate holds.
    pub fn settled(&self) -> bool {
        (self.v - self.params.c).abs() <= self.params.settle_tol
    }

    /// One explicit Euler substep of the given rule, `dt` in milliseconds.
    /// Clamps `v` to `v_min` afterwards.
    pub fn step(&mut self, rule: PhaseRule, dt: Fixed64) {
        let p = &self.params;
        let (dv, du) = match rule {
            PhaseRule::Charge => {
                let quad = Fixed64::from_num(0.04) * self.v * self.v;
                let dv = quad + Fixed64::from_num(5) * self.v + Fixed64::from_num(140)
                    - self.u
                    + p.i;
                let du = p.a * (p.b * self.v - self.u);
                (dv, du)
            }
            PhaseRule::Decay => {
                let dv = p.relax_rate * (p.c - self.v);
                let du = p.a * (p.b * p.c - self.u);
                (dv, du)
            }
        };
        self.v += dt * dv;
        self.u += dt * du;
        if self.v < p.v_min {
            self.v = p.v_min;
        }
    }

    /// One heartbeat's worth of integration: up to `substeps` substeps of
    /// `dt` milliseconds each, stopping early once the rule's predicate
    /// holds. Returns whether the predicate holds afterwards.
    pub fn integrate(&mut self, rule: PhaseRule, dt: Fixed64, substeps: u32) -> bool {
        for _ in 0..substeps {
            if self.predicate(rule) {
                break;
            }
            self.step(rule, dt);
        }
        self.predicate(rule)
    }

    /// Post-spike hard reset: `v = c`, `u += d`. This, not the equations,
    /// re-arms the unit for the next cycle.
    pub fn reset_spike(&mut self) {
        self.v = self.params.c;
        self.u += self.params.d;
    }

    /// Discard all continuous state back to the rest point. Used by the
    /// Fail recovery path and full re-initialization.
    pub fn reset_full(&mut self) {
        self.v = self.params.c;
        self.u = self.params.b * self.params.c;
    }

    fn predicate(&self, rule: PhaseRule) -> bool {
        match rule {
            PhaseRule::Charge => self.fired(),
            PhaseRule::Decay => self.settled(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn default_membrane() -> Membrane {
        Membrane::new(MembraneParams::default())
    }

    // -----------------------------------------------------------------------
    // Test 1: construction starts at rest
    // -----------------------------------------------------------------------
    #[test]
    fn starts_at_rest() {
        let m = default_membrane();
        assert_eq!(m.v(), f64_to_fixed64(-65.0));
        assert_eq!(m.u(), f64_to_fixed64(-13.0));
        assert!(!m.fired());
        assert!(m.settled());
    }

    // -----------------------------------------------------------------------
    // Test 2: charging from rest with positive drive raises v
    // -----------------------------------------------------------------------
    #[test]
    fn charge_raises_potential() {
        let mut m = default_membrane();
        let dt = f64_to_fixed64(0.1);
        let v0 = m.v();
        for _ in 0..10 {
            m.step(PhaseRule::Charge, dt);
        }
        assert!(m.v() > v0, "v should rise under constant drive");
    }

    // -----------------------------------------------------------------------
    // Test 3: charging terminates at the peak in finitely many steps
    // -----------------------------------------------------------------------
    #[test]
    fn charge_reaches_peak() {
        let mut m = default_membrane();
        let dt = f64_to_fixed64(0.1);
        let mut steps = 0u32;
        while !m.fired() {
            m.step(PhaseRule::Charge, dt);
            steps += 1;
            assert!(steps < 100_000, "charging must terminate");
        }
        assert!(m.v() >= m.params().peak);
    }

    // -----------------------------------------------------------------------
    // Test 4: firing time is deterministic across runs
    // -----------------------------------------------------------------------
    #[test]
    fn charge_step_count_reproducible() {
        let count = |mut m: Membrane| {
            let dt = f64_to_fixed64(0.1);
            let mut steps = 0u32;
            while !m.fired() {
                m.step(PhaseRule::Charge, dt);
                steps += 1;
            }
            steps
        };
        assert_eq!(count(default_membrane()), count(default_membrane()));
    }

    // -----------------------------------------------------------------------
    // Test 5: v is clamped at v_min
    // -----------------------------------------------------------------------
    #[test]
    fn clamps_to_minimum() {
        let params = MembraneParams {
            i: f64_to_fixed64(-500.0),
            ..MembraneParams::default()
        };
        let mut m = Membrane::new(params);
        let dt = f64_to_fixed64(0.1);
        for _ in 0..1000 {
            m.step(PhaseRule::Charge, dt);
        }
        assert!(m.v() >= params.v_min);
        assert_eq!(m.v(), params.v_min);
    }

    // -----------------------------------------------------------------------
    // Test 6: decay settles back toward c
    // -----------------------------------------------------------------------
    #[test]
    fn decay_settles_at_reset_potential() {
        let mut m = default_membrane();
        // Start the relax phase from the firing peak.
        while !m.fired() {
            m.step(PhaseRule::Charge, f64_to_fixed64(0.1));
        }
        let dt = f64_to_fixed64(0.1);
        let mut steps = 0u32;
        while !m.settled() {
            m.step(PhaseRule::Decay, dt);
            steps += 1;
            assert!(steps < 100_000, "decay must terminate");
        }
        let c = m.params().c;
        let tol = m.params().settle_tol;
        assert!((m.v() - c).abs() <= tol);
    }

    // -----------------------------------------------------------------------
    // Test 7: integrate stops early once the predicate holds
    // -----------------------------------------------------------------------
    #[test]
    fn integrate_early_exit() {
        let mut m = default_membrane();
        // Already settled at rest: a decay heartbeat must not move v.
        let v0 = m.v();
        let done = m.integrate(PhaseRule::Decay, f64_to_fixed64(0.1), 10);
        assert!(done);
        assert_eq!(m.v(), v0);
    }

    // -----------------------------------------------------------------------
    // Test 8: integrate reports an unfinished charge as not done
    // -----------------------------------------------------------------------
    #[test]
    fn integrate_reports_unfinished() {
        let mut m = default_membrane();
        let done = m.integrate(PhaseRule::Charge, f64_to_fixed64(0.01), 2);
        assert!(!done, "two tiny substeps cannot reach the peak from rest");
    }

    // -----------------------------------------------------------------------
    // Test 9: spike reset re-arms
    // -----------------------------------------------------------------------
    #[test]
    fn reset_spike_rearms() {
        let mut m = default_membrane();
        while !m.fired() {
            m.step(PhaseRule::Charge, f64_to_fixed64(0.1));
        }
        let u_before = m.u();
        m.reset_spike();
        assert_eq!(m.v(), m.params().c);
        assert_eq!(m.u(), u_before + m.params().d);
        assert!(!m.fired());
    }

    // -----------------------------------------------------------------------
    // Test 10: full reset discards recovery build-up
    // -----------------------------------------------------------------------
    #[test]
    fn reset_full_returns_to_rest() {
        let mut m = default_membrane();
        for _ in 0..50 {
            m.step(PhaseRule::Charge, f64_to_fixed64(0.1));
        }
        m.reset_full();
        assert_eq!(m.v(), m.params().c);
        assert_eq!(m.u(), m.params().b * m.params().c);
    }
}
