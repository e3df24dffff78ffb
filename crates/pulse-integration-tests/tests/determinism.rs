//! Determinism checks: identical scenarios must produce identical
//! observation transcripts, timestamps included.

use pulse_core::driver::{Driver, RunMode};
use pulse_core::signal::ObservationFlags;
use pulse_core::test_utils::{demo_biological, demo_technical};
use pulse_core::trace::{Trace, diff_traces};

/// Build and run the reference scenario: one technical and one biological
/// unit sharing a clock, staggered inputs, full drain.
fn run_scenario() -> Trace {
    let mut driver = Driver::new();
    let t = driver
        .register(demo_technical("t0").with_observation(ObservationFlags::transitions()))
        .unwrap();
    let n = driver
        .register(demo_biological("n0").with_observation(ObservationFlags::all()))
        .unwrap();

    driver.inject(t, 0, 0);
    driver.inject(n, 30, 0);
    driver.inject(n, 130, 1);
    driver.run(RunMode::Continuous);
    driver.take_trace()
}

#[test]
fn identical_runs_identical_traces() {
    let a = run_scenario();
    let b = run_scenario();

    let diff = diff_traces(&a, &b);
    assert!(
        diff.is_identical(),
        "traces diverge at {:?} (lengths {} vs {})",
        diff.first_divergence,
        diff.len_a,
        diff.len_b
    );
    assert!(!a.is_empty());
}

#[test]
fn reset_then_rerun_matches_fresh_run() {
    let mut driver = Driver::new();
    let t = driver
        .register(demo_technical("t0").with_observation(ObservationFlags::transitions()))
        .unwrap();

    driver.inject(t, 0, 0);
    driver.run(RunMode::Continuous);
    let first = driver.take_trace();

    driver.reset();
    driver.inject(t, 0, 0);
    driver.run(RunMode::Continuous);
    let second = driver.take_trace();

    assert!(diff_traces(&first, &second).is_identical());
}

#[test]
fn eventwise_and_continuous_agree() {
    let build = |driver: &mut Driver| {
        let n = driver
            .register(demo_biological("n0").with_observation(ObservationFlags::all()))
            .unwrap();
        driver.inject(n, 0, 0);
    };

    let mut continuous = Driver::new();
    build(&mut continuous);
    continuous.run(RunMode::Continuous);

    let mut stepped = Driver::new();
    build(&mut stepped);
    while !stepped.is_idle() {
        stepped.run(RunMode::EventWise);
    }

    assert!(diff_traces(continuous.trace(), stepped.trace()).is_identical());
}
