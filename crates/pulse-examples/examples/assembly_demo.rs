//! Technical unit demo: a three-input assembler with a mid-run failure.
//!
//! Shows synchronization (the assembler waits for all three inputs), the
//! Fail recovery path, and a sleep/wakeup power cycle.
//!
//! Run with: `cargo run -p pulse-examples --example assembly_demo`

use pulse_core::config::UnitConfig;
use pulse_core::driver::{Driver, RunMode};
use pulse_core::signal::{ObservationFlags, Signal};
use pulse_core::unit::ProcessingUnit;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut driver = Driver::new();

    let config = UnitConfig {
        required_inputs: 3,
        process_time: 400,
        transmit_time: 150,
        relax_time: 250,
        ..UnitConfig::default()
    };
    let unit = ProcessingUnit::technical("assembler", config)
        .with_observation(ObservationFlags::transitions());
    let id = driver.register(unit).expect("valid unit");

    driver.set_observer(|obs| {
        println!("t={:>6} µs  {:<16} -> {:?}", obs.time, format!("{:?}", obs.kind), obs.phase);
    });

    // First batch: three parts arrive, the cycle runs, but a failure hits
    // while the assembler is busy with the second batch.
    println!("--- batch one ---");
    driver.inject(id, 0, 0);
    driver.inject(id, 50, 1);
    driver.inject(id, 120, 2);
    driver.run(RunMode::Continuous);

    println!("--- batch two, interrupted ---");
    driver.inject(id, 0, 0);
    driver.inject(id, 0, 1);
    driver.inject(id, 0, 2);
    driver.send(id, Signal::Fail, 200);
    driver.run(RunMode::Continuous);

    // Power cycle, then a clean third batch.
    println!("--- sleep, wake, batch three ---");
    driver.send(id, Signal::Sleep, 0);
    driver.send(id, Signal::Wakeup, 500);
    driver.inject(id, 600, 0);
    driver.inject(id, 600, 1);
    driver.inject(id, 600, 2);
    driver.run(RunMode::Continuous);

    let unit = driver.unit(id).expect("registered");
    println!();
    println!(
        "finished at t = {} µs: {} completed-or-started operations, phase {:?}",
        driver.now(),
        unit.stats().operations,
        unit.phase()
    );
    println!(
        "last cycle: idle {} µs, busy {} µs, transmit {} µs, relax {} µs",
        unit.stats().last_idle,
        unit.stats().last_busy,
        unit.stats().last_transmit,
        unit.stats().last_result
    );
}
