//! Biological unit demo: one spiking unit, observed end to end.
//!
//! Registers a single biological unit, feeds it one input at t = 0, and
//! prints every observation as the lifecycle unfolds, followed by a
//! simulated-vs-wall-time summary.
//!
//! Run with: `cargo run -p pulse-examples --example neuron_demo`

use pulse_core::config::UnitConfig;
use pulse_core::driver::{Driver, RunMode};
use pulse_core::membrane::MembraneParams;
use pulse_core::signal::ObservationFlags;
use pulse_core::unit::ProcessingUnit;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut driver = Driver::new();

    // Regular-spiking membrane, 100 µs heartbeat in 4 substeps.
    let config = UnitConfig {
        heartbeat: 100,
        subdivisions: 4,
        ..UnitConfig::default()
    };
    let unit = ProcessingUnit::biological("neuron", config, MembraneParams::default())
        .with_observation(ObservationFlags::all());
    let id = driver.register(unit).expect("valid unit");

    driver.set_observer(|obs| {
        println!("t={:>6} µs  {:<16} -> {:?}", obs.time, format!("{:?}", obs.kind), obs.phase);
    });

    driver.inject(id, 0, 0);

    let wall = Instant::now();
    let dispatched = driver.run(RunMode::Continuous);
    let elapsed = wall.elapsed();

    let unit = driver.unit(id).expect("registered");
    println!();
    println!("dispatched {dispatched} signals");
    println!(
        "simulated {} µs in {:.3} ms wall time",
        driver.now(),
        elapsed.as_secs_f64() * 1e3
    );
    println!(
        "final phase {:?}, v = {:.2} mV, {} operation(s)",
        unit.phase(),
        unit.membrane().expect("biological").v_f64(),
        unit.stats().operations
    );
}
