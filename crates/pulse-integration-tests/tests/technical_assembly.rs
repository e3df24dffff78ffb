//! Technical-unit assembly scenarios: synchronization on multiple inputs,
//! staged hand-off between units, sleep and fail round-trips, and the JSON
//! scenario loader feeding a driver.

use pulse_core::config::{UnitConfig, load_scenario};
use pulse_core::driver::{Driver, RunMode};
use pulse_core::policy::Phase;
use pulse_core::signal::{ObservationFlags, Signal, SignalKind};
use pulse_core::test_utils::demo_technical;
use pulse_core::unit::ProcessingUnit;

#[test]
fn synchronizes_on_all_required_inputs() {
    let mut driver = Driver::new();
    let config = UnitConfig {
        required_inputs: 3,
        ..UnitConfig::default()
    };
    let unit = ProcessingUnit::technical("assembler", config)
        .with_observation(ObservationFlags::transitions());
    let id = driver.register(unit).unwrap();

    // Three inputs from distinct sources, spread over 40 µs.
    driver.inject(id, 0, 0);
    driver.inject(id, 20, 1);
    driver.inject(id, 40, 2);
    driver.run(RunMode::Continuous);

    let trace = driver.trace();
    // Processing starts only at the third input's instant.
    assert_eq!(trace.first_time_of(SignalKind::ProcessBegin), Some(40));
    assert_eq!(trace.of_kind(SignalKind::ProcessBegin).count(), 1);

    // Fixed-delay walk: 40 + 500 + 200 + 300.
    assert_eq!(trace.first_time_of(SignalKind::ProcessEnd), Some(540));
    assert_eq!(trace.first_time_of(SignalKind::DeliverEnd), Some(740));
    assert_eq!(trace.first_time_of(SignalKind::RelaxEnd), Some(1040));

    let unit = driver.unit(id).unwrap();
    assert_eq!(unit.phase(), Phase::Ready);
    assert_eq!(unit.stats().last_idle, 40);
    assert_eq!(unit.stats().last_busy, 500);
}

#[test]
fn two_stage_hand_off() {
    let mut driver = Driver::new();
    let producer = driver.register(demo_technical("producer")).unwrap();
    let consumer = driver.register(demo_technical("consumer")).unwrap();

    // Stage one: run the producer to completion.
    driver.inject(producer, 0, 0);
    driver.run(RunMode::Continuous);
    let produced_at = driver.now();
    assert_eq!(produced_at, 1000);

    // Stage two: hand the result to the consumer at the completion instant.
    driver.inject(consumer, 0, 0);
    driver.run(RunMode::Continuous);

    assert_eq!(driver.now(), produced_at + 1000);
    assert_eq!(driver.unit(producer).unwrap().stats().operations, 1);
    assert_eq!(driver.unit(consumer).unwrap().stats().operations, 1);
    // The consumer was idle exactly as long as the producer's cycle.
    assert_eq!(driver.unit(consumer).unwrap().stats().last_idle, 1000);
}

#[test]
fn sleep_wakeup_round_trip() {
    let mut driver = Driver::new();
    let config = UnitConfig {
        required_inputs: 2,
        ..UnitConfig::default()
    };
    let id = driver
        .register(ProcessingUnit::technical("sleeper", config))
        .unwrap();

    // Buffer one of the two needed inputs, then power down.
    driver.inject(id, 0, 0);
    driver.send(id, Signal::Sleep, 10);
    driver.run(RunMode::Continuous);
    assert_eq!(driver.unit(id).unwrap().phase(), Phase::Sleeping);

    // Waking is a reset point: the buffered input is gone, so two fresh
    // inputs are needed to start a cycle.
    driver.send(id, Signal::Wakeup, 100);
    driver.inject(id, 200, 0);
    driver.inject(id, 200, 1);
    driver.run(RunMode::Continuous);

    let unit = driver.unit(id).unwrap();
    assert_eq!(unit.phase(), Phase::Ready);
    assert_eq!(unit.stats().operations, 1);
    assert_eq!(driver.now(), 200 + 1000);
}

#[test]
fn fail_aborts_the_running_operation() {
    let mut driver = Driver::new();
    let unit = demo_technical("fragile").with_observation(ObservationFlags::transitions());
    let id = driver.register(unit).unwrap();

    driver.inject(id, 0, 0);
    // Failure arrives mid-Processing (cycle would end at 1000).
    driver.send(id, Signal::Fail, 250);
    driver.run(RunMode::Continuous);

    let unit = driver.unit(id).unwrap();
    assert_eq!(unit.phase(), Phase::Ready);
    assert_eq!(unit.input_count(), 0);
    // The pending ProcessEnd was cancelled with the rest of the cycle.
    assert_eq!(driver.now(), 250);
    assert_eq!(driver.trace().of_kind(SignalKind::ProcessEnd).count(), 0);

    // The unit accepts work again after recovery.
    driver.inject(id, 0, 0);
    driver.run(RunMode::Continuous);
    assert_eq!(driver.unit(id).unwrap().phase(), Phase::Ready);
    assert_eq!(driver.now(), 1250);
}

#[test]
fn loaded_scenario_drives_cleanly() {
    let json = r#"{
        "units": [
            { "name": "t0", "family": "technical",
              "config": { "required_inputs": 2, "process_time": 100,
                          "transmit_time": 50, "relax_time": 50 },
              "observe": true },
            { "name": "n0", "family": "biological",
              "config": { "heartbeat": 50, "subdivisions": 2 },
              "membrane": { "i": 14.0 },
              "observe": true }
        ]
    }"#;

    let mut driver = Driver::new();
    let ids: Vec<_> = load_scenario(json)
        .unwrap()
        .into_iter()
        .map(|unit| driver.register(unit).unwrap())
        .collect();

    driver.inject(ids[0], 0, 0);
    driver.inject(ids[0], 10, 1);
    driver.inject(ids[1], 0, 0);
    driver.run(RunMode::Continuous);

    for (_, unit) in driver.units() {
        assert_eq!(unit.phase(), Phase::Ready);
        assert_eq!(unit.stats().operations, 1);
    }
    // Both units left transition observations behind.
    assert_eq!(driver.trace().of_kind(SignalKind::RelaxEnd).count(), 2);
}
