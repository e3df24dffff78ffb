//! Shared test constructors. Compiled for this crate's own tests and, via
//! the `test-utils` feature, for downstream test crates.

use crate::config::UnitConfig;
use crate::membrane::MembraneParams;
use crate::unit::ProcessingUnit;

/// A technical unit with default timing (500/200/300 µs phases, one
/// required input) and no observation flags.
pub fn demo_technical(name: &str) -> ProcessingUnit {
    ProcessingUnit::technical(name, UnitConfig::default())
}

/// A biological unit with the default regular-spiking membrane and a
/// 100 µs heartbeat split into 4 substeps.
pub fn demo_biological(name: &str) -> ProcessingUnit {
    ProcessingUnit::biological(name, UnitConfig::default(), MembraneParams::default())
}

/// A biological unit with a custom drive current, everything else default.
pub fn demo_biological_with_drive(name: &str, i: f64) -> ProcessingUnit {
    let params = MembraneParams {
        i: crate::fixed::f64_to_fixed64(i),
        ..MembraneParams::default()
    };
    ProcessingUnit::biological(name, UnitConfig::default(), params)
}
