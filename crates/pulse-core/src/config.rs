//! Constructor-parameter structs and the optional JSON scenario loader.
//!
//! Configuration reaches the core purely as constructor parameters; the
//! loader (feature `config-loader`) is a thin serde_json layer that turns a
//! scenario file into ready-to-register units.

use crate::fixed::Micros;

// ---------------------------------------------------------------------------
// UnitConfig
// ---------------------------------------------------------------------------

/// Timing parameters for one processing unit.
///
/// Technical units use the three fixed phase delays; biological units use
/// the heartbeat settings plus `transmit_time` (their Delivering phase is a
/// one-shot transmission, the integrating phases are Processing and
/// Relaxing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UnitConfig {
    /// Heartbeat interval in microseconds.
    pub heartbeat: Micros,
    /// Integration substeps per heartbeat.
    pub subdivisions: u32,
    /// Inputs a technical unit must collect in `Ready` before it starts.
    pub required_inputs: u32,
    /// Technical Processing duration, microseconds.
    pub process_time: Micros,
    /// Delivering duration for both families, microseconds.
    pub transmit_time: Micros,
    /// Technical Relaxing duration, microseconds.
    pub relax_time: Micros,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            heartbeat: 100,
            subdivisions: 4,
            required_inputs: 1,
            process_time: 500,
            transmit_time: 200,
            relax_time: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON scenario loader (feature `config-loader`)
// ---------------------------------------------------------------------------

#[cfg(feature = "config-loader")]
pub use loader::{ConfigError, load_scenario};

#[cfg(feature = "config-loader")]
mod loader {
    use super::UnitConfig;
    use crate::fixed::f64_to_fixed64;
    use crate::membrane::MembraneParams;
    use crate::signal::ObservationFlags;
    use crate::unit::ProcessingUnit;

    /// Errors raised while loading a scenario file.
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        #[error("JSON parse error: {0}")]
        JsonParse(#[from] serde_json::Error),
        #[error("unit has an empty name")]
        EmptyName,
        #[error("unit '{0}': heartbeat and subdivisions must be nonzero")]
        InvalidHeartbeat(String),
    }

    /// Top-level scenario structure.
    #[derive(Debug, serde::Deserialize)]
    struct ScenarioData {
        units: Vec<UnitData>,
    }

    /// JSON representation of one unit.
    #[derive(Debug, serde::Deserialize)]
    struct UnitData {
        name: String,
        family: FamilyData,
        #[serde(default)]
        config: UnitConfig,
        #[serde(default)]
        membrane: MembraneData,
        /// Observe lifecycle boundaries (heartbeats stay silent).
        #[serde(default)]
        observe: bool,
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum FamilyData {
        Technical,
        Biological,
    }

    /// Raw f64 membrane constants; converted to fixed-point at build time,
    /// never used in the sim loop.
    #[derive(Debug, Default, serde::Deserialize)]
    struct MembraneData {
        a: Option<f64>,
        b: Option<f64>,
        c: Option<f64>,
        d: Option<f64>,
        i: Option<f64>,
        v_min: Option<f64>,
        peak: Option<f64>,
        relax_rate: Option<f64>,
        settle_tol: Option<f64>,
    }

    impl MembraneData {
        fn build(&self) -> MembraneParams {
            let defaults = MembraneParams::default();
            let pick = |raw: Option<f64>, fallback| raw.map(f64_to_fixed64).unwrap_or(fallback);
            MembraneParams {
                a: pick(self.a, defaults.a),
                b: pick(self.b, defaults.b),
                c: pick(self.c, defaults.c),
                d: pick(self.d, defaults.d),
                i: pick(self.i, defaults.i),
                v_min: pick(self.v_min, defaults.v_min),
                peak: pick(self.peak, defaults.peak),
                relax_rate: pick(self.relax_rate, defaults.relax_rate),
                settle_tol: pick(self.settle_tol, defaults.settle_tol),
            }
        }
    }

    /// Parse a JSON scenario into ready-to-register units.
    pub fn load_scenario(json: &str) -> Result<Vec<ProcessingUnit>, ConfigError> {
        let data: ScenarioData = serde_json::from_str(json)?;
        let mut units = Vec::with_capacity(data.units.len());

        for entry in &data.units {
            if entry.name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            let mut unit = match entry.family {
                FamilyData::Technical => {
                    ProcessingUnit::technical(entry.name.clone(), entry.config)
                }
                FamilyData::Biological => {
                    if entry.config.heartbeat == 0 || entry.config.subdivisions == 0 {
                        return Err(ConfigError::InvalidHeartbeat(entry.name.clone()));
                    }
                    ProcessingUnit::biological(
                        entry.name.clone(),
                        entry.config,
                        entry.membrane.build(),
                    )
                }
            };
            if entry.observe {
                unit.set_observation(ObservationFlags::transitions());
            }
            units.push(unit);
        }

        Ok(units)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
