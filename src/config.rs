//! Tunable numeric settings for the integrator and the armour model.
//!
//! Defaults reproduce the reference model exactly. A configuration file
//! is JSON and may override any subset of fields:
//!
//! ```json
//! { "integrator": { "time_step": 1e-6, "max_steps": 50000000 },
//!   "armour": { "min_resistance": 400.0 } }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{
    DEFAULT_TIME_STEP_S, G_ACCEL_MPS2, MIN_ARMOUR_RESISTANCE_J, MIN_ENERGY_DIVISOR_J,
    MIN_IMPACT_AREA_M2,
};
use crate::error::{BallisticsError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegratorConfig {
    /// Fixed Euler timestep in seconds
    pub time_step: f64,
    /// Gravitational acceleration in m/s²
    pub gravity: f64,
    /// Safety cutoff on loop iterations; `None` runs until the stage ends
    pub max_steps: Option<u64>,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP_S,
            gravity: G_ACCEL_MPS2,
            max_steps: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArmourModelConfig {
    /// Lowest resistance any armour offers (J)
    pub min_resistance: f64,
    /// Floor on the frontal area used against the armour (m²)
    pub min_impact_area: f64,
    /// Floor on the impact energy in the deformation ratio (J)
    pub min_energy_divisor: f64,
}

impl Default for ArmourModelConfig {
    fn default() -> Self {
        Self {
            min_resistance: MIN_ARMOUR_RESISTANCE_J,
            min_impact_area: MIN_IMPACT_AREA_M2,
            min_energy_divisor: MIN_ENERGY_DIVISOR_J,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub integrator: IntegratorConfig,
    pub armour: ArmourModelConfig,
    /// Report a stopped projectile with velocity 0 instead of the
    /// slightly negative value the last Euler step produced
    pub clamp_stopped_velocity: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::default(),
            armour: ArmourModelConfig::default(),
            clamp_stopped_velocity: true,
        }
    }
}

impl SimulationConfig {
    /// Reference behaviour: no clamping, no step limit
    pub fn reference() -> Self {
        Self {
            clamp_stopped_velocity: false,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let step = self.integrator.time_step;
        if !(step.is_finite() && step > 0.0) {
            return Err(BallisticsError::Config(format!(
                "integrator.time_step must be a positive number, got {step}"
            )));
        }
        if !self.integrator.gravity.is_finite() {
            return Err(BallisticsError::Config(
                "integrator.gravity must be finite".to_string(),
            ));
        }
        if self.integrator.max_steps == Some(0) {
            return Err(BallisticsError::Config(
                "integrator.max_steps must be at least 1".to_string(),
            ));
        }

        let armour = &self.armour;
        for (field, value) in [
            ("armour.min_resistance", armour.min_resistance),
            ("armour.min_impact_area", armour.min_impact_area),
            ("armour.min_energy_divisor", armour.min_energy_divisor),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(BallisticsError::Config(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }
        if armour.min_energy_divisor == 0.0 {
            return Err(BallisticsError::Config(
                "armour.min_energy_divisor must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
