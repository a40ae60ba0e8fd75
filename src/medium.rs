//! Propagation mediums and armour.

use serde::Serialize;

use crate::error::{ensure_non_negative, Result};

/// A medium the projectile travels through under quadratic drag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Medium {
    pub name: String,
    pub density: f64,          // kg/m³
    pub drag_coefficient: f64, // dimensionless
}

impl Medium {
    pub fn new(name: impl Into<String>, density: f64, drag_coefficient: f64) -> Self {
        Self {
            name: name.into(),
            density,
            drag_coefficient,
        }
    }

    /// Drag force in newtons on a frontal area at the given speed
    pub fn drag_force(&self, cross_sectional_area: f64, velocity: f64) -> f64 {
        0.5 * self.density * self.drag_coefficient * cross_sectional_area * (velocity * velocity)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("medium density", self.density)?;
        ensure_non_negative("medium drag coefficient", self.drag_coefficient)?;
        Ok(())
    }
}

/// Protective layer evaluated by the energy-absorption penetration model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Armour {
    pub name: String,
    pub material: String,
    pub thickness: f64,         // metres
    pub energy_absorption: f64, // J/m²
    pub density: Option<f64>,   // g/cm³, informational
    pub test_standard: String,
}

impl Armour {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("armour thickness", self.thickness)?;
        ensure_non_negative("armour energy absorption", self.energy_absorption)?;
        if let Some(density) = self.density {
            ensure_non_negative("armour density", density)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn air() -> Medium {
        Medium::new("air", 1.2, 0.295)
    }

    pub fn tissue() -> Medium {
        Medium::new("tissue", 1060.0, 0.295)
    }

    pub fn soft_armour(energy_absorption: f64) -> Armour {
        Armour {
            name: "test_armour".to_string(),
            material: "aramid".to_string(),
            thickness: 0.006,
            energy_absorption,
            density: Some(1.44),
            test_standard: "NIJ 0101.06".to_string(),
        }
    }
}
