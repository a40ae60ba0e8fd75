//! Projectile and launcher descriptors.

use serde::Serialize;
use std::f64::consts::PI;

use crate::constants::{GRAMS_PER_KG, MM_PER_M};
use crate::error::{ensure_finite, ensure_non_negative, ensure_positive, Result};

/// Nose/base profile of a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileShape {
    Spitzer,     // Sharp pointed
    RoundNose,   // Blunt/round nose, typical pistol FMJ
    FlatBase,    // Wadcutter
    BoatTail,    // Tapered base
    HollowPoint, // Expanding
}

impl ProjectileShape {
    /// Parse from the tag used in preset files
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(&['-', ' '][..], "_").as_str() {
            "spitzer" => Some(Self::Spitzer),
            "round_nose" | "roundnose" => Some(Self::RoundNose),
            "flat_base" | "flatbase" | "wadcutter" => Some(Self::FlatBase),
            "boat_tail" | "boattail" => Some(Self::BoatTail),
            "hollow_point" | "hollowpoint" | "jhp" => Some(Self::HollowPoint),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProjectileShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Spitzer => "spitzer",
            Self::RoundNose => "round_nose",
            Self::FlatBase => "flat_base",
            Self::BoatTail => "boat_tail",
            Self::HollowPoint => "hollow_point",
        };
        f.write_str(tag)
    }
}

/// Static physical description of a bullet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projectile {
    pub name: String,
    pub mass: f64,                  // grams
    pub caliber: f64,               // millimetres
    pub core_density: f64,          // g/cm³
    pub ballistic_coefficient: f64, // dimensionless
    pub muzzle_velocity: f64,       // m/s, nominal for this load
    pub shape: ProjectileShape,
    pub jacket_material: String,
}

impl Projectile {
    pub fn mass_kg(&self) -> f64 {
        self.mass / GRAMS_PER_KG
    }

    /// Kinetic energy in joules at the given velocity
    pub fn kinetic_energy(&self, velocity: f64) -> f64 {
        0.5 * self.mass_kg() * (velocity * velocity)
    }

    /// Kinetic energy at the projectile's nominal muzzle velocity
    pub fn muzzle_energy(&self) -> f64 {
        self.kinetic_energy(self.muzzle_velocity)
    }

    /// Frontal area in m²
    pub fn cross_sectional_area(&self) -> f64 {
        let radius_m = (self.caliber / MM_PER_M) / 2.0;
        PI * (radius_m * radius_m)
    }

    /// Velocity that carries `energy` joules for this projectile's mass
    pub fn velocity_for_energy(&self, energy: f64) -> f64 {
        (2.0 * energy.max(0.0) / self.mass_kg()).sqrt()
    }

    /// Reject geometry that would divide by zero in the integrator
    pub fn validate(&self) -> Result<()> {
        ensure_positive("projectile mass", self.mass)?;
        ensure_positive("projectile caliber", self.caliber)?;
        ensure_non_negative("projectile core density", self.core_density)?;
        ensure_finite("ballistic coefficient", self.ballistic_coefficient)?;
        ensure_non_negative("projectile muzzle velocity", self.muzzle_velocity)?;
        Ok(())
    }
}

/// The firing device; only its muzzle velocity feeds the simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Launcher {
    pub name: String,
    pub barrel_length: f64,   // metres
    pub muzzle_velocity: f64, // m/s
}

impl Launcher {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("barrel length", self.barrel_length)?;
        ensure_non_negative("launcher muzzle velocity", self.muzzle_velocity)?;
        Ok(())
    }
}
