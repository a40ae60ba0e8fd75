//! Named presets for weapons, bullets, mediums and armour.
//!
//! The simulation core never reads presets itself. A [`PresetSource`]
//! resolves a name to a raw JSON record and [`PresetCatalog`] turns that
//! record into a validated entity. Records keep the field layout of the
//! data files the presets were first published in, e.g. a bullet:
//!
//! ```json
//! { "bullet": { "caliber": { "value": 9.01, "unit": "mm" },
//!               "core_material": { "mass": { "value": 8.0 },
//!                                  "density": { "value": 11.34 } },
//!               "ballistic_coefficient": 0.15,
//!               "shape": "round_nose",
//!               "jacket": { "material": "copper" } },
//!   "muzzle_velocity": { "value": 360.0 } }
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BallisticsError, PresetKind, Result};
use crate::medium::{Armour, Medium};
use crate::projectile::{Launcher, Projectile, ProjectileShape};

/// Capability to resolve a preset name to its raw record
pub trait PresetSource {
    fn lookup(&self, kind: PresetKind, name: &str) -> Result<Value>;

    /// Every name `lookup` would resolve for `kind`, sorted
    fn names(&self, kind: PresetKind) -> Result<Vec<String>>;
}

/// Presets held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryPresets {
    records: HashMap<PresetKind, BTreeMap<String, Value>>,
}

impl InMemoryPresets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: PresetKind, name: impl Into<String>, record: Value) {
        self.records
            .entry(kind)
            .or_default()
            .insert(name.into(), record);
    }

    pub fn with(mut self, kind: PresetKind, name: impl Into<String>, record: Value) -> Self {
        self.insert(kind, name, record);
        self
    }

    /// Stock presets: a Glock 17 firing 9 mm FMJ through air, soft
    /// armour and soft tissue
    pub fn builtin() -> Self {
        Self::new()
            .with(
                PresetKind::Weapon,
                "glock_17",
                json!({ "barrel_length": 0.114, "muzzle_velocity": 375.0 }),
            )
            .with(
                PresetKind::Weapon,
                "beretta_92fs",
                json!({ "barrel_length": 0.125, "muzzle_velocity": 381.0 }),
            )
            .with(
                PresetKind::Bullet,
                "9mm",
                json!({
                    "bullet": {
                        "caliber": { "value": 9.01, "unit": "mm" },
                        "core_material": {
                            "name": "lead",
                            "mass": { "value": 8.0, "unit": "g" },
                            "density": { "value": 11.34, "unit": "g/cm3" }
                        },
                        "ballistic_coefficient": 0.15,
                        "shape": "round_nose",
                        "jacket": { "material": "copper" }
                    },
                    "muzzle_velocity": { "value": 360.0, "unit": "m/s" }
                }),
            )
            .with(
                PresetKind::Medium,
                "unc_air",
                json!({ "density": 1.225, "drag_coefficient": 0.295 }),
            )
            .with(
                PresetKind::Medium,
                "unc_tissue",
                json!({ "density": 1060.0, "drag_coefficient": 0.295 }),
            )
            .with(
                PresetKind::Armour,
                "class_1",
                json!({
                    "material": "aramid",
                    "thickness_meters": 0.004,
                    "energy_absorption_joules_per_m2": 3.0e6,
                    "density_g_per_cm3": 1.44,
                    "test_standard": "NIJ 0101.06 Level IIA"
                }),
            )
            .with(
                PresetKind::Armour,
                "class_2",
                json!({
                    "material": "aramid",
                    "thickness_meters": 0.006,
                    "energy_absorption_joules_per_m2": 4.0e6,
                    "density_g_per_cm3": 1.44,
                    "test_standard": "NIJ 0101.06 Level II"
                }),
            )
    }
}

impl PresetSource for InMemoryPresets {
    fn lookup(&self, kind: PresetKind, name: &str) -> Result<Value> {
        self.records
            .get(&kind)
            .and_then(|records| records.get(name))
            .cloned()
            .ok_or_else(|| BallisticsError::PresetNotFound {
                kind,
                name: name.to_string(),
            })
    }

    fn names(&self, kind: PresetKind) -> Result<Vec<String>> {
        Ok(self
            .records
            .get(&kind)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default())
    }
}

/// Presets stored as one JSON file per name:
///
/// ```text
/// <root>/weapon_data/glock_17.json
/// <root>/bullet_data/9mm.json
/// <root>/air_data/unc_air.json       (mediums)
/// <root>/tissue_data/unc_tissue.json (mediums)
/// <root>/armour_data/class_2.json
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryPresets {
    root: PathBuf,
}

impl DirectoryPresets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn subdirectories(kind: PresetKind) -> &'static [&'static str] {
        match kind {
            PresetKind::Weapon => &["weapon_data"],
            PresetKind::Bullet => &["bullet_data"],
            PresetKind::Medium => &["air_data", "tissue_data", "medium_data"],
            PresetKind::Armour => &["armour_data"],
        }
    }
}

impl PresetSource for DirectoryPresets {
    fn lookup(&self, kind: PresetKind, name: &str) -> Result<Value> {
        let not_found = || BallisticsError::PresetNotFound {
            kind,
            name: name.to_string(),
        };
        // Names are file stems, never paths
        if name.is_empty() || name.contains(&['/', '\\'][..]) || name.starts_with('.') {
            return Err(not_found());
        }

        for dir in Self::subdirectories(kind) {
            let path = self.root.join(dir).join(format!("{name}.json"));
            if !path.is_file() {
                continue;
            }
            debug!(path = %path.display(), "loading preset");
            let content = std::fs::read_to_string(&path)?;
            return serde_json::from_str(&content).map_err(|e| BallisticsError::InvalidPreset {
                kind,
                name: name.to_string(),
                reason: e.to_string(),
            });
        }
        Err(not_found())
    }

    fn names(&self, kind: PresetKind) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for dir in Self::subdirectories(kind) {
            let path = self.root.join(dir);
            if !path.is_dir() {
                continue;
            }
            for entry in std::fs::read_dir(&path)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        names.dedup();
        Ok(names)
    }
}

#[derive(Debug, Deserialize)]
struct Quantity {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct WeaponRecord {
    barrel_length: f64,
    muzzle_velocity: f64,
}

#[derive(Debug, Deserialize)]
struct CoreMaterial {
    mass: Quantity,
    density: Quantity,
}

#[derive(Debug, Deserialize)]
struct Jacket {
    material: String,
}

#[derive(Debug, Deserialize)]
struct BulletBody {
    caliber: Quantity,
    core_material: CoreMaterial,
    ballistic_coefficient: f64,
    shape: String,
    jacket: Jacket,
}

#[derive(Debug, Deserialize)]
struct BulletRecord {
    bullet: BulletBody,
    muzzle_velocity: Quantity,
}

#[derive(Debug, Deserialize)]
struct MediumRecord {
    density: f64,
    drag_coefficient: f64,
}

#[derive(Debug, Deserialize)]
struct ArmourRecord {
    material: String,
    thickness_meters: f64,
    energy_absorption_joules_per_m2: f64,
    density_g_per_cm3: Option<f64>,
    test_standard: String,
}

/// Typed access to a [`PresetSource`]
#[derive(Debug, Clone)]
pub struct PresetCatalog<S> {
    source: S,
}

impl PresetCatalog<InMemoryPresets> {
    pub fn builtin() -> Self {
        Self::new(InMemoryPresets::builtin())
    }
}

impl<S: PresetSource> PresetCatalog<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn names(&self, kind: PresetKind) -> Result<Vec<String>> {
        self.source.names(kind)
    }

    fn record<T: DeserializeOwned>(&self, kind: PresetKind, name: &str) -> Result<T> {
        let value = self.source.lookup(kind, name)?;
        serde_json::from_value(value).map_err(|e| invalid(kind, name, e))
    }

    pub fn weapon(&self, name: &str) -> Result<Launcher> {
        let record: WeaponRecord = self.record(PresetKind::Weapon, name)?;
        let launcher = Launcher {
            name: name.to_string(),
            barrel_length: record.barrel_length,
            muzzle_velocity: record.muzzle_velocity,
        };
        launcher
            .validate()
            .map_err(|e| invalid(PresetKind::Weapon, name, e))?;
        Ok(launcher)
    }

    pub fn bullet(&self, name: &str) -> Result<Projectile> {
        let record: BulletRecord = self.record(PresetKind::Bullet, name)?;
        let body = record.bullet;
        let shape = ProjectileShape::from_str(&body.shape).ok_or_else(|| {
            invalid(
                PresetKind::Bullet,
                name,
                format!("unknown shape '{}'", body.shape),
            )
        })?;
        let projectile = Projectile {
            name: name.to_string(),
            mass: body.core_material.mass.value,
            caliber: body.caliber.value,
            core_density: body.core_material.density.value,
            ballistic_coefficient: body.ballistic_coefficient,
            muzzle_velocity: record.muzzle_velocity.value,
            shape,
            jacket_material: body.jacket.material,
        };
        projectile
            .validate()
            .map_err(|e| invalid(PresetKind::Bullet, name, e))?;
        Ok(projectile)
    }

    pub fn medium(&self, name: &str) -> Result<Medium> {
        let record: MediumRecord = self.record(PresetKind::Medium, name)?;
        let medium = Medium::new(name, record.density, record.drag_coefficient);
        medium
            .validate()
            .map_err(|e| invalid(PresetKind::Medium, name, e))?;
        Ok(medium)
    }

    pub fn armour(&self, name: &str) -> Result<Armour> {
        let record: ArmourRecord = self.record(PresetKind::Armour, name)?;
        let armour = Armour {
            name: name.to_string(),
            material: record.material,
            thickness: record.thickness_meters,
            energy_absorption: record.energy_absorption_joules_per_m2,
            density: record.density_g_per_cm3,
            test_standard: record.test_standard,
        };
        armour
            .validate()
            .map_err(|e| invalid(PresetKind::Armour, name, e))?;
        Ok(armour)
    }
}

fn invalid(kind: PresetKind, name: &str, reason: impl ToString) -> BallisticsError {
    BallisticsError::InvalidPreset {
        kind,
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
