//! # Terminal Ballistics
//!
//! Staged projectile simulation: a bullet flies through air, strikes
//! armour and, if it gets through, continues into soft tissue. Each stage
//! reports velocity, position, drop and the kinetic energy it took out of
//! the projectile.
//!
//! ```no_run
//! use terminal_ballistics::{PresetCatalog, Scenario, SimulationRun};
//!
//! # fn main() -> terminal_ballistics::Result<()> {
//! let presets = PresetCatalog::builtin();
//! let mut run = SimulationRun::new(presets.bullet("9mm")?, presets.weapon("glock_17")?)?;
//! let results = run.run_pipeline(&Scenario {
//!     air: presets.medium("unc_air")?,
//!     air_distance: 25.0,
//!     armour: presets.armour("class_2")?,
//!     tissue: presets.medium("unc_tissue")?,
//!     tissue_depth: 0.4,
//! })?;
//! println!("penetrated: {}", results.armour.penetration);
//! # Ok(())
//! # }
//! ```

pub use config::{ArmourModelConfig, IntegratorConfig, SimulationConfig};
pub use error::{BallisticsError, PresetKind, Result, Stage};
pub use integrator::{integrate, KinematicState, StageResult};
pub use medium::{Armour, Medium};
pub use presets::{DirectoryPresets, InMemoryPresets, PresetCatalog, PresetSource};
pub use projectile::{Launcher, Projectile, ProjectileShape};
pub use report::{EnergyBreakdown, PipelineReport};
pub use simulation::{
    evaluate_armour, ArmourResult, PipelineResults, RunState, Scenario, SimulationRun,
    TissueOutcome,
};

pub mod config;
pub mod constants;
mod error;
mod integrator;
mod medium;
pub mod presets;
mod projectile;
pub mod report;
mod simulation;
