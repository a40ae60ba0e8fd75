//! Three-stage pipeline: air, then armour, then tissue.
//!
//! A [`SimulationRun`] moves through
//! `Start → AirDone → ArmourEvaluated → {TissueDone | Stopped}`. Each
//! [`RunState`] variant owns every result gathered so far, so a tissue
//! result can never exist without the air and armour results it was
//! derived from. Calling a stage out of order returns
//! [`BallisticsError::StageOrder`] and leaves the run untouched.

use nalgebra::Vector2;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ArmourModelConfig, SimulationConfig};
use crate::error::{ensure_non_negative, BallisticsError, Result, Stage};
use crate::integrator::{integrate, KinematicState, StageResult};
use crate::medium::{Armour, Medium};
use crate::projectile::{Launcher, Projectile};

/// Outcome of the armour interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArmourResult {
    pub initial_velocity: f64,   // m/s at impact
    pub kinetic_energy: f64,     // J at impact
    pub armour_resistance: f64,  // J
    pub penetration: bool,
    pub remaining_energy: f64,   // J, 0 unless penetrated
    pub deformation: f64,        // m, 0 unless penetrated
}

impl ArmourResult {
    /// Energy taken out of the projectile by the armour
    pub fn energy_absorbed(&self) -> f64 {
        self.kinetic_energy - self.remaining_energy
    }

    /// Velocity leaving the armour for a projectile of `mass_kg`
    pub fn exit_velocity(&self, mass_kg: f64) -> f64 {
        (2.0 * self.remaining_energy / mass_kg).sqrt()
    }
}

/// Energy-absorption penetration model.
///
/// Resistance is the armour's absorption rating over the (floored)
/// frontal area, never less than the configured minimum. The projectile
/// penetrates when its energy strictly exceeds the resistance; the
/// deformation estimate grows as the resistance/energy ratio shrinks.
pub fn evaluate_armour(
    impact_velocity: f64,
    projectile: &Projectile,
    armour: &Armour,
    model: &ArmourModelConfig,
) -> ArmourResult {
    let kinetic_energy = projectile.kinetic_energy(impact_velocity);
    let area = projectile.cross_sectional_area().max(model.min_impact_area);
    let armour_resistance = (armour.energy_absorption * area).max(model.min_resistance);

    let penetration = kinetic_energy > armour_resistance;
    let (remaining_energy, deformation) = if penetration {
        let ratio = armour_resistance / kinetic_energy.max(model.min_energy_divisor);
        (
            kinetic_energy - armour_resistance,
            armour.thickness * (1.0 - ratio.sqrt()),
        )
    } else {
        (0.0, 0.0)
    };

    ArmourResult {
        initial_velocity: impact_velocity,
        kinetic_energy,
        armour_resistance,
        penetration,
        remaining_energy,
        deformation,
    }
}

/// What the tissue stage produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TissueOutcome {
    Penetrated(StageResult),
    /// The armour stopped the projectile; no tissue travel happened
    NotPenetrated,
}

impl TissueOutcome {
    pub fn stage_result(&self) -> Option<&StageResult> {
        match self {
            TissueOutcome::Penetrated(result) => Some(result),
            TissueOutcome::NotPenetrated => None,
        }
    }
}

/// Results gathered so far, one variant per pipeline phase
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    Start,
    AirDone {
        air: StageResult,
    },
    ArmourEvaluated {
        air: StageResult,
        armour: ArmourResult,
    },
    TissueDone {
        air: StageResult,
        armour: ArmourResult,
        tissue: StageResult,
    },
    Stopped {
        air: StageResult,
        armour: ArmourResult,
    },
}

impl RunState {
    pub fn phase(&self) -> &'static str {
        match self {
            RunState::Start => "start",
            RunState::AirDone { .. } => "air done",
            RunState::ArmourEvaluated { .. } => "armour evaluated",
            RunState::TissueDone { .. } => "tissue done",
            RunState::Stopped { .. } => "stopped",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, RunState::TissueDone { .. } | RunState::Stopped { .. })
    }
}

/// One simulated shot
#[derive(Debug, Clone)]
pub struct SimulationRun {
    projectile: Projectile,
    launcher: Launcher,
    config: SimulationConfig,
    state: RunState,
}

impl SimulationRun {
    pub fn new(projectile: Projectile, launcher: Launcher) -> Result<Self> {
        Self::with_config(projectile, launcher, SimulationConfig::default())
    }

    pub fn with_config(
        projectile: Projectile,
        launcher: Launcher,
        config: SimulationConfig,
    ) -> Result<Self> {
        projectile.validate()?;
        launcher.validate()?;
        config.validate()?;
        Ok(Self {
            projectile,
            launcher,
            config,
            state: RunState::Start,
        })
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn air_result(&self) -> Option<&StageResult> {
        match &self.state {
            RunState::Start => None,
            RunState::AirDone { air }
            | RunState::ArmourEvaluated { air, .. }
            | RunState::TissueDone { air, .. }
            | RunState::Stopped { air, .. } => Some(air),
        }
    }

    pub fn armour_result(&self) -> Option<&ArmourResult> {
        match &self.state {
            RunState::ArmourEvaluated { armour, .. }
            | RunState::TissueDone { armour, .. }
            | RunState::Stopped { armour, .. } => Some(armour),
            _ => None,
        }
    }

    pub fn tissue_result(&self) -> Option<&StageResult> {
        match &self.state {
            RunState::TissueDone { tissue, .. } => Some(tissue),
            _ => None,
        }
    }

    fn out_of_order(&self, stage: Stage) -> BallisticsError {
        BallisticsError::StageOrder {
            stage,
            phase: self.state.phase(),
        }
    }

    /// Fly from the muzzle through `medium` for `distance` metres
    pub fn air_stage(&mut self, medium: &Medium, distance: f64) -> Result<StageResult> {
        if !matches!(self.state, RunState::Start) {
            return Err(self.out_of_order(Stage::Air));
        }

        let start = KinematicState::at_muzzle(self.launcher.muzzle_velocity);
        let air = integrate(&self.projectile, medium, distance, start, &self.config)?;
        if air.halted {
            warn!(
                position = air.final_position,
                distance,
                "projectile stopped before reaching the armour"
            );
        }
        info!(
            final_velocity = air.final_velocity,
            energy_loss = air.energy_loss,
            "air stage complete"
        );

        self.state = RunState::AirDone { air: air.clone() };
        Ok(air)
    }

    /// Strike `armour` at the velocity the air stage ended with
    pub fn armour_stage(&mut self, armour: &Armour) -> Result<ArmourResult> {
        armour.validate()?;
        let air = match &self.state {
            RunState::AirDone { air } => air.clone(),
            _ => return Err(self.out_of_order(Stage::Armour)),
        };

        let result = evaluate_armour(
            air.final_velocity,
            &self.projectile,
            armour,
            &self.config.armour,
        );
        info!(
            armour = %armour.name,
            kinetic_energy = result.kinetic_energy,
            resistance = result.armour_resistance,
            penetration = result.penetration,
            "armour stage complete"
        );

        self.state = RunState::ArmourEvaluated {
            air,
            armour: result.clone(),
        };
        Ok(result)
    }

    /// Continue through `medium` with whatever energy survived the armour
    pub fn tissue_stage(&mut self, medium: &Medium, distance: f64) -> Result<TissueOutcome> {
        let (air, armour) = match &self.state {
            RunState::ArmourEvaluated { air, armour } => (air.clone(), armour.clone()),
            _ => return Err(self.out_of_order(Stage::Tissue)),
        };

        if !armour.penetration {
            // Still reject bad input even though nothing is integrated
            medium.validate()?;
            ensure_non_negative("target distance", distance)?;
            debug!("armour not penetrated, skipping tissue stage");
            self.state = RunState::Stopped { air, armour };
            return Ok(TissueOutcome::NotPenetrated);
        }

        let start = KinematicState {
            velocity: Vector2::new(
                armour.exit_velocity(self.projectile.mass_kg()),
                air.final_vertical_velocity,
            ),
            ..air.terminal_state()
        };
        let tissue = integrate(&self.projectile, medium, distance, start, &self.config)?;
        info!(
            final_velocity = tissue.final_velocity,
            energy_loss = tissue.energy_loss,
            "tissue stage complete"
        );

        self.state = RunState::TissueDone {
            air,
            armour,
            tissue: tissue.clone(),
        };
        Ok(TissueOutcome::Penetrated(tissue))
    }

    /// Run all three stages in order
    pub fn run_pipeline(&mut self, scenario: &Scenario) -> Result<PipelineResults> {
        self.air_stage(&scenario.air, scenario.air_distance)?;
        self.armour_stage(&scenario.armour)?;
        self.tissue_stage(&scenario.tissue, scenario.tissue_depth)?;
        self.results()
    }

    /// Results of a finished run
    pub fn results(&self) -> Result<PipelineResults> {
        match &self.state {
            RunState::TissueDone {
                air,
                armour,
                tissue,
            } => Ok(PipelineResults {
                air: air.clone(),
                armour: armour.clone(),
                tissue: TissueOutcome::Penetrated(tissue.clone()),
            }),
            RunState::Stopped { air, armour } => Ok(PipelineResults {
                air: air.clone(),
                armour: armour.clone(),
                tissue: TissueOutcome::NotPenetrated,
            }),
            _ => Err(self.out_of_order(Stage::Tissue)),
        }
    }
}

/// The mediums and distances of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub air: Medium,
    pub air_distance: f64, // m
    pub armour: Armour,
    pub tissue: Medium,
    pub tissue_depth: f64, // m
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResults {
    pub air: StageResult,
    pub armour: ArmourResult,
    pub tissue: TissueOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::fixtures::*;
    use crate::projectile::fixtures::*;

    fn fast_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.integrator.time_step = 1e-6;
        config
    }

    fn run() -> SimulationRun {
        SimulationRun::with_config(nine_mm(), pistol(), fast_config()).unwrap()
    }

    #[test]
    fn test_resistance_never_below_floor() {
        let bullet = nine_mm();
        let model = ArmourModelConfig::default();
        for absorption in [0.0, 1.0, 1.0e3, 3.0e6] {
            let result = evaluate_armour(350.0, &bullet, &soft_armour(absorption), &model);
            assert!(result.armour_resistance >= 350.0);
        }

        let mut needle = nine_mm();
        needle.caliber = 0.01;
        let result = evaluate_armour(350.0, &needle, &soft_armour(1.0e6), &model);
        // Area floored to 1e-4 m² → 100 J, then raised to the 350 J minimum
        assert_eq!(result.armour_resistance, 350.0);
    }

    #[test]
    fn test_area_floor_applies_to_small_calibers() {
        // 9 mm frontal area (6.4e-5 m²) is below the 1e-4 floor
        let result = evaluate_armour(
            350.0,
            &nine_mm(),
            &soft_armour(5.0e6),
            &ArmourModelConfig::default(),
        );
        assert!((result.armour_resistance - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_stopped_by_armour() {
        // 490 J impact against 5e6 J/m² · 1e-4 m² = 500 J
        let result = evaluate_armour(
            350.0,
            &nine_mm(),
            &soft_armour(5.0e6),
            &ArmourModelConfig::default(),
        );
        assert!(!result.penetration);
        assert_eq!(result.remaining_energy, 0.0);
        assert_eq!(result.deformation, 0.0);
        assert!((result.energy_absorbed() - result.kinetic_energy).abs() < 1e-12);
    }

    #[test]
    fn test_energy_equal_to_resistance_does_not_penetrate() {
        let mut model = ArmourModelConfig::default();
        let bullet = nine_mm();
        model.min_resistance = bullet.kinetic_energy(300.0);
        let result = evaluate_armour(300.0, &bullet, &soft_armour(0.0), &model);
        assert!(!result.penetration);
        assert_eq!(result.remaining_energy, 0.0);
    }

    #[test]
    fn test_penetration_leaves_exact_remainder() {
        let bullet = nine_mm();
        let armour = soft_armour(1.0e3);
        let result = evaluate_armour(800.0, &bullet, &armour, &ArmourModelConfig::default());

        // 2560 J impact against the 350 J floor
        assert!(result.penetration);
        assert_eq!(result.armour_resistance, 350.0);
        assert!((result.remaining_energy - (result.kinetic_energy - 350.0)).abs() < 1e-9);

        let expected = armour.thickness * (1.0 - (350.0 / result.kinetic_energy).sqrt());
        assert!((result.deformation - expected).abs() < 1e-15);
        assert!(result.deformation > 0.0 && result.deformation <= armour.thickness);

        let exit = result.exit_velocity(bullet.mass_kg());
        assert!((bullet.kinetic_energy(exit) - result.remaining_energy).abs() < 1e-9);
    }

    #[test]
    fn test_full_pipeline_penetrating() {
        let mut sim = run();
        let air = sim.air_stage(&air(), 25.0).unwrap();
        assert!(matches!(sim.state(), RunState::AirDone { .. }));

        let armour = sim.armour_stage(&soft_armour(4.0e6)).unwrap();
        assert!(armour.penetration);
        assert_eq!(armour.initial_velocity, air.final_velocity);
        assert!((armour.armour_resistance - 400.0).abs() < 1e-9);

        let tissue = match sim.tissue_stage(&tissue(), 0.4).unwrap() {
            TissueOutcome::Penetrated(result) => result,
            TissueOutcome::NotPenetrated => panic!("expected penetration"),
        };
        assert!((tissue.initial_kinetic_energy - armour.remaining_energy).abs() < 1e-9);
        assert!(tissue.final_position >= air.final_position + 0.4);
        assert!(tissue.time_elapsed > air.time_elapsed);
        assert!(tissue.final_velocity < armour.exit_velocity(0.008));
        assert!(tissue.energy_loss > 0.0);
        assert!(sim.state().is_finished());
        assert_eq!(sim.tissue_result(), Some(&tissue));

        let results = sim.results().unwrap();
        assert_eq!(results.air, air);
        assert_eq!(results.tissue.stage_result(), Some(&tissue));
    }

    #[test]
    fn test_tissue_skipped_when_armour_holds() {
        let mut sim = run();
        sim.air_stage(&air(), 25.0).unwrap();
        let armour = sim.armour_stage(&soft_armour(2.0e7)).unwrap();
        assert!(!armour.penetration);

        let outcome = sim.tissue_stage(&tissue(), 0.4).unwrap();
        assert_eq!(outcome, TissueOutcome::NotPenetrated);
        assert!(outcome.stage_result().is_none());
        assert!(matches!(sim.state(), RunState::Stopped { .. }));
        assert!(sim.tissue_result().is_none());
        assert!(sim.results().unwrap().tissue.stage_result().is_none());
    }

    #[test]
    fn test_stage_order_is_enforced() {
        let mut sim = run();
        assert!(matches!(
            sim.armour_stage(&soft_armour(4.0e6)),
            Err(BallisticsError::StageOrder { stage: Stage::Armour, .. })
        ));
        assert!(matches!(
            sim.tissue_stage(&tissue(), 0.4),
            Err(BallisticsError::StageOrder { stage: Stage::Tissue, .. })
        ));
        assert!(sim.results().is_err());
        assert_eq!(sim.state(), &RunState::Start);

        sim.air_stage(&air(), 5.0).unwrap();
        assert!(matches!(
            sim.air_stage(&air(), 5.0),
            Err(BallisticsError::StageOrder { stage: Stage::Air, phase: "air done" })
        ));
        assert!(matches!(
            sim.tissue_stage(&tissue(), 0.4),
            Err(BallisticsError::StageOrder { stage: Stage::Tissue, .. })
        ));

        sim.armour_stage(&soft_armour(4.0e6)).unwrap();
        assert!(sim.armour_stage(&soft_armour(4.0e6)).is_err());

        sim.tissue_stage(&tissue(), 0.1).unwrap();
        assert!(sim.tissue_stage(&tissue(), 0.1).is_err());
    }

    #[test]
    fn test_failed_stage_leaves_state_unchanged() {
        let mut sim = run();
        let bad = Medium::new("bad", -1.0, 0.3);
        assert!(matches!(
            sim.air_stage(&bad, 5.0),
            Err(BallisticsError::InvalidInput(_))
        ));
        assert_eq!(sim.state(), &RunState::Start);
        assert!(sim.air_stage(&air(), 5.0).is_ok());
    }

    #[test]
    fn test_rejects_degenerate_projectile() {
        let mut bullet = nine_mm();
        bullet.mass = -8.0;
        assert!(matches!(
            SimulationRun::new(bullet, pistol()),
            Err(BallisticsError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_independent_runs_are_identical() {
        let mut a = run();
        let mut b = run();
        let first = a.air_stage(&air(), 25.0).unwrap();
        let second = b.air_stage(&air(), 25.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_run_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<SimulationRun>();
    }

    #[test]
    fn test_run_pipeline() {
        let scenario = Scenario {
            air: air(),
            air_distance: 10.0,
            armour: soft_armour(4.0e6),
            tissue: tissue(),
            tissue_depth: 0.2,
        };
        let mut sim = run();
        let results = sim.run_pipeline(&scenario).unwrap();
        assert!(results.armour.penetration);
        assert!(results.tissue.stage_result().is_some());

        // A finished run cannot be replayed
        assert!(sim.run_pipeline(&scenario).is_err());
    }
}
