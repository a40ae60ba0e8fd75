//! Energy accounting and text renderings of a finished run.

use serde::Serialize;
use std::fmt::Write;

use crate::constants::{JOULES_TO_FTLBS, MPS_TO_FPS};
use crate::integrator::StageResult;
use crate::medium::{Armour, Medium};
use crate::projectile::{Launcher, Projectile};
use crate::simulation::{ArmourResult, PipelineResults, Scenario, TissueOutcome};

/// Where the muzzle energy went
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBreakdown {
    pub initial: f64,     // J at the muzzle
    pub air_loss: f64,    // J
    pub armour_loss: f64, // J
    pub tissue_loss: f64, // J
    pub remaining: f64,   // J still carried after the tissue stage
}

impl EnergyBreakdown {
    pub const LABELS: [&'static str; 4] =
        ["Air Loss", "Armour Loss", "Tissue Loss", "Remaining Energy"];

    pub fn from_results(air: &StageResult, armour: &ArmourResult, tissue: &TissueOutcome) -> Self {
        let (tissue_loss, remaining) = match tissue {
            TissueOutcome::Penetrated(result) => (result.energy_loss, result.final_kinetic_energy),
            TissueOutcome::NotPenetrated => (0.0, 0.0),
        };
        Self {
            initial: air.initial_kinetic_energy,
            air_loss: air.energy_loss,
            armour_loss: armour.energy_absorbed(),
            tissue_loss,
            remaining,
        }
    }

    pub fn components(&self) -> [(&'static str, f64); 4] {
        [
            (Self::LABELS[0], self.air_loss),
            (Self::LABELS[1], self.armour_loss),
            (Self::LABELS[2], self.tissue_loss),
            (Self::LABELS[3], self.remaining),
        ]
    }

    pub fn total(&self) -> f64 {
        self.components().iter().map(|(_, v)| v.max(0.0)).sum()
    }

    /// Percentage of the component total per component; zeros when empty
    pub fn shares(&self) -> [f64; 4] {
        let total = self.total();
        let mut shares = [0.0; 4];
        if total > 0.0 {
            for (share, (_, value)) in shares.iter_mut().zip(self.components()) {
                *share = value.max(0.0) / total * 100.0;
            }
        }
        shares
    }
}

/// Everything needed to present one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub launcher: Launcher,
    pub projectile: Projectile,
    pub air_medium: Medium,
    pub air_distance: f64,
    pub armour: Armour,
    pub tissue_medium: Medium,
    pub tissue_depth: f64,
    pub air: StageResult,
    pub armour_result: ArmourResult,
    pub tissue: TissueOutcome,
    pub energy: EnergyBreakdown,
}

impl PipelineReport {
    pub fn new(
        launcher: &Launcher,
        projectile: &Projectile,
        scenario: &Scenario,
        results: PipelineResults,
    ) -> Self {
        let energy = EnergyBreakdown::from_results(&results.air, &results.armour, &results.tissue);
        Self {
            launcher: launcher.clone(),
            projectile: projectile.clone(),
            air_medium: scenario.air.clone(),
            air_distance: scenario.air_distance,
            armour: scenario.armour.clone(),
            tissue_medium: scenario.tissue.clone(),
            tissue_depth: scenario.tissue_depth,
            air: results.air,
            armour_result: results.armour,
            tissue: results.tissue,
            energy,
        }
    }
}

/// Horizontal bar chart of the energy split
pub fn render_energy_chart(energy: &EnergyBreakdown, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Energy Distribution Across Mediums");
    let shares = energy.shares();
    for ((label, value), share) in energy.components().iter().zip(shares) {
        let filled = ((share / 100.0) * width as f64).round() as usize;
        let bar: String = "█".repeat(filled.min(width)) + &"·".repeat(width - filled.min(width));
        let _ = writeln!(out, "{label:<17} {bar} {share:>5.1}% {value:>9.2} J");
    }
    out
}

fn stage_rows(out: &mut String, title: &str, result: &StageResult) {
    let _ = writeln!(out, "║ {title:<38} ║");
    let _ = writeln!(
        out,
        "║ Final Velocity:  {:>9.2} m/s ({:>7.1} fps) ║",
        result.final_velocity,
        result.final_velocity * MPS_TO_FPS
    );
    let _ = writeln!(out, "║ Final Position:  {:>9.4} m               ║", result.final_position);
    let _ = writeln!(out, "║ Vertical Drop:   {:>9.5} m               ║", result.vertical_drop);
    let _ = writeln!(out, "║ Time Elapsed:    {:>9.5} s               ║", result.time_elapsed);
    let _ = writeln!(
        out,
        "║ Energy Loss:     {:>9.2} J ({:>7.1} ft-lb) ║",
        result.energy_loss,
        result.energy_loss * JOULES_TO_FTLBS
    );
    let _ = writeln!(
        out,
        "║ Final Energy:    {:>9.2} J ({:>7.1} ft-lb) ║",
        result.final_kinetic_energy,
        result.final_kinetic_energy * JOULES_TO_FTLBS
    );
}

/// Boxed summary table
pub fn render_table(report: &PipelineReport) -> String {
    let mut out = String::new();
    let rule = "═".repeat(40);
    let _ = writeln!(out, "╔{rule}╗");
    let _ = writeln!(out, "║ {:<38} ║", "TERMINAL BALLISTICS RESULTS");
    let _ = writeln!(
        out,
        "║ {:<38} ║",
        format!("{} / {}", report.launcher.name, report.projectile.name)
    );
    let _ = writeln!(out, "╠{rule}╣");
    let _ = writeln!(
        out,
        "║ Muzzle Energy:   {:>9.2} J ({:>7.1} ft-lb) ║",
        report.energy.initial,
        report.energy.initial * JOULES_TO_FTLBS
    );
    let _ = writeln!(out, "╠{rule}╣");
    stage_rows(
        &mut out,
        &format!("AIR ({}, {} m)", report.air_medium.name, report.air_distance),
        &report.air,
    );
    let _ = writeln!(out, "╠{rule}╣");

    let armour = &report.armour_result;
    let _ = writeln!(out, "║ {:<38} ║", format!("ARMOUR ({})", report.armour.name));
    let _ = writeln!(out, "║ Impact Energy:   {:>9.2} J               ║", armour.kinetic_energy);
    let _ = writeln!(out, "║ Resistance:      {:>9.2} J               ║", armour.armour_resistance);
    let _ = writeln!(
        out,
        "║ Penetration:     {:>9}                 ║",
        if armour.penetration { "yes" } else { "no" }
    );
    let _ = writeln!(out, "║ Remaining:       {:>9.2} J               ║", armour.remaining_energy);
    let _ = writeln!(out, "║ Deformation:     {:>9.5} m               ║", armour.deformation);
    let _ = writeln!(out, "╠{rule}╣");

    let tissue_title = format!(
        "TISSUE ({}, {} m)",
        report.tissue_medium.name, report.tissue_depth
    );
    match &report.tissue {
        TissueOutcome::Penetrated(result) => stage_rows(&mut out, &tissue_title, result),
        TissueOutcome::NotPenetrated => {
            let _ = writeln!(out, "║ {tissue_title:<38} ║");
            let _ = writeln!(out, "║ {:<38} ║", "Projectile did not penetrate the armour");
        }
    }
    let _ = writeln!(out, "╚{rule}╝");
    out
}

fn stage_csv_row(out: &mut String, stage: &str, r: &StageResult) {
    let _ = writeln!(
        out,
        "{stage},{:.4},{:.4},{:.6},{:.6},{:.6},{:.4},{:.4},",
        r.initial_kinetic_energy,
        r.final_velocity,
        r.final_position,
        r.vertical_drop,
        r.time_elapsed,
        r.energy_loss,
        r.final_kinetic_energy
    );
}

/// One row per stage, in pipeline order
pub fn render_csv(report: &PipelineReport) -> String {
    let mut out = String::from(
        "stage,initial_energy_j,final_velocity_mps,final_position_m,vertical_drop_m,time_s,energy_loss_j,final_energy_j,penetration\n",
    );
    stage_csv_row(&mut out, "air", &report.air);

    // Armour has no travel, so position, drop and time stay empty
    let a = &report.armour_result;
    let _ = writeln!(
        out,
        "armour,{:.4},{:.4},,,,{:.4},{:.4},{}",
        a.kinetic_energy,
        a.exit_velocity(report.projectile.mass_kg()),
        a.energy_absorbed(),
        a.remaining_energy,
        a.penetration
    );

    if let TissueOutcome::Penetrated(tissue) = &report.tissue {
        stage_csv_row(&mut out, "tissue", tissue);
    }
    out
}
