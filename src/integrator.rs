//! Fixed-step trajectory integrator for a single medium.
//!
//! Horizontal motion is decelerated by quadratic drag, vertical motion by
//! gravity alone. Each step updates velocity before position
//! (semi-implicit Euler) in the order
//!
//! 1. `v  += -(0.5 ρ Cd A v²) / m · dt`
//! 2. `x  += v · dt`
//! 3. `vy -= g · dt`
//! 4. `y  += vy · dt`
//! 5. `t  += dt`
//!
//! and the loop ends once the projectile has covered the requested
//! distance or its horizontal velocity has dropped to zero or below.
//! Keeping this order and the default timestep makes results reproducible
//! bit for bit.

use nalgebra::Vector2;
use serde::Serialize;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::{ensure_finite, ensure_non_negative, BallisticsError, Result};
use crate::medium::Medium;
use crate::projectile::Projectile;

/// Kinematic state threaded through one integration call.
///
/// `x` components are horizontal (down-range), `y` components vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicState {
    pub position: Vector2<f64>, // m
    pub velocity: Vector2<f64>, // m/s
    pub time: f64,              // s
}

impl KinematicState {
    /// At the origin, moving horizontally at `velocity`
    pub fn at_muzzle(velocity: f64) -> Self {
        Self {
            position: Vector2::zeros(),
            velocity: Vector2::new(velocity, 0.0),
            time: 0.0,
        }
    }

    fn validate(&self) -> Result<()> {
        ensure_finite("initial horizontal position", self.position.x)?;
        ensure_finite("initial vertical position", self.position.y)?;
        ensure_finite("initial velocity", self.velocity.x)?;
        ensure_finite("initial vertical velocity", self.velocity.y)?;
        ensure_finite("initial time", self.time)?;
        Ok(())
    }
}

/// Snapshot of one stage's outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageResult {
    pub initial_kinetic_energy: f64, // J
    pub final_velocity: f64,         // m/s, horizontal
    /// Clock at the end of the stage, including earlier stages
    pub time_elapsed: f64, // s
    pub final_position: f64,          // m, horizontal
    pub final_vertical_position: f64, // m
    pub final_vertical_velocity: f64, // m/s
    pub final_kinetic_energy: f64,    // J
    pub vertical_drop: f64,           // m
    pub energy_loss: f64,             // J
    /// Time spent in this stage alone
    pub duration: f64, // s
    pub steps: u64,
    /// Stopped because velocity reached zero, not because distance was covered
    pub halted: bool,
}

impl StageResult {
    /// Terminal state to hand to the next stage
    pub fn terminal_state(&self) -> KinematicState {
        KinematicState {
            position: Vector2::new(self.final_position, self.final_vertical_position),
            velocity: Vector2::new(self.final_velocity, self.final_vertical_velocity),
            time: self.time_elapsed,
        }
    }
}

/// Advance `initial` through `medium` for `target_distance` metres of
/// additional horizontal travel.
pub fn integrate(
    projectile: &Projectile,
    medium: &Medium,
    target_distance: f64,
    initial: KinematicState,
    config: &SimulationConfig,
) -> Result<StageResult> {
    projectile.validate()?;
    medium.validate()?;
    ensure_non_negative("target distance", target_distance)?;
    initial.validate()?;

    let dt = config.integrator.time_step;
    let gravity = config.integrator.gravity;
    let max_steps = config.integrator.max_steps;

    let area = projectile.cross_sectional_area();
    let mass_kg = projectile.mass_kg();
    let initial_kinetic_energy = projectile.kinetic_energy(initial.velocity.x);
    let target_position = initial.position.x + target_distance;

    debug!(
        medium = %medium.name,
        distance = target_distance,
        velocity = initial.velocity.x,
        "integrating stage"
    );

    let mut state = initial;
    let mut steps: u64 = 0;
    let mut halted = false;

    while state.position.x < target_position {
        if let Some(limit) = max_steps {
            if steps >= limit {
                return Err(BallisticsError::StepLimitExceeded {
                    limit,
                    position: state.position.x,
                });
            }
        }

        let drag_force = medium.drag_force(area, state.velocity.x);
        let acceleration = -drag_force / mass_kg;

        state.velocity.x += acceleration * dt;
        state.position.x += state.velocity.x * dt;

        state.velocity.y -= gravity * dt;
        state.position.y += state.velocity.y * dt;

        state.time += dt;
        steps += 1;

        if state.velocity.x <= 0.0 {
            halted = true;
            break;
        }
    }

    if halted && config.clamp_stopped_velocity {
        state.velocity.x = state.velocity.x.max(0.0);
    }

    let final_kinetic_energy = projectile.kinetic_energy(state.velocity.x);
    let result = StageResult {
        initial_kinetic_energy,
        final_velocity: state.velocity.x,
        time_elapsed: state.time,
        final_position: state.position.x,
        final_vertical_position: state.position.y,
        final_vertical_velocity: state.velocity.y,
        final_kinetic_energy,
        vertical_drop: (state.position.y - initial.position.y).abs(),
        energy_loss: initial_kinetic_energy - final_kinetic_energy,
        duration: state.time - initial.time,
        steps,
        halted,
    };

    debug!(
        medium = %medium.name,
        steps,
        halted,
        final_velocity = result.final_velocity,
        energy_loss = result.energy_loss,
        "stage integrated"
    );

    Ok(result)
}
