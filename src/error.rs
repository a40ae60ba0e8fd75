//! Error type shared by the simulation core, preset loading and the CLI.

use std::fmt;
use thiserror::Error;

/// Which kind of preset a lookup was for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    Weapon,
    Bullet,
    Medium,
    Armour,
}

impl PresetKind {
    pub const ALL: [PresetKind; 4] = [
        PresetKind::Weapon,
        PresetKind::Bullet,
        PresetKind::Medium,
        PresetKind::Armour,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PresetKind::Weapon => "weapon",
            PresetKind::Bullet => "bullet",
            PresetKind::Medium => "medium",
            PresetKind::Armour => "armour",
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage names, used in sequencing errors and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Air,
    Armour,
    Tissue,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Air => f.write_str("air"),
            Stage::Armour => f.write_str("armour"),
            Stage::Tissue => f.write_str("tissue"),
        }
    }
}

#[derive(Debug, Error)]
pub enum BallisticsError {
    /// A stage was called before its predecessor, or called twice
    #[error("{stage} stage cannot run while the simulation is in the {phase} phase")]
    StageOrder { stage: Stage, phase: &'static str },

    #[error("{kind} preset not found: {name}")]
    PresetNotFound { kind: PresetKind, name: String },

    #[error("invalid {kind} preset '{name}': {reason}")]
    InvalidPreset {
        kind: PresetKind,
        name: String,
        reason: String,
    },

    /// Degenerate physical input rejected before integration
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("integration stopped after {limit} steps at x = {position:.6} m")]
    StepLimitExceeded { limit: u64, position: f64 },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BallisticsError>;

/// Reject NaN and infinities in physical inputs
pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(BallisticsError::InvalidInput(format!(
            "{field} must be finite, got {value}"
        )))
    }
}

pub(crate) fn ensure_positive(field: &str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(BallisticsError::InvalidInput(format!(
            "{field} must be greater than zero, got {value}"
        )))
    }
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> Result<()> {
    ensure_finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(BallisticsError::InvalidInput(format!(
            "{field} must not be negative, got {value}"
        )))
    }
}
