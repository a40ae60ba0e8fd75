//! Physical and numerical constants used by the staged simulation.

/// Gravitational acceleration in m/s²
///
/// Rounded textbook value, not the standard 9.80665.
pub const G_ACCEL_MPS2: f64 = 9.81;

/// Default integration timestep in seconds
///
/// Value: 1e-7 s. At 360 m/s a step advances the projectile 36 µm, which
/// keeps explicit Euler error well below the precision of the input data.
/// Cost: roughly `distance / (velocity * dt)` steps per stage, so 25 m of
/// air is ~7e5 iterations.
pub const DEFAULT_TIME_STEP_S: f64 = 1e-7;

/// Empirical minimum armour resistance in joules
///
/// No armour in the model resists less than this, independent of the
/// projectile geometry or the armour's energy-absorption rating.
pub const MIN_ARMOUR_RESISTANCE_J: f64 = 350.0;

/// Floor applied to the projectile frontal area in armour calculations (m²)
pub const MIN_IMPACT_AREA_M2: f64 = 1e-4;

/// Floor applied to the impact energy when estimating deformation (J)
pub const MIN_ENERGY_DIVISOR_J: f64 = 1e-4;

/// Grams per kilogram
pub const GRAMS_PER_KG: f64 = 1000.0;

/// Millimetres per metre
pub const MM_PER_M: f64 = 1000.0;

/// Conversion factor: joules to foot-pounds
pub const JOULES_TO_FTLBS: f64 = 0.737562149;

/// Conversion factor: metres per second to feet per second
pub const MPS_TO_FPS: f64 = 3.28084;
