//! Global configuration constants for the Articulator assembly core.

/// Maximum number of generalized-coordinate axes a single joint may declare.
pub const MAX_JOINT_AXES: usize = 6;

/// Degrees of freedom of an unconstrained rigid body; a loop-closing
/// constraint removes `SPATIAL_DOFS - joint dofs` of them.
pub const SPATIAL_DOFS: usize = 6;

/// Default fixed timestep for the simulation loop (in seconds).
pub const DEFAULT_TIME_STEP: f64 = 1.0 / 60.0;

/// Tolerance on `|q|^2 - 1` when validating rotation quaternions.
pub const UNIT_ROTATION_TOLERANCE: f64 = 1e-9;

/// Soft budget for a full mechanism assembly pass (in milliseconds).
pub const ASSEMBLY_BUDGET_MS: f32 = 50.0;
