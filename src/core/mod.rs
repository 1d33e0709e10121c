//! Core state types: bodies, joint frames, force elements, and the per-joint
//! realization record.

pub mod applied_force;
pub mod body;
pub mod force_elements;
pub mod frames;
pub mod realization;
pub mod types;

pub use applied_force::AppliedForceTracker;
pub use body::Body;
pub use force_elements::{
    AxisDecl, AxisForceElements, DamperParams, ForceElementHandle, LimitStopParams, SpringParams,
};
pub use frames::FramePair;
pub use realization::{JointDecl, JointState, Realization};
pub use types::{MassProperties, Transform};
