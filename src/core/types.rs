use crate::config::UNIT_ROTATION_TOLERANCE;
use crate::error::{JointError, Result};
use glam::{DMat3, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Rigid transform (rotation + translation) between two frames.
///
/// Joint frames never carry scale; the rotation component must stay a unit
/// quaternion, and construction rejects anything else instead of renormalizing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub rotation: DQuat,
    pub position: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            rotation: DQuat::IDENTITY,
            position: DVec3::ZERO,
        }
    }
}

impl Transform {
    /// Builds a transform, rejecting non-unit rotations.
    pub fn new(rotation: DQuat, position: DVec3) -> Result<Self> {
        let t = Self { rotation, position };
        t.check_orthonormal()?;
        Ok(t)
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// Pure translation along `position`.
    pub fn from_translation(position: DVec3) -> Self {
        Self {
            rotation: DQuat::IDENTITY,
            position,
        }
    }

    /// Fails with [`JointError::NonOrthonormalRotation`] when the rotation
    /// quaternion has drifted off unit length.
    pub fn check_orthonormal(&self) -> Result<()> {
        if (self.rotation.length_squared() - 1.0).abs() > UNIT_ROTATION_TOLERANCE {
            return Err(JointError::NonOrthonormalRotation);
        }
        Ok(())
    }

    /// Applies another transform on top of this one, returning the composition.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            rotation: (self.rotation * other.rotation).normalize(),
            position: self.position + self.rotation * other.position,
        }
    }

    pub fn inverse(&self) -> Transform {
        let inv_rot = self.rotation.conjugate();
        Transform {
            rotation: inv_rot,
            position: -(inv_rot * self.position),
        }
    }
}

/// Mass and inertia tensor data for a body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MassProperties {
    pub mass: f64,
    pub inertia: DMat3,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            inertia: DMat3::IDENTITY,
        }
    }
}
