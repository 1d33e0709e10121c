use super::types::Transform;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// The pair of rigid transforms attaching a joint's mobilizer frame to its
/// parent and child bodies, plus the default relative pose between the two
/// mobilizer frames at assembly time.
///
/// Read-only once the mechanism is assembled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FramePair {
    /// Parent body frame to mobilizer frame.
    pub parent_to_mobilizer: Transform,
    /// Child body frame to mobilizer frame.
    pub child_to_mobilizer: Transform,
    /// Default pose of the child mobilizer frame in the parent mobilizer frame.
    pub default_relative_pose: Transform,
}

impl Default for FramePair {
    fn default() -> Self {
        Self {
            parent_to_mobilizer: Transform::identity(),
            child_to_mobilizer: Transform::identity(),
            default_relative_pose: Transform::identity(),
        }
    }
}

impl FramePair {
    /// Builds a frame pair, rejecting any non-orthonormal rotation part.
    pub fn new(
        parent_to_mobilizer: Transform,
        child_to_mobilizer: Transform,
        default_relative_pose: Transform,
    ) -> Result<Self> {
        let pair = Self {
            parent_to_mobilizer,
            child_to_mobilizer,
            default_relative_pose,
        };
        pair.check_orthonormal()?;
        Ok(pair)
    }

    pub fn check_orthonormal(&self) -> Result<()> {
        self.parent_to_mobilizer.check_orthonormal()?;
        self.child_to_mobilizer.check_orthonormal()?;
        self.default_relative_pose.check_orthonormal()
    }

    /// The same attachment with parent and child roles exchanged, used when a
    /// mobilizer is assembled against the engine's preferred inboard body
    /// rather than the declared parent.
    pub fn swapped(&self) -> FramePair {
        FramePair {
            parent_to_mobilizer: self.child_to_mobilizer,
            child_to_mobilizer: self.parent_to_mobilizer,
            default_relative_pose: self.default_relative_pose.inverse(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JointError;
    use glam::{DQuat, DVec3};

    #[test]
    fn swapped_exchanges_attachment_roles() {
        let pair = FramePair::new(
            Transform::from_translation(DVec3::X),
            Transform::from_translation(DVec3::Y),
            Transform::identity(),
        )
        .unwrap();

        let swapped = pair.swapped();
        assert_eq!(swapped.parent_to_mobilizer.position, DVec3::Y);
        assert_eq!(swapped.child_to_mobilizer.position, DVec3::X);
    }

    #[test]
    fn rejects_drifted_rotation() {
        let mut bad = Transform::identity();
        bad.rotation = DQuat::from_xyzw(0.0, 0.0, 0.0, 1.1);
        assert_eq!(
            FramePair::new(bad, Transform::identity(), Transform::identity()).unwrap_err(),
            JointError::NonOrthonormalRotation
        );
    }
}
