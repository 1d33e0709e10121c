use crate::config::MAX_JOINT_AXES;
use crate::utils::allocator::EntityId;
use serde::{Deserialize, Serialize};

/// Handle to a force element owned by the shared multibody system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForceElementHandle(pub EntityId);

/// Linear spring enforcing joint stiffness about one axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpringParams {
    pub stiffness: f64,
    /// Axis coordinate at which the spring is at rest.
    pub reference: f64,
}

/// Linear damper resisting axis velocity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamperParams {
    pub damping: f64,
}

/// Compliant stop enforcing joint travel limits about one axis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LimitStopParams {
    pub lower: f64,
    pub upper: f64,
    pub stiffness: f64,
    pub dissipation: f64,
}

/// Per-axis force element selection supplied with a joint declaration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AxisDecl {
    pub spring: Option<SpringParams>,
    pub damper: Option<DamperParams>,
    pub limit_stop: Option<LimitStopParams>,
}

impl AxisDecl {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn with_spring(mut self, stiffness: f64, reference: f64) -> Self {
        self.spring = Some(SpringParams {
            stiffness,
            reference,
        });
        self
    }

    pub fn with_damper(mut self, damping: f64) -> Self {
        self.damper = Some(DamperParams { damping });
        self
    }

    pub fn with_limit_stop(mut self, lower: f64, upper: f64, stiffness: f64, dissipation: f64) -> Self {
        self.limit_stop = Some(LimitStopParams {
            lower,
            upper,
            stiffness,
            dissipation,
        });
        self
    }
}

/// Handles to the force elements realized for a joint, one optional slot per
/// axis for each element kind.
///
/// The elements themselves are owned by the multibody system; the joint keeps
/// these handles for runtime parameter adjustment and for removal when the
/// joint is destroyed.
#[derive(Debug)]
pub struct AxisForceElements {
    springs: [Option<ForceElementHandle>; MAX_JOINT_AXES],
    dampers: [Option<ForceElementHandle>; MAX_JOINT_AXES],
    limit_stops: [Option<ForceElementHandle>; MAX_JOINT_AXES],
}

impl Default for AxisForceElements {
    fn default() -> Self {
        Self {
            springs: [None; MAX_JOINT_AXES],
            dampers: [None; MAX_JOINT_AXES],
            limit_stops: [None; MAX_JOINT_AXES],
        }
    }
}

impl AxisForceElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spring(&self, axis: usize) -> Option<ForceElementHandle> {
        self.springs.get(axis).copied().flatten()
    }

    pub fn damper(&self, axis: usize) -> Option<ForceElementHandle> {
        self.dampers.get(axis).copied().flatten()
    }

    pub fn limit_stop(&self, axis: usize) -> Option<ForceElementHandle> {
        self.limit_stops.get(axis).copied().flatten()
    }

    pub(crate) fn set_spring(&mut self, axis: usize, handle: ForceElementHandle) {
        self.springs[axis] = Some(handle);
    }

    pub(crate) fn set_damper(&mut self, axis: usize, handle: ForceElementHandle) {
        self.dampers[axis] = Some(handle);
    }

    pub(crate) fn set_limit_stop(&mut self, axis: usize, handle: ForceElementHandle) {
        self.limit_stops[axis] = Some(handle);
    }

    /// All live handles, used to release system-owned elements when the joint
    /// goes away.
    pub(crate) fn drain_handles(&mut self) -> Vec<ForceElementHandle> {
        let mut handles = Vec::new();
        for slot in self
            .springs
            .iter_mut()
            .chain(self.dampers.iter_mut())
            .chain(self.limit_stops.iter_mut())
        {
            if let Some(handle) = slot.take() {
                handles.push(handle);
            }
        }
        handles
    }
}
