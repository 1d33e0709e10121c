//! The shared multibody system produced by assembly, plus the engine-level
//! coordination state joints point back to.
//!
//! The system is owned by the world; joints hold a counted, non-owning
//! reference ([`SystemRef`]). All structural mutation happens during assembly,
//! before the per-system `assembly_complete` latch flips; afterwards only
//! force values change.

use crate::config::{MAX_JOINT_AXES, SPATIAL_DOFS};
use crate::core::force_elements::{
    DamperParams, ForceElementHandle, LimitStopParams, SpringParams,
};
use crate::core::frames::FramePair;
use crate::error::{JointError, Result};
use crate::utils::allocator::{Arena, EntityId};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Shared, counted reference to the multibody system.
pub type SystemRef = Arc<RwLock<MultibodySystem>>;

/// Handle to a mobilizer owned by the multibody system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MobilizerHandle(pub EntityId);

/// Handle to a loop-closing constraint owned by the multibody system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConstraintHandle(pub EntityId);

/// A generalized-coordinate joint model on the spanning tree. Claims a
/// contiguous block of `dofs` coordinates starting at `q_offset`.
#[derive(Debug, Clone)]
pub struct Mobilizer {
    pub joint: EntityId,
    /// Body closer to the mechanism root.
    pub inboard: EntityId,
    pub outboard: EntityId,
    pub dofs: usize,
    pub q_offset: usize,
    /// The declared parent is the outboard body here.
    pub reversed: bool,
    /// Attachment frames as assembled; already role-swapped when `reversed`.
    pub frames: FramePair,
}

/// An algebraic constraint standing in for a joint whose edge closes a
/// kinematic loop. Removes the spatial freedoms the joint does not permit.
#[derive(Debug, Clone)]
pub struct LoopConstraint {
    pub joint: EntityId,
    pub body_a: EntityId,
    pub body_b: EntityId,
    pub equations: usize,
    /// Constraint reaction per joint axis, written by the integrator.
    pub reactions: [f64; MAX_JOINT_AXES],
}

/// A spring, damper, or limit stop acting along one joint axis. Owned by the
/// system; joints keep handles only.
#[derive(Debug, Clone)]
pub enum ForceElement {
    Spring {
        joint: EntityId,
        axis: usize,
        params: SpringParams,
    },
    Damper {
        joint: EntityId,
        axis: usize,
        params: DamperParams,
    },
    LimitStop {
        joint: EntityId,
        axis: usize,
        params: LimitStopParams,
    },
}

/// Arena-backed storage for everything the assembled mechanism contributes to
/// the dynamics formulation.
#[derive(Debug)]
pub struct MultibodySystem {
    mobilizers: Arena<Mobilizer>,
    constraints: Arena<LoopConstraint>,
    force_elements: Arena<ForceElement>,
    total_dofs: usize,
    /// Generalized reaction per coordinate, written each step by the
    /// integrator collaborator.
    reactions: Vec<f64>,
    assembly_complete: bool,
}

impl Default for MultibodySystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MultibodySystem {
    pub fn new() -> Self {
        Self {
            mobilizers: Arena::new(),
            constraints: Arena::new(),
            force_elements: Arena::new(),
            total_dofs: 0,
            reactions: Vec::new(),
            assembly_complete: false,
        }
    }

    pub fn shared() -> SystemRef {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn assembly_complete(&self) -> bool {
        self.assembly_complete
    }

    pub(crate) fn latch_assembled(&mut self) {
        self.assembly_complete = true;
    }

    pub fn total_dofs(&self) -> usize {
        self.total_dofs
    }

    pub fn mobilizer_count(&self) -> usize {
        self.mobilizers.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub(crate) fn add_mobilizer(
        &mut self,
        joint: EntityId,
        inboard: EntityId,
        outboard: EntityId,
        dofs: usize,
        reversed: bool,
        frames: FramePair,
    ) -> MobilizerHandle {
        let q_offset = self.total_dofs;
        self.total_dofs += dofs;
        self.reactions.resize(self.total_dofs, 0.0);
        let id = self.mobilizers.insert(Mobilizer {
            joint,
            inboard,
            outboard,
            dofs,
            q_offset,
            reversed,
            frames,
        });
        MobilizerHandle(id)
    }

    pub(crate) fn add_loop_constraint(
        &mut self,
        joint: EntityId,
        body_a: EntityId,
        body_b: EntityId,
        dofs: usize,
    ) -> ConstraintHandle {
        let id = self.constraints.insert(LoopConstraint {
            joint,
            body_a,
            body_b,
            equations: SPATIAL_DOFS - dofs,
            reactions: [0.0; MAX_JOINT_AXES],
        });
        ConstraintHandle(id)
    }

    pub(crate) fn add_force_element(&mut self, element: ForceElement) -> ForceElementHandle {
        ForceElementHandle(self.force_elements.insert(element))
    }

    pub(crate) fn remove_force_element(&mut self, handle: ForceElementHandle) {
        self.force_elements.remove(handle.0);
    }

    pub fn mobilizer(&self, handle: MobilizerHandle) -> Option<&Mobilizer> {
        self.mobilizers.get(handle.0)
    }

    pub fn constraint(&self, handle: ConstraintHandle) -> Option<&LoopConstraint> {
        self.constraints.get(handle.0)
    }

    pub fn force_element(&self, handle: ForceElementHandle) -> Option<&ForceElement> {
        self.force_elements.get(handle.0)
    }

    pub(crate) fn force_element_mut(
        &mut self,
        handle: ForceElementHandle,
    ) -> Option<&mut ForceElement> {
        self.force_elements.get_mut(handle.0)
    }

    /// Integrator hook: stores the generalized reactions for the current step.
    /// The slice length must match [`MultibodySystem::total_dofs`].
    pub fn set_reactions(&mut self, reactions: &[f64]) {
        self.reactions.clear();
        self.reactions.extend_from_slice(reactions);
        self.reactions.resize(self.total_dofs, 0.0);
    }

    /// Integrator hook: stores per-axis reactions on a loop constraint.
    pub fn set_constraint_reactions(
        &mut self,
        handle: ConstraintHandle,
        reactions: &[f64],
    ) -> Result<()> {
        let constraint = self
            .constraints
            .get_mut(handle.0)
            .ok_or(JointError::UnknownJoint(handle.0))?;
        for (slot, value) in constraint.reactions.iter_mut().zip(reactions) {
            *slot = *value;
        }
        Ok(())
    }

    /// Reaction on one generalized coordinate; zero when out of range or not
    /// yet written.
    pub fn reaction(&self, coordinate: usize) -> f64 {
        self.reactions.get(coordinate).copied().unwrap_or(0.0)
    }

    /// Consistency check run before the latch flips: every mobilizer must
    /// claim a disjoint coordinate block and the blocks must tile
    /// `total_dofs` exactly.
    pub(crate) fn validate_dof_claims(&self) -> Result<()> {
        let mut claims: Vec<(usize, usize)> = self
            .mobilizers
            .iter()
            .map(|m| (m.q_offset, m.dofs))
            .collect();
        claims.sort_unstable();

        let mut next = 0;
        for (offset, dofs) in claims {
            if offset < next {
                return Err(JointError::DuplicateRealization);
            }
            next = offset + dofs;
        }
        if next != self.total_dofs {
            return Err(JointError::DuplicateRealization);
        }
        Ok(())
    }
}

/// Mechanism-wide coordination state shared through the engine back-reference.
///
/// Loop analysis touches the whole connectivity graph at once, so assembly
/// serializes on the single mutex here rather than taking per-joint locks.
#[derive(Debug)]
pub struct EngineShared {
    pub(crate) assembly: Mutex<AssemblyCoordination>,
}

#[derive(Debug, Default)]
pub struct AssemblyCoordination {
    pub assemblies_completed: u64,
    /// Joints realized as loop-closing constraints in the last assembly.
    pub loop_joints: Vec<EntityId>,
}

impl Default for EngineShared {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineShared {
    pub fn new() -> Self {
        Self {
            assembly: Mutex::new(AssemblyCoordination::default()),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Whether the last assembly broke a loop at this joint.
    pub fn is_loop_joint(&self, joint: EntityId) -> bool {
        self.assembly.lock().loop_joints.contains(&joint)
    }

    pub fn assemblies_completed(&self) -> u64 {
        self.assembly.lock().assemblies_completed
    }
}
