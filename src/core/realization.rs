use super::applied_force::AppliedForceTracker;
use super::force_elements::{
    AxisDecl, AxisForceElements, DamperParams, ForceElementHandle, LimitStopParams, SpringParams,
};
use super::frames::FramePair;
use crate::config::MAX_JOINT_AXES;
use crate::error::{JointError, Result};
use crate::system::{ConstraintHandle, EngineShared, ForceElement, MobilizerHandle, SystemRef};
use crate::utils::allocator::EntityId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a joint is represented inside the multibody system.
///
/// A joint is physically modeled exactly one way; the sum type makes the
/// mobilizer/constraint mutual exclusion structural instead of a pair of
/// booleans that could both be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realization {
    /// Not yet assembled.
    Unmodeled,
    /// Generalized-coordinate model on the spanning tree.
    Mobilizer(MobilizerHandle),
    /// Algebraic loop-closing constraint.
    Constraint(ConstraintHandle),
}

impl Realization {
    pub fn is_unmodeled(&self) -> bool {
        matches!(self, Realization::Unmodeled)
    }

    pub fn is_mobilizer(&self) -> bool {
        matches!(self, Realization::Mobilizer(_))
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, Realization::Constraint(_))
    }
}

/// A joint declaration handed to the world before assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointDecl {
    pub name: String,
    pub parent: EntityId,
    pub child: EntityId,
    pub frames: FramePair,
    pub axes: Vec<AxisDecl>,
    /// Ask the topology builder to model this joint as a constraint even if a
    /// mobilizer would otherwise be chosen.
    pub break_loop_here: bool,
}

impl JointDecl {
    pub fn new(name: &str, parent: EntityId, child: EntityId) -> Self {
        Self {
            name: name.into(),
            parent,
            child,
            frames: FramePair::default(),
            axes: Vec::new(),
            break_loop_here: false,
        }
    }

    pub fn with_frames(mut self, frames: FramePair) -> Self {
        self.frames = frames;
        self
    }

    /// Appends an axis at the next free index.
    pub fn with_axis(mut self, axis: AxisDecl) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn with_loop_break(mut self) -> Self {
        self.break_loop_here = true;
        self
    }
}

/// Per-joint realization state: frames, force-element handles, the
/// mobilizer-vs-constraint decision, and the applied-force tracker.
///
/// Created when the joint is declared; destroyed with the joint. Shares the
/// multibody system and engine coordination state with every other joint of
/// the world (many-to-one, non-owning).
#[derive(Debug)]
pub struct JointState {
    pub(crate) id: EntityId,
    name: String,
    parent: EntityId,
    child: EntityId,
    frames: FramePair,
    axes: Vec<AxisDecl>,
    force_loop_break: bool,
    elements: AxisForceElements,
    realization: Realization,
    is_reversed: bool,
    tracker: AppliedForceTracker,
    system: SystemRef,
    engine: Arc<EngineShared>,
}

impl JointState {
    /// Validates and materializes a declaration. Declaring more than
    /// [`MAX_JOINT_AXES`] axes fails here, before assembly ever runs.
    pub(crate) fn from_decl(
        decl: JointDecl,
        system: SystemRef,
        engine: Arc<EngineShared>,
    ) -> Result<Self> {
        if decl.axes.len() > MAX_JOINT_AXES {
            return Err(JointError::TooManyAxes(decl.axes.len()));
        }
        decl.frames.check_orthonormal()?;

        let dofs = decl.axes.len();
        Ok(Self {
            id: EntityId::default(),
            name: decl.name,
            parent: decl.parent,
            child: decl.child,
            frames: decl.frames,
            axes: decl.axes,
            force_loop_break: decl.break_loop_here,
            elements: AxisForceElements::new(),
            realization: Realization::Unmodeled,
            is_reversed: false,
            tracker: AppliedForceTracker::new(dofs),
            system,
            engine,
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> EntityId {
        self.parent
    }

    pub fn child(&self) -> EntityId {
        self.child
    }

    pub fn dofs(&self) -> usize {
        self.axes.len()
    }

    pub fn frames(&self) -> &FramePair {
        &self.frames
    }

    pub fn axes(&self) -> &[AxisDecl] {
        &self.axes
    }

    pub fn elements(&self) -> &AxisForceElements {
        &self.elements
    }

    pub fn engine(&self) -> &Arc<EngineShared> {
        &self.engine
    }

    /// True once the owning world has finished building its multibody system.
    pub fn assembled(&self) -> bool {
        self.system.read().assembly_complete()
    }

    /// Whether loop analysis forced constraint modeling here. Readable during
    /// assembly; never changes after it.
    pub fn force_loop_break(&self) -> bool {
        self.force_loop_break
    }

    fn require_assembled(&self) -> Result<()> {
        if !self.assembled() {
            return Err(JointError::NotAssembled);
        }
        Ok(())
    }

    pub fn realization(&self) -> Result<Realization> {
        self.require_assembled()?;
        Ok(self.realization)
    }

    pub fn is_realized_as_mobilizer(&self) -> Result<bool> {
        Ok(self.realization()?.is_mobilizer())
    }

    pub fn is_realized_as_constraint(&self) -> Result<bool> {
        Ok(self.realization()?.is_constraint())
    }

    /// Whether the engine assembled this mobilizer with parent and child roles
    /// swapped relative to the declaration.
    pub fn is_reversed(&self) -> Result<bool> {
        self.require_assembled()?;
        Ok(self.is_reversed)
    }

    pub(crate) fn realization_raw(&self) -> Realization {
        self.realization
    }

    pub(crate) fn realize_as_mobilizer(
        &mut self,
        handle: MobilizerHandle,
        reversed: bool,
    ) -> Result<()> {
        if !self.realization.is_unmodeled() {
            return Err(JointError::DuplicateRealization);
        }
        self.realization = Realization::Mobilizer(handle);
        self.is_reversed = reversed;
        Ok(())
    }

    pub(crate) fn realize_as_constraint(&mut self, handle: ConstraintHandle) -> Result<()> {
        if !self.realization.is_unmodeled() {
            return Err(JointError::DuplicateRealization);
        }
        self.realization = Realization::Constraint(handle);
        self.force_loop_break = true;
        Ok(())
    }

    /// Overwrites the externally-applied force on `axis` (last-write-wins).
    pub fn apply_force(&mut self, axis: usize, value: f64, timestamp: f64) -> Result<()> {
        self.tracker.apply(axis, value, timestamp)
    }

    /// Last applied force and its timestamp.
    pub fn applied(&self, axis: usize) -> Result<(f64, f64)> {
        Ok((self.tracker.force(axis)?, self.tracker.timestamp()))
    }

    pub fn applied_timestamp(&self) -> f64 {
        self.tracker.timestamp()
    }

    /// Caller-driven staleness policy; see [`AppliedForceTracker`].
    pub fn clear_stale_forces(&mut self, now: f64, max_age: f64) -> bool {
        self.tracker.clear_if_older_than(now, max_age)
    }

    fn check_attachable(&self, axis: usize) -> Result<()> {
        // Attachment is only legal while the system is still being built;
        // elements are created exactly once, during assembly.
        if axis >= self.dofs() || self.assembled() {
            return Err(JointError::InvalidAxis {
                axis,
                dofs: self.dofs(),
            });
        }
        Ok(())
    }

    pub fn attach_spring(&mut self, axis: usize, params: SpringParams) -> Result<ForceElementHandle> {
        self.check_attachable(axis)?;
        let handle = self.system.write().add_force_element(ForceElement::Spring {
            joint: self.id,
            axis,
            params,
        });
        self.elements.set_spring(axis, handle);
        Ok(handle)
    }

    pub fn attach_damper(&mut self, axis: usize, params: DamperParams) -> Result<ForceElementHandle> {
        self.check_attachable(axis)?;
        let handle = self.system.write().add_force_element(ForceElement::Damper {
            joint: self.id,
            axis,
            params,
        });
        self.elements.set_damper(axis, handle);
        Ok(handle)
    }

    pub fn attach_limit_stop(
        &mut self,
        axis: usize,
        params: LimitStopParams,
    ) -> Result<ForceElementHandle> {
        self.check_attachable(axis)?;
        let handle = self
            .system
            .write()
            .add_force_element(ForceElement::LimitStop {
                joint: self.id,
                axis,
                params,
            });
        self.elements.set_limit_stop(axis, handle);
        Ok(handle)
    }

    /// Runtime stiffness adjustment through the stored handle. Returns whether
    /// a spring was attached on `axis`.
    pub fn set_spring_stiffness(&mut self, axis: usize, stiffness: f64) -> Result<bool> {
        if axis >= self.dofs() {
            return Err(JointError::InvalidAxis {
                axis,
                dofs: self.dofs(),
            });
        }
        let Some(handle) = self.elements.spring(axis) else {
            return Ok(false);
        };
        let mut system = self.system.write();
        if let Some(ForceElement::Spring { params, .. }) = system.force_element_mut(handle) {
            params.stiffness = stiffness;
        }
        Ok(true)
    }

    /// Releases the joint's force elements from the system. Invoked when the
    /// joint is destroyed.
    pub(crate) fn release_elements(&mut self) {
        let handles = self.elements.drain_handles();
        if handles.is_empty() {
            return;
        }
        let mut system = self.system.write();
        for handle in handles {
            system.remove_force_element(handle);
        }
    }
}
