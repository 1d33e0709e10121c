use crate::{
    assembly::TopologyBuilder,
    config::DEFAULT_TIME_STEP,
    core::{
        body::Body,
        realization::{JointDecl, JointState, Realization},
    },
    error::{JointError, Result},
    system::{EngineShared, MultibodySystem, SystemRef},
    utils::{
        allocator::{Arena, EntityId},
        logging::ScopedTimer,
    },
};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Central container for one mechanism: bodies, joint states, and the shared
/// multibody system they are assembled into.
///
/// The world owns the system and the engine coordination state; joints hold
/// counted back-references to both, so each world assembles independently of
/// every other world in the process.
pub struct MechanismWorld {
    pub bodies: Arena<Body>,
    joints: Arena<JointState>,
    system: SystemRef,
    engine: Arc<EngineShared>,
    root: Option<EntityId>,
    time: f64,
    time_step: f64,
    time_accumulated: f64,
    /// Staleness policy for applied joint forces: when set, forces older than
    /// this many seconds are zeroed at the start of each fixed step.
    applied_force_max_age: Option<f64>,
}

impl MechanismWorld {
    pub fn new(time_step: f64) -> Self {
        let ts = if time_step <= 0.0 {
            DEFAULT_TIME_STEP
        } else {
            time_step
        };

        Self {
            bodies: Arena::new(),
            joints: Arena::new(),
            system: MultibodySystem::shared(),
            engine: EngineShared::shared(),
            root: None,
            time: 0.0,
            time_step: ts,
            time_accumulated: 0.0,
            applied_force_max_age: None,
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn system(&self) -> &SystemRef {
        &self.system
    }

    pub fn engine(&self) -> &Arc<EngineShared> {
        &self.engine
    }

    pub fn set_applied_force_max_age(&mut self, max_age: Option<f64>) {
        self.applied_force_max_age = max_age;
    }

    /// Adds a body; the first body added becomes the default assembly root.
    pub fn add_body(&mut self, body: Body) -> EntityId {
        let id = self.bodies.insert(body);
        if let Some(stored) = self.bodies.get_mut(id) {
            stored.id = id;
        }
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    pub fn body(&self, id: EntityId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn set_root(&mut self, root: EntityId) {
        self.root = Some(root);
    }

    /// Declares a joint between two bodies. Axis-count and frame validation
    /// happen here, before assembly; a failed declaration leaves the world
    /// unchanged.
    pub fn declare_joint(&mut self, decl: JointDecl) -> Result<EntityId> {
        let state = JointState::from_decl(decl, self.system.clone(), self.engine.clone())?;
        let id = self.joints.insert(state);
        if let Some(stored) = self.joints.get_mut(id) {
            stored.id = id;
        }
        Ok(id)
    }

    pub fn joint(&self, id: EntityId) -> Option<&JointState> {
        self.joints.get(id)
    }

    pub fn joint_mut(&mut self, id: EntityId) -> Option<&mut JointState> {
        self.joints.get_mut(id)
    }

    pub fn joint_ids(&self) -> Vec<EntityId> {
        self.joints.ids().collect()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Removes a joint and releases its system-owned force elements.
    pub fn remove_joint(&mut self, id: EntityId) -> Result<()> {
        let mut state = self.joints.remove(id).ok_or(JointError::UnknownJoint(id))?;
        state.release_elements();
        Ok(())
    }

    /// Runs the topology builder over the whole mechanism from the default
    /// root (the first body added).
    pub fn assemble(&mut self) -> Result<()> {
        let root = self
            .root
            .ok_or_else(|| JointError::DisconnectedTopology("no root body".into()))?;
        self.assemble_from(root)
    }

    /// Runs the topology builder over the whole mechanism from `root`.
    pub fn assemble_from(&mut self, root: EntityId) -> Result<()> {
        TopologyBuilder::assemble(&self.bodies, &mut self.joints, &self.system, &self.engine, root)
    }

    pub fn assembled(&self) -> bool {
        self.system.read().assembly_complete()
    }

    fn joint_ref(&self, id: EntityId) -> Result<&JointState> {
        self.joints.get(id).ok_or(JointError::UnknownJoint(id))
    }

    fn joint_ref_mut(&mut self, id: EntityId) -> Result<&mut JointState> {
        self.joints.get_mut(id).ok_or(JointError::UnknownJoint(id))
    }

    /// Applies a generalized force on one joint axis, stamped with the current
    /// simulation time. Last-write-wins; no accumulation.
    pub fn apply_force(&mut self, joint: EntityId, axis: usize, value: f64) -> Result<()> {
        let now = self.time;
        self.joint_ref_mut(joint)?.apply_force(axis, value, now)
    }

    /// Same as [`MechanismWorld::apply_force`] with an explicit timestamp.
    pub fn apply_force_at(
        &mut self,
        joint: EntityId,
        axis: usize,
        value: f64,
        timestamp: f64,
    ) -> Result<()> {
        self.joint_ref_mut(joint)?.apply_force(axis, value, timestamp)
    }

    /// Sensor-equivalent per-axis reading: the last user-applied forces
    /// combined with the generalized reactions the integrator stored in the
    /// system. Fails with [`JointError::NotAssembled`] before the latch flips.
    pub fn equivalent_force(&self, joint: EntityId) -> Result<Vec<f64>> {
        let state = self.joint_ref(joint)?;
        let realization = state.realization()?;
        let system = self.system.read();

        let mut out = Vec::with_capacity(state.dofs());
        for axis in 0..state.dofs() {
            let (applied, _) = state.applied(axis)?;
            let reaction = match realization {
                Realization::Mobilizer(handle) => system
                    .mobilizer(handle)
                    .map(|m| system.reaction(m.q_offset + axis))
                    .unwrap_or(0.0),
                Realization::Constraint(handle) => system
                    .constraint(handle)
                    .map(|c| c.reactions[axis])
                    .unwrap_or(0.0),
                Realization::Unmodeled => 0.0,
            };
            out.push(applied + reaction);
        }
        Ok(out)
    }

    pub fn is_realized_as_mobilizer(&self, joint: EntityId) -> Result<bool> {
        self.joint_ref(joint)?.is_realized_as_mobilizer()
    }

    pub fn is_realized_as_constraint(&self, joint: EntityId) -> Result<bool> {
        self.joint_ref(joint)?.is_realized_as_constraint()
    }

    pub fn is_reversed(&self, joint: EntityId) -> Result<bool> {
        self.joint_ref(joint)?.is_reversed()
    }

    /// Advances simulation time using a fixed-timestep accumulator. The
    /// integrator collaborator runs elsewhere; the world's own per-step work
    /// is the applied-force staleness sweep.
    pub fn step(&mut self, dt: f64) {
        self.time_accumulated += dt;

        while self.time_accumulated >= self.time_step {
            self.time_accumulated -= self.time_step;
            self.time += self.time_step;

            if let Some(max_age) = self.applied_force_max_age {
                let _timer = ScopedTimer::new("step::stale_forces");
                self.sweep_stale_forces(max_age);
            }
        }
    }

    fn sweep_stale_forces(&mut self, max_age: f64) {
        let now = self.time;

        #[cfg(feature = "parallel")]
        {
            let mut joints: Vec<&mut JointState> = self.joints.iter_mut().collect();
            joints.par_iter_mut().for_each(|joint| {
                joint.clear_stale_forces(now, max_age);
            });
        }
        #[cfg(not(feature = "parallel"))]
        for joint in self.joints.iter_mut() {
            joint.clear_stale_forces(now, max_age);
        }
    }
}
