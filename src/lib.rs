//! Articulator – joint realization core for multibody dynamics engines.
//!
//! This crate translates abstract joint declarations (parent body, child
//! body, relative frames, per-axis force elements) into the two low-level
//! representations a reduced-coordinate dynamics formulation understands:
//! mobilizers on a spanning tree of the body graph, and algebraic constraints
//! closing the kinematic loops the tree cannot express.

pub mod assembly;
pub mod config;
pub mod core;
pub mod error;
pub mod system;
pub mod utils;
pub mod world;

pub use glam::{DMat3, DQuat, DVec3};

pub use assembly::{MechanismGraph, SpanningTree, TopologyBuilder, TreeEdge};
pub use crate::core::{
    applied_force::AppliedForceTracker,
    body::Body,
    force_elements::{AxisDecl, DamperParams, ForceElementHandle, LimitStopParams, SpringParams},
    frames::FramePair,
    realization::{JointDecl, JointState, Realization},
    types::{MassProperties, Transform},
};
pub use error::{JointError, Result};
pub use system::{
    ConstraintHandle, EngineShared, ForceElement, LoopConstraint, Mobilizer, MobilizerHandle,
    MultibodySystem, SystemRef,
};
pub use utils::allocator::{Arena, EntityId};
pub use world::MechanismWorld;

/// High-level convenience wrapper that owns a [`MechanismWorld`].
pub struct ArticulationEngine {
    world: MechanismWorld,
}

impl ArticulationEngine {
    /// Creates a new engine with the provided fixed timestep.
    pub fn new(timestep: f64) -> Self {
        Self {
            world: MechanismWorld::new(timestep),
        }
    }

    /// Adds a body to the mechanism and returns its generated [`EntityId`].
    pub fn add_body(&mut self, body: Body) -> EntityId {
        self.world.add_body(body)
    }

    /// Declares a joint; fails before assembly on invalid axis counts or
    /// non-orthonormal frames.
    pub fn declare_joint(&mut self, decl: JointDecl) -> Result<EntityId> {
        self.world.declare_joint(decl)
    }

    /// Realizes every declared joint as a mobilizer or constraint.
    pub fn assemble(&mut self) -> Result<()> {
        self.world.assemble()
    }

    /// Advances the simulation clock by the provided delta time.
    pub fn step(&mut self, dt: f64) {
        self.world.step(dt);
    }

    /// Applies a generalized force on one joint axis at the current time.
    pub fn apply_force(&mut self, joint: EntityId, axis: usize, value: f64) -> Result<()> {
        self.world.apply_force(joint, axis, value)
    }

    /// Sensor-equivalent per-axis force reading for a joint.
    pub fn equivalent_force(&self, joint: EntityId) -> Result<Vec<f64>> {
        self.world.equivalent_force(joint)
    }

    /// Immutable access to the underlying world.
    pub fn world(&self) -> &MechanismWorld {
        &self.world
    }

    /// Mutable access to the underlying world.
    pub fn world_mut(&mut self) -> &mut MechanismWorld {
        &mut self.world
    }
}
