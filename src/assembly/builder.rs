use super::graph::MechanismGraph;
use crate::config::ASSEMBLY_BUDGET_MS;
use crate::core::body::Body;
use crate::core::realization::JointState;
use crate::error::{JointError, Result};
use crate::system::{EngineShared, SystemRef};
use crate::utils::allocator::{Arena, EntityId};
use crate::utils::logging::{warn_if_assembly_budget_exceeded, ScopedTimer};
use log::{debug, info, warn};
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Walks a mechanism's connectivity graph and realizes every joint as either
/// a mobilizer or a loop-closing constraint.
///
/// Runs once per mechanism, entirely inside the engine's assembly critical
/// section. On any error the system latch is left open, so nothing partial is
/// ever simulated.
pub struct TopologyBuilder;

impl TopologyBuilder {
    pub fn assemble(
        bodies: &Arena<Body>,
        joints: &mut Arena<JointState>,
        system: &SystemRef,
        engine: &Arc<EngineShared>,
        root: EntityId,
    ) -> Result<()> {
        // Loop analysis spans the whole mechanism; one lock for the entire
        // pass, never per joint.
        let mut coordination = engine.assembly.lock();
        let timer = ScopedTimer::new("assembly::mechanism");

        if system.read().assembly_complete() {
            return Err(JointError::DuplicateRealization);
        }
        if !bodies.contains(root) {
            return Err(JointError::DisconnectedTopology(format!("{root:?}")));
        }

        let tree = {
            let _timer = ScopedTimer::new("assembly::spanning_tree");

            let mut graph = MechanismGraph::new();
            for joint in joints.iter() {
                for body in [joint.parent(), joint.child()] {
                    if !bodies.contains(body) {
                        return Err(JointError::DisconnectedTopology(format!(
                            "{body:?} (attached to joint '{}')",
                            joint.name()
                        )));
                    }
                }
                // Caller-forced loop breaks never become tree candidates.
                if !joint.force_loop_break() {
                    graph.add_edge(joint.id(), joint.parent(), joint.child());
                }
            }
            graph.span(root, bodies)?
        };

        let forced_loops: Vec<EntityId> = joints
            .iter()
            .filter(|joint| joint.force_loop_break())
            .map(|joint| joint.id())
            .collect();

        {
            let _timer = ScopedTimer::new("assembly::realize");

            for edge in &tree.tree_joints {
                let joint = joints
                    .get_mut(edge.joint)
                    .ok_or(JointError::UnknownJoint(edge.joint))?;
                let reversed = joint.parent() != edge.inboard;
                let frames = if reversed {
                    joint.frames().swapped()
                } else {
                    *joint.frames()
                };
                let handle = system.write().add_mobilizer(
                    edge.joint,
                    edge.inboard,
                    edge.outboard,
                    joint.dofs(),
                    reversed,
                    frames,
                );
                joint.realize_as_mobilizer(handle, reversed)?;
                debug!(
                    "joint '{}' realized as mobilizer ({} dofs{})",
                    joint.name(),
                    joint.dofs(),
                    if reversed { ", reversed" } else { "" }
                );
            }

            for &id in tree.loop_joints.iter().chain(&forced_loops) {
                let joint = joints.get_mut(id).ok_or(JointError::UnknownJoint(id))?;
                let handle = system.write().add_loop_constraint(
                    id,
                    joint.parent(),
                    joint.child(),
                    joint.dofs(),
                );
                joint.realize_as_constraint(handle)?;
                warn!(
                    "breaking kinematic loop at joint '{}' with a constraint",
                    joint.name()
                );
            }
        }

        {
            let _timer = ScopedTimer::new("assembly::force_elements");

            for joint in joints.iter_mut() {
                let axes = joint.axes().to_vec();
                for (axis, decl) in axes.iter().enumerate() {
                    if let Some(spring) = decl.spring {
                        joint.attach_spring(axis, spring)?;
                    }
                    if let Some(damper) = decl.damper {
                        joint.attach_damper(axis, damper)?;
                    }
                    if let Some(stop) = decl.limit_stop {
                        joint.attach_limit_stop(axis, stop)?;
                    }
                }
            }
        }

        {
            let _timer = ScopedTimer::new("assembly::validate");
            Self::validate(joints)?;
            system.read().validate_dof_claims()?;
        }

        let (mobilizers, constraints, dofs) = {
            let mut system = system.write();
            system.latch_assembled();
            (
                system.mobilizer_count(),
                system.constraint_count(),
                system.total_dofs(),
            )
        };

        coordination.assemblies_completed += 1;
        coordination.loop_joints = tree
            .loop_joints
            .iter()
            .chain(&forced_loops)
            .copied()
            .collect();

        info!(
            "mechanism assembled: {} bodies, {mobilizers} mobilizers, {constraints} constraints, {dofs} dofs",
            bodies.len()
        );
        warn_if_assembly_budget_exceeded(timer.elapsed(), ASSEMBLY_BUDGET_MS);
        Ok(())
    }

    /// Read-only per-joint consistency sweep run before the latch flips.
    fn validate(joints: &Arena<JointState>) -> Result<()> {
        #[cfg(feature = "parallel")]
        {
            let joints: Vec<&JointState> = joints.iter().collect();
            joints
                .par_iter()
                .try_for_each(|joint| Self::validate_joint(joint))
        }
        #[cfg(not(feature = "parallel"))]
        {
            joints.iter().try_for_each(Self::validate_joint)
        }
    }

    fn validate_joint(joint: &JointState) -> Result<()> {
        joint.frames().check_orthonormal()?;
        debug_assert!(
            !joint.realization_raw().is_unmodeled(),
            "joint '{}' left unrealized by assembly",
            joint.name()
        );
        Ok(())
    }
}
