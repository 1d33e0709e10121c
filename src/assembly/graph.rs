use crate::core::body::Body;
use crate::error::{JointError, Result};
use crate::utils::allocator::{Arena, EntityId};
use std::collections::{HashMap, HashSet, VecDeque};

/// One joint edge selected into the spanning tree, oriented root-outwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeEdge {
    pub joint: EntityId,
    /// Body closer to the root.
    pub inboard: EntityId,
    pub outboard: EntityId,
}

/// Result of the spanning-tree pass over a mechanism.
#[derive(Debug, Default)]
pub struct SpanningTree {
    /// Tree edges in breadth-first order from the root; candidates for
    /// mobilizer modeling.
    pub tree_joints: Vec<TreeEdge>,
    /// Edges left out of the tree; these close kinematic loops and must be
    /// modeled as constraints.
    pub loop_joints: Vec<EntityId>,
}

/// Undirected body-connectivity graph of a mechanism, bodies as nodes and
/// joints as edges.
#[derive(Debug, Default)]
pub struct MechanismGraph {
    adjacency: HashMap<EntityId, Vec<(EntityId, EntityId)>>,
    edges: usize,
}

impl MechanismGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edge(&mut self, joint: EntityId, body_a: EntityId, body_b: EntityId) {
        self.adjacency
            .entry(body_a)
            .or_default()
            .push((body_b, joint));
        self.adjacency
            .entry(body_b)
            .or_default()
            .push((body_a, joint));
        self.edges += 1;
    }

    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Computes a breadth-first spanning tree from `root`.
    ///
    /// Every body in `bodies` must be reachable; otherwise the whole assembly
    /// aborts with [`JointError::DisconnectedTopology`] naming an unreached
    /// body. Edges visiting an already-covered body land in `loop_joints`.
    pub fn span(&self, root: EntityId, bodies: &Arena<Body>) -> Result<SpanningTree> {
        let mut tree = SpanningTree::default();
        let mut visited = HashSet::new();
        let mut claimed = HashSet::new();
        let mut queue = VecDeque::new();

        visited.insert(root);
        queue.push_back(root);

        while let Some(body) = queue.pop_front() {
            let Some(neighbors) = self.adjacency.get(&body) else {
                continue;
            };
            for &(neighbor, joint) in neighbors {
                if !claimed.insert(joint) {
                    continue;
                }
                if visited.insert(neighbor) {
                    tree.tree_joints.push(TreeEdge {
                        joint,
                        inboard: body,
                        outboard: neighbor,
                    });
                    queue.push_back(neighbor);
                } else {
                    tree.loop_joints.push(joint);
                }
            }
        }

        for id in bodies.ids() {
            if !visited.contains(&id) {
                let name = bodies
                    .get(id)
                    .map(|body| body.name.clone())
                    .unwrap_or_else(|| format!("{id:?}"));
                return Err(JointError::DisconnectedTopology(name));
            }
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_arena(names: &[&str]) -> (Arena<Body>, Vec<EntityId>) {
        let mut arena = Arena::new();
        let ids = names.iter().map(|n| arena.insert(Body::new(n))).collect();
        (arena, ids)
    }

    fn joint_ids(n: usize) -> Vec<EntityId> {
        // Joint ids only need to be distinct for graph purposes.
        let mut arena = Arena::new();
        (0..n).map(|i| arena.insert(i)).collect()
    }

    #[test]
    fn chain_has_no_loop_joints() {
        let (bodies, b) = body_arena(&["base", "upper", "lower", "foot"]);
        let j = joint_ids(3);

        let mut graph = MechanismGraph::new();
        graph.add_edge(j[0], b[0], b[1]);
        graph.add_edge(j[1], b[1], b[2]);
        graph.add_edge(j[2], b[2], b[3]);

        let tree = graph.span(b[0], &bodies).unwrap();
        assert_eq!(tree.tree_joints.len(), 3);
        assert!(tree.loop_joints.is_empty());
        // Breadth-first orientation follows the chain.
        assert_eq!(tree.tree_joints[0].inboard, b[0]);
        assert_eq!(tree.tree_joints[2].outboard, b[3]);
    }

    #[test]
    fn quadrilateral_breaks_exactly_one_loop() {
        let (bodies, b) = body_arena(&["a", "b", "c", "d"]);
        let j = joint_ids(4);

        let mut graph = MechanismGraph::new();
        graph.add_edge(j[0], b[0], b[1]);
        graph.add_edge(j[1], b[1], b[2]);
        graph.add_edge(j[2], b[2], b[3]);
        graph.add_edge(j[3], b[3], b[0]);

        let tree = graph.span(b[0], &bodies).unwrap();
        assert_eq!(tree.tree_joints.len(), 3);
        assert_eq!(tree.loop_joints.len(), 1);
    }

    #[test]
    fn unreachable_body_aborts() {
        let (bodies, b) = body_arena(&["a", "b", "island"]);
        let j = joint_ids(1);

        let mut graph = MechanismGraph::new();
        graph.add_edge(j[0], b[0], b[1]);

        assert_eq!(
            graph.span(b[0], &bodies).unwrap_err(),
            JointError::DisconnectedTopology("island".into())
        );
    }
}
