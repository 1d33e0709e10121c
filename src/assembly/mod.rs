//! Mechanism assembly: connectivity graph, spanning tree, and the
//! mobilizer-vs-constraint realization pass.

pub mod builder;
pub mod graph;

pub use builder::TopologyBuilder;
pub use graph::{MechanismGraph, SpanningTree, TreeEdge};
