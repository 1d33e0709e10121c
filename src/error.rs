//! Error types for the articulator crate.
//!
//! `JointError` is the crate-wide fallible-operation error (spec §7); every
//! public API that can fail returns the crate-local [`Result`] alias.

use thiserror::Error;

use crate::utils::allocator::EntityId;

/// Errors surfaced by joint declaration, assembly, and runtime queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JointError {
    /// An axis index is out of range for the joint's degrees of freedom.
    #[error("invalid axis {axis} for joint with {dofs} dof(s)")]
    InvalidAxis { axis: usize, dofs: usize },

    /// A query requires the mechanism to be assembled, but it is not yet.
    #[error("mechanism has not been assembled")]
    NotAssembled,

    /// A joint declared more axes than the crate supports.
    #[error("joint declares too many axes: {0}")]
    TooManyAxes(usize),

    /// The body graph is not a single connected component.
    #[error("disconnected topology: {0}")]
    DisconnectedTopology(String),

    /// A joint was realized more than once — an internal invariant violation.
    #[error("joint already realized")]
    DuplicateRealization,

    /// A rotation provided at declaration time is not orthonormal.
    #[error("rotation is not orthonormal")]
    NonOrthonormalRotation,

    /// A lookup referenced a joint id that no longer resolves.
    #[error("unknown joint: {0:?}")]
    UnknownJoint(EntityId),
}

/// Crate-local result alias over [`JointError`].
pub type Result<T> = std::result::Result<T, JointError>;
