//! Utility helpers: generational allocation and logging instrumentation.

pub mod allocator;
pub mod logging;

pub use allocator::{Arena, EntityId};
pub use logging::ScopedTimer;
