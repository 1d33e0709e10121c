use super::types::{MassProperties, Transform};
use crate::utils::allocator::EntityId;

/// A rigid body participating in the mechanism connectivity graph.
///
/// The assembly core only needs bodies as graph nodes with a pose and mass
/// data; collision and full dynamics state belong to the surrounding engine.
#[derive(Debug, Clone)]
pub struct Body {
    pub id: EntityId,
    pub name: String,
    pub transform: Transform,
    pub mass_properties: MassProperties,
}

impl Body {
    pub fn new(name: &str) -> Self {
        Self {
            id: EntityId::default(),
            name: name.into(),
            transform: Transform::identity(),
            mass_properties: MassProperties::default(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mass_properties(mut self, mass_properties: MassProperties) -> Self {
        self.mass_properties = mass_properties;
        self
    }
}
