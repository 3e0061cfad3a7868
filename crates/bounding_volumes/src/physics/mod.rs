//! Physics module for collision detection and response
//!
//! Bounding volumes live in [`collision`]; [`character`] drives an upright
//! cylinder through a set of static colliders.

pub mod character;
pub mod collision;
pub mod error;

#[cfg(test)]
mod tests;

pub use character::{CharacterBody, CollisionResolver, StaticCollider, StepOutcome};
pub use collision::{
    AabbContact,
    BoundingCylinder,
    BoundingSphere,
    BoxCylinderIntersection,
    ContainmentType,
    Frustum,
    OrientedBoundingBox,
    Plane,
    PlaneIntersectionType,
    Ray,
    SupportMap,
    AABB,
};
pub use error::CollisionError;
