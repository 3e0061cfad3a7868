//! Bounding volumes and the intersection tests between them
//!
//! # Module Organization
//!
//! - [`primitives`] - Rays, spheres, AABBs, planes and frusta
//! - [`cylinder`] - Arbitrarily oriented bounding cylinder
//! - [`oriented_box`] - Oriented bounding box and its SAT tests
//! - [`obb_fit`] - Best-fit OBB construction from point clouds
//! - [`gjk`] - Boolean GJK over support maps
//!
//! # Coordinate Conventions
//!
//! Column vectors, `world = T * R * S * local`, Y up. Every volume keeps
//! its pose in world space and transforms query inputs into its own frame.

pub mod primitives;
pub mod cylinder;
pub mod oriented_box;
pub mod obb_fit;
pub mod gjk;

// Re-export commonly used types
pub use primitives::{BoundingSphere, ContainmentType, Frustum, Plane, PlaneIntersectionType, Ray, AABB};
pub use cylinder::{BoundingCylinder, BoxCylinderIntersection};
pub use oriented_box::{AabbContact, OrientedBoundingBox};
pub use gjk::{gjk_intersects, SupportMap};
