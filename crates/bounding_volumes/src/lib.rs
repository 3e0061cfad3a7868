//! # Bounding Volumes
//!
//! Bounding-volume intersection tests and a character collision resolver.
//!
//! ## Features
//!
//! - **Bounding Cylinders**: arbitrary orientation, ray/segment/sphere/box tests
//! - **Oriented Boxes**: separating-axis tests and best-fit construction from points
//! - **Primitives**: rays, spheres, AABBs, planes and frusta
//! - **Character Resolution**: vertical snapping, sliding and step climbing
//!
//! ## Quick Start
//!
//! ```rust
//! use bounding_volumes::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let floor = AABB::new(Vec3::new(-50.0, -10.0, -50.0), Vec3::new(50.0, 0.0, 50.0));
//!     let mut body = CharacterBody::new(BoundingCylinder::new(Vec3::new(0.0, 12.0, 0.0), 5.0, 10.0));
//!
//!     let resolver = CollisionResolver::new(ResolverConfig::default())?;
//!     let outcome = resolver.step(&mut body, &[floor], 1.0)?;
//!
//!     assert!(outcome.on_ground);
//!     assert_eq!(body.position().y, 10.0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::many_single_char_names)]

pub mod core;
pub mod config;
pub mod foundation;
pub mod physics;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        core::config::{CollisionConfig, ObbFitConfig, ObbFitMode, ResolverConfig, Config, ConfigError},
        foundation::math::{Mat3, Mat4, Quat, Vec3},
        physics::{
            BoundingCylinder, BoundingSphere, BoxCylinderIntersection, CharacterBody, CollisionError,
            CollisionResolver, ContainmentType, Frustum, OrientedBoundingBox, Plane,
            PlaneIntersectionType, Ray, StaticCollider, StepOutcome, AABB,
        },
    };
}
