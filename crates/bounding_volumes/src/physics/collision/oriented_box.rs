//! Oriented bounding box
//!
//! Box with arbitrary orientation, tested with the separating axis theorem.
//! The orientation is a pure rotation whose columns are the box's local
//! axes in world space.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat3, Quat, Vec3};
use crate::physics::error::CollisionError;
use super::gjk::SupportMap;
use super::primitives::{BoundingSphere, ContainmentType, Frustum, Plane, PlaneIntersectionType, Ray, AABB};

/// Added to every `|R|` term of the OBB-vs-OBB test so that near-parallel
/// edge pairs cannot produce a zero-length cross axis that falsely separates
pub const SAT_EPSILON: f32 = 1e-6;

/// Cross-product axes with a squared length below this are skipped
pub const AXIS_DEGENERACY_EPSILON: f32 = 1e-6;

/// Contact reported by the OBB-vs-AABB penetration test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbContact {
    /// Unit axis along which moving the OBB separates it from the box
    pub normal: Vec3,
    /// Overlap along `normal`
    pub penetration: f32,
}

/// An oriented bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBoundingBox {
    /// Center in world space
    pub center: Vec3,
    /// Half size along each local axis
    pub extents: Vec3,
    /// Local axes as columns
    pub orientation: Mat3,
}

impl OrientedBoundingBox {
    /// Axis-aligned box with the given half extents
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self::with_orientation(center, extents, Mat3::identity())
    }

    /// Box with an explicit orientation
    pub fn with_orientation(center: Vec3, extents: Vec3, orientation: Mat3) -> Self {
        debug_assert!(extents.iter().all(|e| *e >= 0.0), "OBB extents must be non-negative");
        Self { center, extents, orientation }
    }

    /// Checked constructor for extents that come from outside the crate
    pub fn try_new(center: Vec3, extents: Vec3, orientation: Mat3) -> Result<Self, CollisionError> {
        if !extents.iter().all(|e| e.is_finite() && *e >= 0.0) {
            return Err(CollisionError::InvalidExtents { x: extents.x, y: extents.y, z: extents.z });
        }
        Ok(Self::with_orientation(center, extents, orientation))
    }

    /// Same volume as `aabb`, identity orientation
    pub fn from_aabb(aabb: &AABB) -> Self {
        Self::new(aabb.center(), aabb.extents())
    }

    /// Apply `rotation` on top of the current orientation
    pub fn rotate(&mut self, rotation: &Mat3) {
        self.orientation = rotation * self.orientation;
    }

    /// Quaternion variant of [`Self::rotate`]
    pub fn rotate_quat(&mut self, rotation: &Quat) {
        self.rotate(&rotation.to_rotation_matrix().into_inner());
    }

    /// Local axes in world space
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.orientation.column(0).into_owned(),
            self.orientation.column(1).into_owned(),
            self.orientation.column(2).into_owned(),
        ]
    }

    /// The eight corners in world space
    pub fn corners(&self) -> [Vec3; 8] {
        let local = AABB::from_center_extents(Vec3::zeros(), self.extents).corners();
        local.map(|corner| self.to_world_space(&corner))
    }

    /// World-space AABB enclosing the box
    pub fn aabb(&self) -> AABB {
        let half = utils::abs_matrix(&self.orientation) * self.extents;
        AABB::from_center_extents(self.center, half)
    }

    /// Enclosed volume
    pub fn volume(&self) -> f32 {
        8.0 * self.extents.x * self.extents.y * self.extents.z
    }

    /// World point into box-local coordinates
    pub fn to_obb_space(&self, point: &Vec3) -> Vec3 {
        self.orientation.transpose() * (point - self.center)
    }

    /// Box-local point into world coordinates
    pub fn to_world_space(&self, point: &Vec3) -> Vec3 {
        self.orientation * point + self.center
    }

    fn local_bounds(&self) -> AABB {
        AABB::from_center_extents(Vec3::zeros(), self.extents)
    }

    /// Point containment; boundary points count as contained
    pub fn contains_point(&self, point: &Vec3) -> ContainmentType {
        if self.local_bounds().contains_point(self.to_obb_space(point)) {
            ContainmentType::Contains
        } else {
            ContainmentType::Disjoint
        }
    }

    /// OBB-vs-OBB separating axis test
    ///
    /// Gottschalk's formulation (RTCD 4.4.1): `other` is expressed in this
    /// box's frame and the 15 candidate axes are tested with closed-form
    /// projected radii.
    pub fn intersects_obb(&self, other: &OrientedBoundingBox) -> bool {
        let ea = self.extents;
        let eb = other.extents;

        let r = self.orientation.transpose() * other.orientation;
        let t = self.orientation.transpose() * (other.center - self.center);
        let abs_r = utils::abs_matrix(&r).add_scalar(SAT_EPSILON);

        // Axes of self
        for i in 0..3 {
            let ra = ea[i];
            let rb = eb[0] * abs_r[(i, 0)] + eb[1] * abs_r[(i, 1)] + eb[2] * abs_r[(i, 2)];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        // Axes of other
        for j in 0..3 {
            let ra = ea[0] * abs_r[(0, j)] + ea[1] * abs_r[(1, j)] + ea[2] * abs_r[(2, j)];
            let rb = eb[j];
            let tj = t[0] * r[(0, j)] + t[1] * r[(1, j)] + t[2] * r[(2, j)];
            if tj.abs() > ra + rb {
                return false;
            }
        }

        // Edge cross products
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[(i2, j)] + ea[i2] * abs_r[(i1, j)];
                let rb = eb[j1] * abs_r[(i, j2)] + eb[j2] * abs_r[(i, j1)];
                let tl = t[i2] * r[(i1, j)] - t[i1] * r[(i2, j)];
                if tl.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }

    /// OBB-vs-AABB separating axis test
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        self.intersects_aabb_with_penetration(aabb).is_some()
    }

    /// OBB-vs-AABB test that also reports the axis of least overlap
    ///
    /// Both shapes are projected vertex-by-vertex onto the world axes, the
    /// box axes and their nine cross products. The first axis with the
    /// strictly smallest overlap wins; this is the usual minimum
    /// translation heuristic rather than an exact contact.
    pub fn intersects_aabb_with_penetration(&self, aabb: &AABB) -> Option<AabbContact> {
        let obb_corners = self.corners();
        let aabb_corners = aabb.corners();
        let world = [Vec3::x(), Vec3::y(), Vec3::z()];
        let local = self.axes();

        let crosses = world
            .iter()
            .flat_map(|w| local.iter().map(move |l| w.cross(l)));
        let candidates = world.iter().copied().chain(local.iter().copied()).chain(crosses);

        let mut best: Option<AabbContact> = None;
        for axis in candidates {
            let length_sq = axis.magnitude_squared();
            if length_sq < AXIS_DEGENERACY_EPSILON {
                continue;
            }
            let axis = axis / length_sq.sqrt();

            let (obb_min, obb_max) = interval(&obb_corners, &axis);
            let (aabb_min, aabb_max) = interval(&aabb_corners, &axis);
            if obb_max < aabb_min || aabb_max < obb_min {
                return None;
            }

            let overlap = obb_max.min(aabb_max) - obb_min.max(aabb_min);
            if best.map_or(true, |contact| overlap < contact.penetration) {
                let normal = if obb_min < aabb_min { -axis } else { axis };
                best = Some(AabbContact { normal, penetration: overlap });
            }
        }

        best
    }

    /// Ray parameter of the first contact (0 when the origin is inside)
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let origin = self.to_obb_space(&ray.origin);
        let direction = self.orientation.transpose() * ray.direction;
        self.local_bounds().intersect_ray(origin, direction)
    }

    /// OBB-vs-sphere overlap (touching counts)
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let local = BoundingSphere::new(self.to_obb_space(&sphere.center), sphere.radius);
        self.local_bounds().intersects_sphere(&local)
    }

    /// Side of `plane` the box lies on
    pub fn intersects_plane(&self, plane: &Plane) -> PlaneIntersectionType {
        let local_normal = self.orientation.transpose() * plane.normal;
        let r = self.extents.dot(&local_normal.abs());
        let d = plane.distance_to_point(self.center);

        if d.abs() < r {
            PlaneIntersectionType::Intersecting
        } else if d > 0.0 {
            PlaneIntersectionType::Front
        } else {
            PlaneIntersectionType::Back
        }
    }

    /// Conservative frustum test: false only when some plane has the box fully behind it
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        frustum
            .planes
            .iter()
            .all(|plane| self.intersects_plane(plane) != PlaneIntersectionType::Back)
    }
}

fn interval(corners: &[Vec3; 8], axis: &Vec3) -> (f32, f32) {
    corners.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), corner| {
        let p = corner.dot(axis);
        (lo.min(p), hi.max(p))
    })
}

impl SupportMap for OrientedBoundingBox {
    fn support(&self, direction: &Vec3) -> Vec3 {
        let local = self.orientation.transpose() * direction;
        let corner = Vec3::new(
            if local.x >= 0.0 { self.extents.x } else { -self.extents.x },
            if local.y >= 0.0 { self.extents.y } else { -self.extents.y },
            if local.z >= 0.0 { self.extents.z } else { -self.extents.z },
        );
        self.to_world_space(&corner)
    }

    fn interior_point(&self) -> Vec3 {
        self.center
    }
}
