//! Primitive collision shapes and intersection algorithms
//!
//! Provides the value types every bounding volume is tested against
//! (rays, spheres, axis-aligned boxes, planes, frusta) together with the
//! classification enums shared by the volume queries.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Mat4, Vec3};

/// Result of a point containment query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainmentType {
    /// The shapes do not touch
    Disjoint,
    /// The queried shape lies entirely inside
    Contains,
}

/// Classification of a volume against a plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneIntersectionType {
    /// Entirely on the side the normal points to
    Front,
    /// Entirely on the opposite side
    Back,
    /// Straddling the plane
    Intersecting,
}

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (should be normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Check if a point lies inside or on the sphere
    pub fn contains_point(&self, point: Vec3) -> bool {
        (point - self.center).magnitude_squared() <= self.radius * self.radius
    }

    /// Get the penetration depth if intersecting (0.0 if not intersecting)
    pub fn penetration_depth(&self, other: &BoundingSphere) -> f32 {
        let distance = (self.center - other.center).magnitude();
        let radius_sum = self.radius + other.radius;
        if distance < radius_sum {
            radius_sum - distance
        } else {
            0.0
        }
    }

    /// Test ray intersection with this sphere
    /// Returns (distance, hit_point, normal) if hit, None otherwise
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, Vec3, Vec3)> {
        // Solve: |origin + t*direction - center|^2 = radius^2
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrt_discriminant = discriminant.sqrt();
        let t1 = (-b - sqrt_discriminant) / (2.0 * a);
        let t2 = (-b + sqrt_discriminant) / (2.0 * a);

        // Use the closest positive intersection
        let t = if t1 > 0.0 {
            t1
        } else if t2 > 0.0 {
            t2
        } else {
            return None;
        };

        let hit_point = ray.point_at(t);
        let normal = (hit_point - self.center).normalize();

        Some((t, hit_point, normal))
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Smallest AABB enclosing every point, `None` for an empty input
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Volume enclosed by the box
    pub fn volume(&self) -> f32 {
        let size = self.max - self.min;
        size.x * size.y * size.z
    }

    /// The eight corners, ordered by the bit pattern (x, y, z) of `index`
    pub fn corners(&self) -> [Vec3; 8] {
        std::array::from_fn(|index| {
            Vec3::new(
                if index & 1 == 0 { self.min.x } else { self.max.x },
                if index & 2 == 0 { self.min.y } else { self.max.y },
                if index & 4 == 0 { self.min.z } else { self.max.z },
            )
        })
    }

    /// Point of the box closest to `point` (the point itself when inside)
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Check if this AABB touches or overlaps a sphere
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        let closest = self.closest_point(&sphere.center);
        (closest - sphere.center).magnitude_squared() <= sphere.radius * sphere.radius
    }

    /// Test ray intersection with this AABB using slab method
    /// Returns the distance to the entry point if the ray intersects, None otherwise
    /// Based on "An Efficient and Robust Ray–Box Intersection Algorithm"
    pub fn intersect_ray(&self, ray_origin: Vec3, ray_dir: Vec3) -> Option<f32> {
        let inv_dir = Vec3::new(
            if ray_dir.x != 0.0 { 1.0 / ray_dir.x } else { f32::INFINITY },
            if ray_dir.y != 0.0 { 1.0 / ray_dir.y } else { f32::INFINITY },
            if ray_dir.z != 0.0 { 1.0 / ray_dir.z } else { f32::INFINITY },
        );

        let t1 = (self.min.x - ray_origin.x) * inv_dir.x;
        let t2 = (self.max.x - ray_origin.x) * inv_dir.x;
        let t3 = (self.min.y - ray_origin.y) * inv_dir.y;
        let t4 = (self.max.y - ray_origin.y) * inv_dir.y;
        let t5 = (self.min.z - ray_origin.z) * inv_dir.z;
        let t6 = (self.max.z - ray_origin.z) * inv_dir.z;

        let tmin = t1.min(t2).max(t3.min(t4)).max(t5.min(t6));
        let tmax = t1.max(t2).min(t3.max(t4)).min(t5.max(t6));

        // Ray intersects if tmax >= tmin and tmax >= 0
        if tmax >= tmin && tmax >= 0.0 {
            // Entry point distance, or 0 if we're inside the box
            Some(tmin.max(0.0))
        } else {
            None
        }
    }

    /// Slab test against a [`Ray`]
    pub fn intersects_ray(&self, ray: &Ray) -> Option<f32> {
        self.intersect_ray(ray.origin, ray.direction)
    }

    /// Smallest AABB enclosing both boxes
    pub fn merged(&self, other: &AABB) -> AABB {
        AABB::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }
}

/// Plane defined by normal and distance from origin
///
/// Points satisfy `normal · p + distance == 0`; positive signed distances
/// lie in front of the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Normal vector (should be normalized)
    pub normal: Vec3,
    /// Distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a new plane from normal and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal: normal.normalize(), distance }
    }

    /// Plane through `point` facing `normal`
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let distance = -normal.dot(&point);
        Self { normal, distance }
    }

    /// Plane from raw `(a, b, c, d)` coefficients, normalized when possible
    pub fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        let normal = Vec3::new(a, b, c);
        let length = normal.magnitude();
        if length > f32::EPSILON {
            Self { normal: normal / length, distance: d / length }
        } else {
            Self { normal, distance: d }
        }
    }

    /// Calculate signed distance from plane to point
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }

    /// Classify a point against the plane
    pub fn classify_point(&self, point: Vec3) -> PlaneIntersectionType {
        let d = self.distance_to_point(point);
        if d > 0.0 {
            PlaneIntersectionType::Front
        } else if d < 0.0 {
            PlaneIntersectionType::Back
        } else {
            PlaneIntersectionType::Intersecting
        }
    }
}

/// Frustum for visibility culling
///
/// Plane normals point inward: the inside of the frustum is in front of
/// all six planes.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    /// Six planes defining the frustum (left, right, bottom, top, near, far)
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Create a frustum from six planes
    pub fn new(planes: [Plane; 6]) -> Self {
        Self { planes }
    }

    /// Extract frustum planes from a view-projection matrix
    ///
    /// Gribb-Hartmann extraction for a `[0, 1]` clip depth range, matching
    /// column-vector matrices (`clip = vp * world`).
    pub fn from_matrix(vp_matrix: &Mat4) -> Self {
        let row = |i: usize| vp_matrix.row(i).transpose();
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));
        let plane = |v: nalgebra::Vector4<f32>| Plane::from_coefficients(v.x, v.y, v.z, v.w);

        Self {
            planes: [
                plane(r3 + r0),
                plane(r3 - r0),
                plane(r3 + r1),
                plane(r3 - r1),
                plane(r2),
                plane(r3 - r2),
            ],
        }
    }

    /// Check if an AABB is inside or intersects the frustum
    pub fn intersects_aabb(&self, aabb: &AABB) -> bool {
        for plane in &self.planes {
            // Corner furthest along the plane normal
            let mut p = aabb.min;
            if plane.normal.x >= 0.0 { p.x = aabb.max.x; }
            if plane.normal.y >= 0.0 { p.y = aabb.max.y; }
            if plane.normal.z >= 0.0 { p.z = aabb.max.z; }

            // If this point is outside the plane, the entire AABB is outside
            if plane.distance_to_point(p) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Test if a sphere intersects the frustum
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(sphere.center) >= -sphere.radius)
    }

    /// Test if a point is inside the frustum
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> AABB {
        AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_aabb_closest_point_clamps_outside_points() {
        let aabb = unit_box();
        let closest = aabb.closest_point(&Vec3::new(5.0, 0.5, -3.0));
        assert_eq!(closest, Vec3::new(1.0, 0.5, -1.0));

        let inside = Vec3::new(0.25, -0.5, 0.0);
        assert_eq!(aabb.closest_point(&inside), inside);
    }

    #[test]
    fn test_aabb_from_points() {
        let points = [
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-4.0, 5.0, 0.0),
            Vec3::new(2.0, 0.0, -1.0),
        ];
        let aabb = AABB::from_points(points.iter()).expect("non-empty input");
        assert_eq!(aabb.min, Vec3::new(-4.0, -2.0, -1.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 5.0, 3.0));
        assert!(AABB::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_aabb_volume_merge_and_containment() {
        let a = unit_box();
        let b = AABB::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 1.0));
        assert_relative_eq!(a.volume(), 8.0);

        let merged = a.merged(&b);
        assert_eq!(merged.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(merged.max, Vec3::new(3.0, 2.0, 1.0));
        assert!(a.intersects(&b));
        assert!(merged.contains_point(Vec3::new(3.0, 2.0, 1.0)));
        assert!(!a.contains_point(Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_sphere_overlap_and_penetration() {
        let a = BoundingSphere::new(Vec3::zeros(), 2.0);
        let b = BoundingSphere::new(Vec3::new(3.0, 0.0, 0.0), 1.5);
        assert!(a.intersects(&b));
        assert_relative_eq!(a.penetration_depth(&b), 0.5);
        assert!(a.contains_point(Vec3::new(0.0, 2.0, 0.0)));

        let far = BoundingSphere::new(Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!(!a.intersects(&far));
        assert_eq!(a.penetration_depth(&far), 0.0);
    }

    #[test]
    fn test_aabb_corners_are_distinct_extremes() {
        let corners = unit_box().corners();
        assert_eq!(corners[0], Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(corners[7], Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(corners[1], Vec3::new(1.0, -1.0, -1.0));
    }

    #[test]
    fn test_aabb_sphere_overlap() {
        let aabb = unit_box();
        assert!(aabb.intersects_sphere(&BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0)));
        assert!(!aabb.intersects_sphere(&BoundingSphere::new(Vec3::new(2.0, 2.0, 0.0), 1.0)));
    }

    #[test]
    fn test_aabb_ray_slab() {
        let aabb = unit_box();
        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(aabb.intersects_ray(&ray).unwrap_or(-1.0), 4.0, epsilon = 1e-6);

        let miss = Ray::new(Vec3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(aabb.intersects_ray(&miss).is_none());

        let inside = Ray::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(aabb.intersects_ray(&inside), Some(0.0));
    }

    #[test]
    fn test_sphere_ray_hit_normal() {
        let sphere = BoundingSphere::new(Vec3::zeros(), 2.0);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let (t, point, normal) = sphere.intersect_ray(&ray).expect("ray aims at sphere");
        assert_relative_eq!(t, 8.0, epsilon = 1e-5);
        assert_relative_eq!(point, Vec3::new(0.0, 0.0, 2.0), epsilon = 1e-5);
        assert_relative_eq!(normal, Vec3::z(), epsilon = 1e-5);
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = Plane::from_point_normal(Vec3::new(0.0, 2.0, 0.0), Vec3::y());
        assert_relative_eq!(plane.distance_to_point(Vec3::new(3.0, 5.0, 1.0)), 3.0);
        assert_eq!(plane.classify_point(Vec3::zeros()), PlaneIntersectionType::Back);
        assert_eq!(plane.classify_point(Vec3::new(0.0, 2.0, 9.0)), PlaneIntersectionType::Intersecting);
    }

    #[test]
    fn test_frustum_from_identity_is_clip_volume() {
        let frustum = Frustum::from_matrix(&Mat4::identity());

        assert!(frustum.contains_point(Vec3::new(0.0, 0.0, 0.5)));
        assert!(frustum.contains_point(Vec3::new(0.99, -0.99, 0.01)));
        assert!(!frustum.contains_point(Vec3::new(0.0, 0.0, -0.5)));
        assert!(!frustum.contains_point(Vec3::new(1.5, 0.0, 0.5)));

        let outside = AABB::new(Vec3::new(2.0, 2.0, 2.0), Vec3::new(3.0, 3.0, 3.0));
        assert!(!frustum.intersects_aabb(&outside));
        let straddling = AABB::new(Vec3::new(0.5, 0.5, 0.5), Vec3::new(3.0, 3.0, 3.0));
        assert!(frustum.intersects_aabb(&straddling));

        assert!(frustum.intersects_sphere(&BoundingSphere::new(Vec3::new(1.5, 0.0, 0.5), 0.6)));
        assert!(!frustum.intersects_sphere(&BoundingSphere::new(Vec3::new(1.5, 0.0, 0.5), 0.4)));
    }
}
