//! Boolean GJK intersection over support maps
//!
//! Any convex shape that can report its furthest point along a direction
//! can be tested against any other. Used for the oriented cylinder-vs-box
//! case and as an independent reference for the closed-form tests.

use crate::foundation::math::Vec3;
use super::primitives::{BoundingSphere, AABB};

const DEFAULT_MAX_ITERATIONS: usize = 64;

/// Squared search-direction length at which the origin counts as touched
const EPSILON: f32 = 1e-6;

/// Convex shape described by its support function
pub trait SupportMap {
    /// Furthest point of the shape along `direction` (need not be normalized)
    fn support(&self, direction: &Vec3) -> Vec3;

    /// Any interior point, used to seed the search direction
    fn interior_point(&self) -> Vec3;
}

impl SupportMap for AABB {
    fn support(&self, direction: &Vec3) -> Vec3 {
        Vec3::new(
            if direction.x >= 0.0 { self.max.x } else { self.min.x },
            if direction.y >= 0.0 { self.max.y } else { self.min.y },
            if direction.z >= 0.0 { self.max.z } else { self.min.z },
        )
    }

    fn interior_point(&self) -> Vec3 {
        self.center()
    }
}

impl SupportMap for BoundingSphere {
    fn support(&self, direction: &Vec3) -> Vec3 {
        let length = direction.magnitude();
        if length <= f32::EPSILON {
            self.center
        } else {
            self.center + direction * (self.radius / length)
        }
    }

    fn interior_point(&self) -> Vec3 {
        self.center
    }
}

/// Returns true when the two convex shapes overlap or touch
pub fn gjk_intersects<A, B>(a: &A, b: &B) -> bool
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    gjk_intersects_with_params(a, b, DEFAULT_MAX_ITERATIONS)
}

/// [`gjk_intersects`] with an explicit iteration budget
pub fn gjk_intersects_with_params<A, B>(a: &A, b: &B, max_iterations: usize) -> bool
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut dir = initial_direction(a, b);
    let mut simplex: Vec<Vec3> = Vec::with_capacity(4);

    let support = support_minkowski(a, b, &dir);
    simplex.push(support);
    dir = -support;

    for _ in 0..max_iterations {
        if dir.magnitude_squared() <= EPSILON {
            return true;
        }

        let support = support_minkowski(a, b, &dir);
        if support.dot(&dir) < 0.0 {
            return false;
        }

        simplex.push(support);
        if handle_simplex(&mut simplex, &mut dir) {
            return true;
        }
    }

    log::trace!("GJK did not converge in {} iterations; reporting no intersection", max_iterations);
    false
}

fn initial_direction<A, B>(a: &A, b: &B) -> Vec3
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let dir = b.interior_point() - a.interior_point();
    if dir.magnitude_squared() <= EPSILON {
        -Vec3::z()
    } else {
        dir
    }
}

fn support_minkowski<A, B>(a: &A, b: &B, dir: &Vec3) -> Vec3
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    a.support(dir) - b.support(&-dir)
}

fn handle_simplex(simplex: &mut Vec<Vec3>, dir: &mut Vec3) -> bool {
    match simplex.len() {
        2 => handle_line(simplex, dir),
        3 => handle_triangle(simplex, dir),
        4 => handle_tetrahedron(simplex, dir),
        _ => false,
    }
}

fn handle_line(simplex: &mut Vec<Vec3>, dir: &mut Vec3) -> bool {
    let a = simplex[1];
    let b = simplex[0];
    let ab = b - a;
    let ab_len_sq = ab.magnitude_squared();
    if ab_len_sq <= EPSILON {
        // Both points coincide
        simplex.truncate(1);
        simplex[0] = a;
        *dir = -a;
        return false;
    }

    let t = (-a).dot(&ab) / ab_len_sq;
    if t <= 0.0 {
        simplex.clear();
        simplex.push(a);
        *dir = -a;
        return false;
    }
    if t >= 1.0 {
        simplex.clear();
        simplex.push(b);
        *dir = -b;
        return false;
    }

    // Origin projects onto the interior of the segment
    let closest = a + ab * t;
    *dir = -closest;
    false
}

fn handle_triangle(simplex: &mut Vec<Vec3>, dir: &mut Vec3) -> bool {
    let a = simplex[2];
    let b = simplex[1];
    let c = simplex[0];

    let ab = b - a;
    let ac = c - a;
    let ao = -a;

    let d1 = ab.dot(&ao);
    let d2 = ac.dot(&ao);
    if d1 <= 0.0 && d2 <= 0.0 {
        *simplex = vec![a];
        *dir = -a;
        return false;
    }

    let bo = -b;
    let d3 = ab.dot(&bo);
    let d4 = ac.dot(&bo);
    if d3 >= 0.0 && d4 <= d3 {
        *simplex = vec![b];
        *dir = -b;
        return false;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        let closest = a + ab * v;
        *simplex = vec![b, a];
        *dir = -closest;
        return false;
    }

    let co = -c;
    let d5 = ab.dot(&co);
    let d6 = ac.dot(&co);
    if d6 >= 0.0 && d5 <= d6 {
        *simplex = vec![c];
        *dir = -c;
        return false;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        let closest = a + ac * w;
        *simplex = vec![c, a];
        *dir = -closest;
        return false;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        let closest = b + (c - b) * w;
        *simplex = vec![c, b];
        *dir = -closest;
        return false;
    }

    // Origin projects inside the triangle
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    let closest = a + ab * v + ac * w;
    *dir = -closest;
    false
}

fn handle_tetrahedron(simplex: &mut Vec<Vec3>, dir: &mut Vec3) -> bool {
    let a = simplex[3];
    let b = simplex[2];
    let c = simplex[1];
    let d = simplex[0];
    let ao = -a;

    for (p, q, opposite) in [(b, c, d), (c, d, b), (d, b, c)] {
        if let Some((face, normal)) = face_outside(a, p, q, opposite, &ao) {
            *simplex = face;
            *dir = normal;
            return false;
        }
    }

    true
}

fn face_outside(a: Vec3, b: Vec3, c: Vec3, opposite: Vec3, ao: &Vec3) -> Option<(Vec<Vec3>, Vec3)> {
    let mut normal = (b - a).cross(&(c - a));
    if normal.dot(&(opposite - a)) > 0.0 {
        normal = -normal;
    }

    if normal.dot(ao) > 0.0 {
        return Some((vec![c, b, a], normal));
    }

    None
}
