//! Best-fit oriented boxes for point clouds

use crate::core::config::{ObbFitConfig, ObbFitMode};
use crate::foundation::math::{utils, Mat3, Vec3};
use crate::physics::error::CollisionError;
use super::oriented_box::OrientedBoundingBox;
use super::primitives::AABB;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    angles: Vec3,
    volume: f32,
    obb: OrientedBoundingBox,
}

impl OrientedBoundingBox {
    /// Fit a box that encloses every point in `points`
    ///
    /// `Exhaustive` samples roll, pitch and yaw on a grid, keeps the
    /// orientation whose local AABB has the smallest volume, then narrows
    /// the window around it. The cost is `points * (range / step)^3` per
    /// level, so keep point clouds small. `Principal` uses the covariance
    /// eigenvectors and is not volume-minimal.
    pub fn compute_from_points(points: &[Vec3], config: &ObbFitConfig) -> Result<Self, CollisionError> {
        if points.is_empty() {
            return Err(CollisionError::EmptyPointCloud);
        }
        config
            .validate()
            .map_err(|e| CollisionError::InvalidParameter(e.to_string()))?;

        let obb = match config.mode {
            ObbFitMode::Exhaustive => exhaustive_fit(points, config),
            ObbFitMode::Principal => principal_fit(points),
        };
        log::trace!(
            "Fitted {:?} OBB to {} points: extents {:?}",
            config.mode,
            points.len(),
            obb.extents
        );
        Ok(obb)
    }
}

fn exhaustive_fit(points: &[Vec3], config: &ObbFitConfig) -> OrientedBoundingBox {
    let mut step = config.initial_step_degrees;
    let mut lo = Vec3::zeros();
    let mut hi = Vec3::repeat(360.0);
    let mut best = evaluate(points, Vec3::zeros());

    loop {
        best = search_level(points, lo, hi, step, best);
        if step <= config.min_step_degrees {
            break;
        }
        lo = best.angles.add_scalar(-step);
        hi = best.angles.add_scalar(step);
        step /= config.refine_factor;
    }

    log::trace!("Exhaustive OBB search settled at {:?} degrees, volume {}", best.angles, best.volume);
    best.obb
}

fn search_level(points: &[Vec3], lo: Vec3, hi: Vec3, step: f32, mut best: Candidate) -> Candidate {
    // Step counts are computed up front so the grid does not drift with float accumulation
    let count = |axis: usize| ((hi[axis] - lo[axis]) / step).round() as usize;
    let angle = |axis: usize, index: usize| lo[axis] + index as f32 * step;

    for i in 0..=count(0) {
        for j in 0..=count(1) {
            for k in 0..=count(2) {
                let angles = Vec3::new(angle(0, i), angle(1, j), angle(2, k));
                let candidate = evaluate(points, angles);
                if candidate.volume < best.volume {
                    best = candidate;
                }
            }
        }
    }
    best
}

fn evaluate(points: &[Vec3], angles: Vec3) -> Candidate {
    let rotation = utils::rotation_from_euler_degrees(angles.x, angles.y, angles.z);
    let obb = fit_with_orientation(points, rotation);
    Candidate { angles, volume: obb.volume(), obb }
}

fn principal_fit(points: &[Vec3]) -> OrientedBoundingBox {
    let count = points.len() as f32;
    let mean = points.iter().fold(Vec3::zeros(), |acc, p| acc + p) / count;
    let covariance = points.iter().fold(Mat3::zeros(), |acc, p| {
        let d = p - mean;
        acc + d * d.transpose()
    }) / count;

    let mut axes = nalgebra::SymmetricEigen::new(covariance).eigenvectors;
    if axes.determinant() < 0.0 {
        let flipped = -axes.column(2).into_owned();
        axes.set_column(2, &flipped);
    }
    fit_with_orientation(points, axes)
}

/// Tightest box with the given orientation
fn fit_with_orientation(points: &[Vec3], rotation: Mat3) -> OrientedBoundingBox {
    let inverse = rotation.transpose();
    let first = inverse * points[0];
    let local = points.iter().skip(1).fold(AABB::new(first, first), |bounds, p| {
        let q = inverse * p;
        AABB::new(bounds.min.inf(&q), bounds.max.sup(&q))
    });
    OrientedBoundingBox::with_orientation(rotation * local.center(), local.extents(), rotation)
}
