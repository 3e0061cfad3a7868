//! Character collision resolution
//!
//! Moves an upright cylinder through a set of static colliders once per
//! simulation tick. The tick runs in two phases:
//!
//! 1. **Vertical**: apply gravity, move along Y, then snap the cylinder
//!    onto (or under) whichever collider it penetrates until none does.
//! 2. **Horizontal**: move in XZ, then for every penetrated collider try
//!    to climb it as a step, otherwise slide out of it along the XZ plane.
//!
//! A base or top that sits on a collider face to within rounding counts as
//! a settled vertical contact. Neither phase acts on it again.
//!
//! The resolver is written against [`StaticCollider`], so any shape that
//! can report its extents, closest point and a cylinder classification can
//! take part.

use crate::core::config::{ConfigError, ResolverConfig};
use crate::foundation::math::{utils, Vec3};
use crate::physics::collision::{BoundingCylinder, BoxCylinderIntersection, AABB};
use crate::physics::error::CollisionError;

/// Static obstacle the character collides with
pub trait StaticCollider {
    /// Center in world space
    fn center(&self) -> Vec3;

    /// Half size along each world axis
    fn extents(&self) -> Vec3;

    /// Highest world Y
    fn top(&self) -> f32 {
        self.center().y + self.extents().y
    }

    /// Lowest world Y
    fn bottom(&self) -> f32 {
        self.center().y - self.extents().y
    }

    /// Closest point of the collider to `point`
    fn closest_point(&self, point: &Vec3) -> Vec3;

    /// Tri-state contact test against the character cylinder
    fn classify(&self, cylinder: &BoundingCylinder, tolerance: f32) -> BoxCylinderIntersection;
}

impl StaticCollider for AABB {
    fn center(&self) -> Vec3 {
        AABB::center(self)
    }

    fn extents(&self) -> Vec3 {
        AABB::extents(self)
    }

    fn top(&self) -> f32 {
        self.max.y
    }

    fn bottom(&self) -> f32 {
        self.min.y
    }

    fn closest_point(&self, point: &Vec3) -> Vec3 {
        AABB::closest_point(self, point)
    }

    fn classify(&self, cylinder: &BoundingCylinder, tolerance: f32) -> BoxCylinderIntersection {
        cylinder.intersects_aabb_with_tolerance(self, tolerance)
    }
}

/// Mutable state of a character driven by the resolver
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterBody {
    /// Collision volume; its center is the character position
    pub cylinder: BoundingCylinder,
    /// Velocity in world units per second
    pub velocity: Vec3,
    /// Set when the last vertical phase ended standing on a collider
    pub on_ground: bool,
}

impl CharacterBody {
    /// Body at rest
    pub fn new(cylinder: BoundingCylinder) -> Self {
        Self { cylinder, velocity: Vec3::zeros(), on_ground: false }
    }

    /// Builder-style velocity
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Current position
    pub fn position(&self) -> Vec3 {
        self.cylinder.center()
    }
}

/// What happened during one [`CollisionResolver::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Standing on a collider at the end of the step
    pub on_ground: bool,
    /// Vertical snaps applied
    pub vertical_corrections: usize,
    /// Steps climbed during the horizontal phase
    pub climbed: usize,
    /// Horizontal push-outs applied
    pub slid: usize,
}

/// Two-phase character-vs-world resolver
#[derive(Debug, Clone, Default)]
pub struct CollisionResolver {
    config: ResolverConfig,
}

impl CollisionResolver {
    /// Create a resolver, rejecting out-of-range tuning
    pub fn new(config: ResolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active tuning
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Advance `body` by `dt` seconds against `colliders`
    ///
    /// Colliders are scanned in slice order and the first penetrated one
    /// is resolved first, so ordering matters when colliders overlap.
    pub fn step<C: StaticCollider>(
        &self,
        body: &mut CharacterBody,
        colliders: &[C],
        dt: f32,
    ) -> Result<StepOutcome, CollisionError> {
        let mut outcome = StepOutcome::default();

        body.velocity.y -= self.config.gravity * dt;

        self.resolve_vertical(body, colliders, dt, &mut outcome)?;
        self.resolve_horizontal(body, colliders, dt, &mut outcome);

        outcome.on_ground = body.on_ground;
        log::trace!("Character step finished at {:?}: {:?}", body.position(), outcome);
        Ok(outcome)
    }

    fn is_penetrating<C: StaticCollider>(&self, collider: &C, cylinder: &BoundingCylinder) -> bool {
        collider.classify(cylinder, self.config.contact_tolerance) == BoxCylinderIntersection::Intersecting
    }

    /// Slack for comparing the cylinder's base or top against a collider face at height `y`
    fn face_slack(&self, y: f32) -> f32 {
        self.config.separation_epsilon.max(y.abs() * 4.0 * f32::EPSILON)
    }

    fn rests_on<C: StaticCollider>(&self, collider: &C, cylinder: &BoundingCylinder) -> bool {
        cylinder.bottom() >= collider.top() - self.face_slack(collider.top())
    }

    fn rests_under<C: StaticCollider>(&self, collider: &C, cylinder: &BoundingCylinder) -> bool {
        cylinder.top() <= collider.bottom() + self.face_slack(collider.bottom())
    }

    /// Penetration that a vertical snap has already settled, up to rounding
    fn is_vertical_contact<C: StaticCollider>(&self, collider: &C, cylinder: &BoundingCylinder) -> bool {
        self.rests_on(collider, cylinder) || self.rests_under(collider, cylinder)
    }

    fn first_unsettled<'a, C: StaticCollider>(&self, colliders: &'a [C], cylinder: &BoundingCylinder) -> Option<&'a C> {
        colliders
            .iter()
            .find(|collider| self.is_penetrating(*collider, cylinder) && !self.is_vertical_contact(*collider, cylinder))
    }

    fn resolve_vertical<C: StaticCollider>(
        &self,
        body: &mut CharacterBody,
        colliders: &[C],
        dt: f32,
        outcome: &mut StepOutcome,
    ) -> Result<(), CollisionError> {
        body.on_ground = false;
        body.cylinder.translate(Vec3::new(0.0, body.velocity.y * dt, 0.0));

        while let Some(collider) = self.first_unsettled(colliders, &body.cylinder) {
            if outcome.vertical_corrections >= self.config.max_vertical_iterations {
                log::warn!(
                    "Vertical resolution gave up after {} corrections at {:?}",
                    outcome.vertical_corrections,
                    body.position()
                );
                return Err(CollisionError::UnresolvedPenetration { iterations: outcome.vertical_corrections });
            }
            outcome.vertical_corrections += 1;
            body.velocity.y = 0.0;

            let center = body.cylinder.center();
            let half_height = body.cylinder.half_height();
            let target_y = if center.y >= collider.center().y {
                body.on_ground = true;
                collider.top() + half_height
            } else {
                body.on_ground = false;
                collider.bottom() - half_height
            };

            log::debug!("Vertical correction {:.4} -> {:.4}", center.y, target_y);
            body.cylinder.set_center(Vec3::new(center.x, target_y, center.z));
        }

        // A base left a rounding error inside the support still stands on it
        if !body.on_ground {
            body.on_ground = colliders
                .iter()
                .any(|collider| self.is_penetrating(collider, &body.cylinder) && self.rests_on(collider, &body.cylinder));
        }
        Ok(())
    }

    fn resolve_horizontal<C: StaticCollider>(
        &self,
        body: &mut CharacterBody,
        colliders: &[C],
        dt: f32,
        outcome: &mut StepOutcome,
    ) {
        let delta = Vec3::new(body.velocity.x * dt, 0.0, body.velocity.z * dt);
        body.cylinder.translate(delta);

        for (index, collider) in colliders.iter().enumerate() {
            if !self.is_penetrating(collider, &body.cylinder) || self.is_vertical_contact(collider, &body.cylinder) {
                continue;
            }

            if self.try_climb(body, colliders, index) {
                outcome.climbed += 1;
                continue;
            }

            self.slide(&mut body.cylinder, collider);
            outcome.slid += 1;
        }
    }

    fn try_climb<C: StaticCollider>(&self, body: &mut CharacterBody, colliders: &[C], index: usize) -> bool {
        let step = &colliders[index];
        if step.extents().y >= self.config.step_height_threshold {
            return false;
        }

        let rise = step.top() - body.cylinder.bottom();
        if !(0.0..=self.config.climb_distance_threshold).contains(&rise) {
            return false;
        }

        let previous = body.cylinder.center();
        body.cylinder.set_center(Vec3::new(previous.x, step.top() + body.cylinder.half_height(), previous.z));

        let blocked = colliders
            .iter()
            .enumerate()
            .any(|(other, collider)| {
                other != index
                    && self.is_penetrating(collider, &body.cylinder)
                    && !self.is_vertical_contact(collider, &body.cylinder)
            });
        if blocked {
            log::debug!("Step climb by {:.4} blocked, reverting", rise);
            body.cylinder.set_center(previous);
            return false;
        }

        log::debug!("Climbed step by {:.4}", rise);
        body.on_ground = true;
        true
    }

    fn slide<C: StaticCollider>(&self, cylinder: &mut BoundingCylinder, collider: &C) {
        let center = cylinder.center();
        let radius = cylinder.radius();
        let closest = collider.closest_point(&center);
        let offset = Vec3::new(center.x - closest.x, 0.0, center.z - closest.z);
        let distance = utils::horizontal_length_squared(&offset).sqrt();

        let push = if distance > f32::EPSILON {
            offset * ((radius - distance + self.config.separation_epsilon) / distance)
        } else {
            self.face_exit(center, radius, collider)
        };

        log::debug!("Sliding out of collider by {:?}", push);
        cylinder.translate(push);
    }

    /// Push that moves a cylinder whose center lies inside the collider's
    /// XZ footprint out through the nearest vertical face
    fn face_exit<C: StaticCollider>(&self, center: Vec3, radius: f32, collider: &C) -> Vec3 {
        let min = collider.center() - collider.extents();
        let max = collider.center() + collider.extents();
        let clearance = radius + self.config.separation_epsilon;

        let exits = [
            (center.x - min.x, Vec3::new(min.x - clearance - center.x, 0.0, 0.0)),
            (max.x - center.x, Vec3::new(max.x + clearance - center.x, 0.0, 0.0)),
            (center.z - min.z, Vec3::new(0.0, 0.0, min.z - clearance - center.z)),
            (max.z - center.z, Vec3::new(0.0, 0.0, max.z + clearance - center.z)),
        ];

        exits
            .iter()
            .fold(None, |best: Option<(f32, Vec3)>, &(depth, push)| match best {
                Some((best_depth, _)) if best_depth <= depth => best,
                _ => Some((depth, push)),
            })
            .map_or_else(Vec3::zeros, |(_, push)| push)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor() -> AABB {
        AABB::new(Vec3::new(-100.0, -10.0, -100.0), Vec3::new(100.0, 0.0, 100.0))
    }

    fn resolver(gravity: f32) -> CollisionResolver {
        CollisionResolver::new(ResolverConfig::new().with_gravity(gravity)).expect("valid config")
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(CollisionResolver::new(ResolverConfig::new().with_max_vertical_iterations(0)).is_err());
    }

    #[test]
    fn test_body_in_free_fall_accelerates() {
        let mut body = CharacterBody::new(BoundingCylinder::new(Vec3::new(0.0, 100.0, 0.0), 5.0, 10.0));
        let outcome = resolver(10.0).step(&mut body, &[floor()], 0.5).expect("no contact");

        assert!(!outcome.on_ground);
        assert_eq!(outcome.vertical_corrections, 0);
        assert_relative_eq!(body.velocity.y, -5.0);
        assert_relative_eq!(body.position().y, 97.5);
    }

    #[test]
    fn test_jump_into_ceiling_snaps_below() {
        let ceiling = AABB::new(Vec3::new(-50.0, 30.0, -50.0), Vec3::new(50.0, 40.0, 50.0));
        let mut body = CharacterBody::new(BoundingCylinder::new(Vec3::new(0.0, 15.0, 0.0), 5.0, 10.0))
            .with_velocity(Vec3::new(0.0, 20.0, 0.0));

        let outcome = resolver(0.0).step(&mut body, &[ceiling], 0.5).expect("resolvable");
        assert_eq!(outcome.vertical_corrections, 1);
        assert!(!outcome.on_ground);
        assert_relative_eq!(body.position().y, 20.0);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_slide_out_of_wall_face() {
        let wall = AABB::new(Vec3::new(10.0, -50.0, -50.0), Vec3::new(20.0, 50.0, 50.0));
        let mut body = CharacterBody::new(BoundingCylinder::new(Vec3::new(3.0, 0.0, 0.0), 5.0, 10.0))
            .with_velocity(Vec3::new(4.0, 0.0, 0.0));

        let outcome = resolver(0.0).step(&mut body, &[wall], 1.0).expect("resolvable");
        assert_eq!(outcome.slid, 1);
        assert_eq!(outcome.climbed, 0);
        assert_relative_eq!(body.position().x, 5.0 - 1e-5, epsilon = 1e-5);
        assert_eq!(wall.classify(&body.cylinder, 0.0), BoxCylinderIntersection::None);
    }

    #[test]
    fn test_center_inside_footprint_exits_through_nearest_face() {
        let pillar = AABB::new(Vec3::new(-2.0, -50.0, -10.0), Vec3::new(2.0, 50.0, 10.0));
        let mut body = CharacterBody::new(BoundingCylinder::new(Vec3::new(10.0, 0.0, 3.0), 5.0, 10.0))
            .with_velocity(Vec3::new(-9.0, 0.0, 0.0));

        let outcome = resolver(0.0).step(&mut body, &[pillar], 1.0).expect("resolvable");
        assert_eq!(outcome.slid, 1);
        assert_relative_eq!(body.position().x, 7.0 + 1e-5, epsilon = 1e-5);
        assert_relative_eq!(body.position().z, 3.0);
    }

    #[test]
    fn test_standing_on_floors_with_inexact_tops_stays_put() {
        let resolver = CollisionResolver::default();
        for top in [0.143_f32, 0.1, 0.3, 1.7, 123.456] {
            for bottom in [top - 100.0, top - 0.143] {
                let floor = AABB::new(Vec3::new(-100.0, bottom, -100.0), Vec3::new(100.0, top, 100.0));
                let start = Vec3::new(0.0, top + 3.3, 0.0);
                let mut body = CharacterBody::new(BoundingCylinder::new(start, 0.5, 3.3));

                for _ in 0..120 {
                    let outcome = resolver.step(&mut body, &[floor], 1.0 / 60.0).expect("resting contact");
                    assert!(outcome.on_ground, "fell through floor at {}", top);
                    assert_eq!(outcome.climbed, 0, "climbed floor at {}", top);
                    assert_eq!(outcome.slid, 0, "slid off floor at {}", top);
                }
                assert_eq!(body.position().x, 0.0);
                assert_eq!(body.position().z, 0.0);
                assert_relative_eq!(body.position().y, start.y, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_downward_snap_clears_ground_flag() {
        // Lands on the ledge first, then the tall block beside it pushes the body under both
        let ledge = AABB::new(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.5, 10.0));
        let block = AABB::new(Vec3::new(0.5, -1.5, -10.0), Vec3::new(10.0, 100.0, 10.0));
        let mut body = CharacterBody::new(BoundingCylinder::new(Vec3::zeros(), 1.0, 2.0));

        let outcome = resolver(0.0).step(&mut body, &[ledge, block], 1.0).expect("resolvable");
        assert_eq!(outcome.vertical_corrections, 2);
        assert!(!outcome.on_ground);
        assert_relative_eq!(body.position().y, -3.5);
    }
}
