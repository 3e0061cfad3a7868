//! Scene description loaded by the demo

use bounding_volumes::config::Config;
use bounding_volumes::core::CollisionConfig;
use bounding_volumes::foundation::math::Vec3;
use bounding_volumes::physics::{BoundingCylinder, CharacterBody, CollisionError, AABB};
use serde::{Deserialize, Serialize};

/// Initial state of the simulated character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSpec {
    pub position: Vec3,
    pub radius: f32,
    pub half_height: f32,
    pub velocity: Vec3,
}

impl CharacterSpec {
    pub fn spawn(&self) -> Result<CharacterBody, CollisionError> {
        let cylinder = BoundingCylinder::try_new(self.position, self.radius, self.half_height)?;
        Ok(CharacterBody::new(cylinder).with_velocity(self.velocity))
    }
}

impl Default for CharacterSpec {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 14.0, 0.0),
            radius: 5.0,
            half_height: 10.0,
            velocity: Vec3::new(15.0, 0.0, 1.0),
        }
    }
}

/// Everything the demo needs to run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoScene {
    pub ticks: usize,
    pub dt: f32,
    pub fit_point_count: usize,
    pub seed: u64,
    pub collision: CollisionConfig,
    pub character: CharacterSpec,
    pub colliders: Vec<AABB>,
}

impl Default for DemoScene {
    fn default() -> Self {
        Self {
            ticks: 90,
            dt: 1.0 / 30.0,
            fit_point_count: 24,
            seed: 7,
            collision: CollisionConfig::default(),
            character: CharacterSpec::default(),
            colliders: vec![
                AABB::new(Vec3::new(-100.0, -10.0, -100.0), Vec3::new(100.0, 0.0, 100.0)),
                AABB::new(Vec3::new(12.0, 0.0, -30.0), Vec3::new(40.0, 5.0, 30.0)),
                AABB::new(Vec3::new(40.0, 0.0, -30.0), Vec3::new(50.0, 40.0, 30.0)),
            ],
        }
    }
}

impl Config for DemoScene {}
