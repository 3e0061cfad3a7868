//! Headless character collision demo
//!
//! Walks a cylinder character through a scene of static boxes, logging
//! every climb, slide and landing, then fits an oriented box to a random
//! point cloud.
//!
//! Usage: `character_demo [scene.toml|scene.ron]`

#![allow(missing_docs)]

mod scene;

use bounding_volumes::config::{Config, ConfigError};
use bounding_volumes::foundation::logging;
use bounding_volumes::foundation::math::Vec3;
use bounding_volumes::physics::{CollisionError, CollisionResolver, OrientedBoundingBox};
use rand::prelude::*;
use scene::DemoScene;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("scene configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("collision: {0}")]
    Collision(#[from] CollisionError),
}

fn load_scene() -> Result<DemoScene, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(DemoScene::load_from_file(&path)?),
        None => Ok(DemoScene::default()),
    }
}

fn run_character(scene: &DemoScene) -> Result<(), DemoError> {
    let resolver = CollisionResolver::new(scene.collision.resolver.clone())?;
    let mut body = scene.character.spawn()?;

    let mut climbed = 0;
    let mut slid = 0;
    for tick in 0..scene.ticks {
        let outcome = resolver.step(&mut body, &scene.colliders, scene.dt)?;
        if outcome.climbed > 0 {
            log::info!("tick {}: climbed onto y = {:.2}", tick, body.position().y);
        }
        if outcome.slid > 0 {
            log::info!("tick {}: slid to x = {:.4}", tick, body.position().x);
        }
        log::debug!("tick {}: {:?} at {:?}", tick, outcome, body.position());
        climbed += outcome.climbed;
        slid += outcome.slid;
    }

    println!(
        "Character finished at ({:.3}, {:.3}, {:.3}) after {} ticks: {} climbs, {} slides, grounded = {}",
        body.position().x,
        body.position().y,
        body.position().z,
        scene.ticks,
        climbed,
        slid,
        body.on_ground
    );
    Ok(())
}

fn run_obb_fit(scene: &DemoScene) -> Result<(), DemoError> {
    let mut rng = StdRng::seed_from_u64(scene.seed);
    let points: Vec<Vec3> = (0..scene.fit_point_count)
        .map(|_| Vec3::new(rng.gen_range(-8.0..8.0), rng.gen_range(-2.0..2.0), rng.gen_range(-1.0..1.0)))
        .collect();

    let obb = OrientedBoundingBox::compute_from_points(&points, &scene.collision.obb_fit)?;
    println!(
        "{:?} fit of {} points: center {:?}, extents {:?}, volume {:.3}",
        scene.collision.obb_fit.mode,
        points.len(),
        obb.center,
        obb.extents,
        obb.volume()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let scene = load_scene()?;
    logging::init_with_level(&scene.collision.log_level);
    scene.collision.validate()?;

    log::info!("Loaded scene with {} colliders", scene.colliders.len());
    run_character(&scene)?;
    run_obb_fit(&scene)?;
    Ok(())
}
