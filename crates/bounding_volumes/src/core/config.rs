//! # Collision Configuration
//!
//! Tuning parameters for the collision subsystems, grouped so they can be
//! loaded from a single TOML or RON file.
//!
//! ## Configuration Categories
//!
//! - **Resolver Config**: gravity, step-climb heuristics, iteration caps
//! - **OBB Fit Config**: search mode and angular resolution of best-fit boxes
//! - **Collision Config**: top-level bundle plus the log filter

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Character Resolver Configuration
///
/// Parameters of the two-phase vertical/horizontal resolution loop. The
/// defaults match a world measured in the same units as a character
/// cylinder of radius 5 and half height 10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Downward acceleration applied every step
    pub gravity: f32,
    /// Colliders with a half height below this count as climbable steps
    pub step_height_threshold: f32,
    /// Maximum rise from the cylinder base to a step top that can be climbed
    pub climb_distance_threshold: f32,
    /// Extra distance added to every horizontal push-out
    pub separation_epsilon: f32,
    /// Vertical corrections allowed per step before giving up
    pub max_vertical_iterations: usize,
    /// Penetration treated as touching when classifying contacts
    pub contact_tolerance: f32,
}

impl ResolverConfig {
    /// Create a resolver configuration with default tuning
    pub fn new() -> Self {
        Self {
            gravity: 9.81,
            step_height_threshold: 6.0,
            climb_distance_threshold: 12.0,
            separation_epsilon: 1e-5,
            max_vertical_iterations: 32,
            contact_tolerance: 0.0,
        }
    }

    /// Set gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the step heuristics
    pub fn with_step_limits(mut self, step_height: f32, climb_distance: f32) -> Self {
        self.step_height_threshold = step_height;
        self.climb_distance_threshold = climb_distance;
        self
    }

    /// Set the push-out margin
    pub fn with_separation_epsilon(mut self, epsilon: f32) -> Self {
        self.separation_epsilon = epsilon;
        self
    }

    /// Set the vertical iteration cap
    pub fn with_max_vertical_iterations(mut self, iterations: usize) -> Self {
        self.max_vertical_iterations = iterations;
        self
    }

    /// Set the contact tolerance band
    pub fn with_contact_tolerance(mut self, tolerance: f32) -> Self {
        self.contact_tolerance = tolerance;
        self
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("step_height_threshold", self.step_height_threshold),
            ("climb_distance_threshold", self.climb_distance_threshold),
            ("separation_epsilon", self.separation_epsilon),
            ("contact_tolerance", self.contact_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation(format!("{} must be finite and >= 0, got {}", name, value)));
            }
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::Validation(format!("gravity must be finite, got {}", self.gravity)));
        }
        if self.max_vertical_iterations == 0 {
            return Err(ConfigError::Validation("max_vertical_iterations must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy used to fit an oriented box to a point cloud
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObbFitMode {
    /// Recursive Euler-angle grid search minimizing box volume (slow, tight)
    Exhaustive,
    /// Covariance eigenvectors as box axes (fast, approximate)
    Principal,
}

/// # OBB Fit Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObbFitConfig {
    /// Fitting strategy
    pub mode: ObbFitMode,
    /// Angular step of the first search level, in degrees
    pub initial_step_degrees: f32,
    /// The search stops after the level using a step at or below this
    pub min_step_degrees: f32,
    /// Divisor applied to the step at every refinement level
    pub refine_factor: f32,
}

impl ObbFitConfig {
    /// Create an exhaustive-search configuration
    pub fn new() -> Self {
        Self {
            mode: ObbFitMode::Exhaustive,
            initial_step_degrees: 10.0,
            min_step_degrees: 0.01,
            refine_factor: 10.0,
        }
    }

    /// Set the fitting strategy
    pub fn with_mode(mut self, mode: ObbFitMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the angular resolution of the search
    pub fn with_steps(mut self, initial_degrees: f32, min_degrees: f32) -> Self {
        self.initial_step_degrees = initial_degrees;
        self.min_step_degrees = min_degrees;
        self
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_step_degrees > 0.0 && self.initial_step_degrees <= 360.0) {
            return Err(ConfigError::Validation(format!(
                "initial_step_degrees must be in (0, 360], got {}",
                self.initial_step_degrees
            )));
        }
        if !(self.min_step_degrees > 0.0) {
            return Err(ConfigError::Validation(format!(
                "min_step_degrees must be > 0, got {}",
                self.min_step_degrees
            )));
        }
        if !(self.refine_factor > 1.0) || !self.refine_factor.is_finite() {
            return Err(ConfigError::Validation(format!(
                "refine_factor must be finite and > 1, got {}",
                self.refine_factor
            )));
        }
        Ok(())
    }
}

impl Default for ObbFitConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Complete Collision Configuration
///
/// Top-level configuration applications load from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// `env_logger` filter used by [`crate::foundation::logging::init_with_level`]
    pub log_level: String,
    /// Character resolver tuning
    pub resolver: ResolverConfig,
    /// Best-fit OBB tuning
    pub obb_fit: ObbFitConfig,
}

impl CollisionConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            resolver: ResolverConfig::default(),
            obb_fit: ObbFitConfig::default(),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set resolver tuning
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set OBB fit tuning
    pub fn with_obb_fit(mut self, obb_fit: ObbFitConfig) -> Self {
        self.obb_fit = obb_fit;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.resolver.validate()?;
        self.obb_fit.validate()?;
        Ok(())
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for CollisionConfig {}
