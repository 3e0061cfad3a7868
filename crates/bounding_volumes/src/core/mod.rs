//! # Core Module
//!
//! Shared configuration types for the collision subsystems.

pub mod config;

pub use config::{
    CollisionConfig,
    ObbFitConfig,
    ObbFitMode,
    ResolverConfig,
    Config,
    ConfigError,
};
