/*
 * Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the flock simulation. The core
 * (geometry, spatial_grid, creature, simulation, config, error) has no
 * dependency on the window; the remaining modules make up the nannou viewer.
 */

// Re-export key components for easier access
pub use config::FlockConfig;
pub use creature::{Creature, Kinematics};
pub use error::{ConfigError, FlockError};
pub use geometry::Position;
pub use simulation::{Simulation, TickStats};
pub use spatial_grid::SpatialGrid;
pub use app::Model;

// Define modules
pub mod geometry;
pub mod spatial_grid;
pub mod creature;
pub mod simulation;
pub mod config;
pub mod error;
pub mod debug;
pub mod viewport;
pub mod app;
pub mod ui;
pub mod renderer;
pub mod input;
