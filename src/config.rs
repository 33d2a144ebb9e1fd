/*
 * Configuration Module
 *
 * This module defines the FlockConfig struct that holds every tunable of the
 * flocking simulation. The defaults reproduce the classic tuning (2000
 * creatures, 25 pixel sight, 25 pixel grid cells). The struct can be loaded
 * from JSON, is validated before a simulation is built from it, and tracks
 * UI edits so the front-end knows when the simulation has to be rebuilt.
 */

use std::ops::RangeInclusive;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{self, ConfigError, FlockError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockConfig {
    pub population_size: usize,
    /// Fixed delay between ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Creature size in pixels; also sets the collision and repulsion distance.
    pub radius: f64,
    /// How far a creature can perceive others, the pointer and the edges.
    pub sight_radius: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Largest speed change allowed in one tick.
    pub speed_varying_rate: f64,
    /// Largest heading change (radians) allowed in one tick.
    pub rotation_rate: f64,
    /// Distance a creature is pushed per tick when overlapping something.
    pub repulsion_rate: f64,
    /// Fraction of the full circle covered by the forward field of view.
    pub view_proportion: f64,
    /// Side length of the acceleration grid cells, in pixels.
    pub side_length: f64,
    /// Draw the first creature's sight circle, scanned cells and neighbors.
    pub visual_debugging: bool,
    /// Plan creatures on the rayon pool instead of sequentially.
    pub enable_parallel: bool,
    pub pause_simulation: bool,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            population_size: 2000,
            tick_interval_ms: 10,
            radius: 5.0,
            sight_radius: 25.0,
            min_speed: 1.0,
            max_speed: 8.0,
            speed_varying_rate: 0.1,
            rotation_rate: 0.16,
            repulsion_rate: 1.0,
            view_proportion: 0.66,
            side_length: 25.0,
            visual_debugging: false,
            enable_parallel: true,
            pause_simulation: false,
        }
    }
}

impl FlockConfig {
    /// Parse a config from JSON; missing fields fall back to the defaults.
    pub fn from_json_str(json: &str) -> error::Result<Self> {
        let config: FlockConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> error::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| FlockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Reject settings that would give degenerate geometry or motion.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("radius", self.radius)?;
        positive("sight_radius", self.sight_radius)?;
        positive("side_length", self.side_length)?;
        non_negative("min_speed", self.min_speed)?;
        non_negative("max_speed", self.max_speed)?;
        non_negative("speed_varying_rate", self.speed_varying_rate)?;
        non_negative("rotation_rate", self.rotation_rate)?;
        non_negative("repulsion_rate", self.repulsion_rate)?;

        if self.min_speed > self.max_speed {
            return Err(ConfigError::SpeedRange {
                min: self.min_speed,
                max: self.max_speed,
            });
        }
        if !(self.view_proportion > 0.0 && self.view_proportion <= 1.0) {
            return Err(ConfigError::ViewProportion(self.view_proportion));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Distance below which two bodies repel and visible creatures are avoided.
    #[inline]
    pub fn collision_distance(&self) -> f64 {
        self.radius * 2.0
    }

    // Get parameter ranges for UI sliders
    pub fn population_range() -> RangeInclusive<usize> {
        0..=20000
    }

    pub fn tick_interval_range() -> RangeInclusive<u64> {
        1..=100
    }

    pub fn radius_range() -> RangeInclusive<f64> {
        1.0..=20.0
    }

    pub fn sight_radius_range() -> RangeInclusive<f64> {
        5.0..=100.0
    }

    pub fn speed_range() -> RangeInclusive<f64> {
        0.0..=20.0
    }

    pub fn rate_range() -> RangeInclusive<f64> {
        0.0..=1.0
    }

    pub fn repulsion_range() -> RangeInclusive<f64> {
        0.0..=5.0
    }

    pub fn view_proportion_range() -> RangeInclusive<f64> {
        0.05..=1.0
    }

    pub fn side_length_range() -> RangeInclusive<f64> {
        5.0..=100.0
    }
}

/// Remembers the settings as they were before a round of UI edits, so the
/// front-end can tell what changed.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    previous_values: Option<FlockConfig>,
}

impl ChangeTracker {
    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&mut self, config: &FlockConfig) {
        self.previous_values = Some(config.clone());
    }

    // Returns (rebuild_needed, any_changed) relative to the last snapshot.
    // Population size, sight radius and cell side all shape the grid, so
    // changing any of them means the grid has to be rebuilt.
    pub fn detect_changes(&self, config: &FlockConfig) -> (bool, bool) {
        let Some(prev) = &self.previous_values else {
            return (false, false);
        };
        let rebuild_needed = config.population_size != prev.population_size
            || config.sight_radius != prev.sight_radius
            || config.side_length != prev.side_length;
        (rebuild_needed, config != prev)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
