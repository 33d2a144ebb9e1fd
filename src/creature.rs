/*
 * Creature Module
 *
 * This module defines the Creature struct and its steering behavior. Each
 * tick a creature plans its next state from a frozen view of the world and
 * only later commits it, so no creature ever sees another one's half-made
 * decision. Planning layers several desires, in priority order:
 * 1. Keep away from the viewport edges
 * 2. Flee the pointer
 * 3. Get pushed out of anything it overlaps
 * 4. Turn away from creatures it is about to collide with
 * 5. Otherwise flock: head for, align with and match speed with visible creatures
 * 6. A little random wander
 * The summed heading and speed changes are clamped to the per-tick rates.
 */

use std::f64::consts::{PI, TAU};

use rand::Rng;

use crate::config::FlockConfig;
use crate::geometry::{wrap_angle, Position};
use crate::spatial_grid::Tracked;

/// Farthest a creature can ever notice another creature with its eyes,
/// regardless of how large the sight radius is configured.
pub const VISIBILITY_CUTOFF: f64 = 100.0;

/// Position, heading and speed of a creature; also the render snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Position,
    /// Facing angle in (−π, π].
    pub heading: f64,
    pub speed: f64,
}

impl Kinematics {
    pub fn new(x: f64, y: f64, heading: f64, speed: f64) -> Self {
        Self {
            position: Position::new(x, y),
            heading,
            speed,
        }
    }
}

// A committed state has nowhere else to go.
impl Tracked for Kinematics {
    fn position(&self) -> Position {
        self.position
    }
    fn planned_position(&self) -> Position {
        self.position
    }
}

/// Per-tick heading and speed accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    pub heading_change: f64,
    pub speed_change: f64,
}

/// Everything a creature perceives while planning.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// Committed states of the creatures within sight radius.
    pub neighbors: &'a [Kinematics],
    pub pointer: Position,
    pub width: f64,
    pub height: f64,
}

/// Which behaviors fired during one plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOutcome {
    pub clear_of_boundaries: bool,
    pub clear_of_pointer: bool,
    pub clear_of_creatures: bool,
    /// Number of visible creatures that contributed flocking steering.
    pub flocked_with: usize,
}

#[derive(Debug, Clone)]
pub struct Creature {
    current: Kinematics,
    planned: Kinematics,
    steering: Steering,
}

impl Creature {
    pub fn new(x: f64, y: f64, heading: f64, speed: f64) -> Self {
        let state = Kinematics::new(x, y, wrap_angle(heading), speed);
        Self {
            current: state,
            planned: state,
            steering: Steering::default(),
        }
    }

    /// A creature at rest somewhere inside the viewport, facing anywhere.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64) -> Self {
        let x = rng.gen::<f64>() * width.max(0.0);
        let y = rng.gen::<f64>() * height.max(0.0);
        let heading = rng.gen::<f64>() * TAU;
        Self::new(x, y, heading, 0.0)
    }

    #[inline]
    pub fn state(&self) -> Kinematics {
        self.current
    }

    /// The state computed by the last plan; equal to `state()` once committed.
    #[inline]
    pub fn planned(&self) -> Kinematics {
        self.planned
    }

    /// Clamped heading and speed change applied by the last plan.
    #[inline]
    pub fn steering(&self) -> Steering {
        self.steering
    }

    /// Compute the next state into the planned slot. The current state is
    /// left untouched until `commit`.
    pub fn plan<R: Rng + ?Sized>(
        &mut self,
        around: &Surroundings<'_>,
        config: &FlockConfig,
        rng: &mut R,
    ) -> PlanOutcome {
        self.planned = self.current;
        self.steering = Steering::default();

        let clear_of_boundaries = self.avoid_boundaries(around.width, around.height, config);
        let clear_of_pointer = self.avoid_pointer(around.pointer, config);

        self.repel_from(around.pointer, config);
        for other in around.neighbors {
            self.repel_from(other.position, config);
        }

        let mut outcome = PlanOutcome {
            clear_of_boundaries,
            clear_of_pointer,
            clear_of_creatures: true,
            flocked_with: 0,
        };

        if clear_of_boundaries && clear_of_pointer {
            let visible: Vec<&Kinematics> = around
                .neighbors
                .iter()
                .filter(|other| self.sees(other, config))
                .collect();

            for other in &visible {
                if !self.avoid_creature(other.position, config) {
                    outcome.clear_of_creatures = false;
                }
            }

            if outcome.clear_of_creatures {
                for other in &visible {
                    self.head_for(other.position, config);
                    self.align_with(other.heading, config);
                    self.match_speed(other.speed, config);
                    outcome.flocked_with += 1;
                }
            }
        }

        self.vary_speed(rng, config);
        self.vary_heading(rng, config);
        self.apply_steering(config);

        outcome
    }

    /// Adopt the planned state.
    #[inline]
    pub fn commit(&mut self) {
        self.current = self.planned;
    }

    /// Whether `other` is close enough and inside the forward field of view.
    pub fn sees(&self, other: &Kinematics, config: &FlockConfig) -> bool {
        let cutoff = VISIBILITY_CUTOFF.min(config.sight_radius);
        let origin = self.current.position;
        if origin.distance_squared(other.position) >= cutoff * cutoff {
            return false;
        }
        let relative = wrap_angle(origin.bearing_to(other.position) - self.current.heading);
        let half_view = PI * config.view_proportion;
        relative > -half_view && relative < half_view
    }

    // Steer toward the interior when within sight of an edge. Returns true
    // when no edge is in sight.
    fn avoid_boundaries(&mut self, width: f64, height: f64, config: &FlockConfig) -> bool {
        let Position { x, y } = self.current.position;
        let step = config.collision_distance();

        let target = if x < config.sight_radius {
            Position::new(x + step, y)
        } else if x > width - config.sight_radius {
            Position::new(x - step, y)
        } else if y < config.sight_radius {
            Position::new(x, y + step)
        } else if y > height - config.sight_radius {
            Position::new(x, y - step)
        } else {
            return true;
        };

        self.head_for(target, config);
        false
    }

    // Flee and speed up when the pointer is within sight.
    fn avoid_pointer(&mut self, pointer: Position, config: &FlockConfig) -> bool {
        let distance_sq = self.current.position.distance_squared(pointer);
        if distance_sq < config.sight_radius * config.sight_radius {
            self.avoid(pointer, config);
            self.steering.speed_change += config.speed_varying_rate;
            false
        } else {
            true
        }
    }

    fn avoid_creature(&mut self, other: Position, config: &FlockConfig) -> bool {
        let buffer = config.collision_distance();
        if self.current.position.distance_squared(other) < buffer * buffer {
            self.avoid(other, config);
            false
        } else {
            true
        }
    }

    // Push the planned position straight away from an overlapping point.
    fn repel_from(&mut self, other: Position, config: &FlockConfig) {
        let origin = self.current.position;
        let reach = config.collision_distance();
        if origin.distance_squared(other) < reach * reach {
            let angle = origin.bearing_to(other);
            self.planned.position.x -= angle.cos() * config.repulsion_rate;
            self.planned.position.y -= angle.sin() * config.repulsion_rate;
        }
    }

    fn avoid(&mut self, other: Position, config: &FlockConfig) {
        let away = self.current.position.reflect(other);
        self.head_for(away, config);
    }

    fn head_for(&mut self, target: Position, config: &FlockConfig) {
        let origin = self.current.position;
        if origin.distance_squared(target) > config.radius * config.radius {
            self.align_with(origin.bearing_to(target), config);
        }
    }

    // Turn a full rotation step along the shorter arc toward `angle`.
    fn align_with(&mut self, angle: f64, config: &FlockConfig) {
        let difference = angle - self.current.heading;
        if difference.abs() < PI {
            self.steering.heading_change += sign(difference) * config.rotation_rate;
        } else {
            self.steering.heading_change -= sign(difference) * config.rotation_rate;
        }
    }

    fn match_speed(&mut self, speed: f64, config: &FlockConfig) {
        let difference = speed - self.current.speed;
        let size_of_change = (difference.abs() / 2.0).min(config.speed_varying_rate);
        self.steering.speed_change += sign(difference) * size_of_change;
    }

    fn vary_speed<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &FlockConfig) {
        self.steering.speed_change += (rng.gen::<f64>() - 0.5) * config.speed_varying_rate;
    }

    fn vary_heading<R: Rng + ?Sized>(&mut self, rng: &mut R, config: &FlockConfig) {
        self.steering.heading_change += (rng.gen::<f64>() - 0.5) * config.rotation_rate;
    }

    // Clamp the accumulators and write the planned heading, speed and
    // position. Motion this tick uses the pre-tick heading and speed.
    fn apply_steering(&mut self, config: &FlockConfig) {
        let speed_change = clamp_magnitude(self.steering.speed_change, config.speed_varying_rate);
        let heading_change = clamp_magnitude(self.steering.heading_change, config.rotation_rate);
        self.steering = Steering {
            heading_change,
            speed_change,
        };

        self.planned.speed = (self.current.speed + speed_change)
            .min(config.max_speed)
            .max(config.min_speed);
        self.planned.heading = wrap_angle(self.current.heading + heading_change);

        self.planned.position.x += self.current.heading.cos() * self.current.speed;
        self.planned.position.y += self.current.heading.sin() * self.current.speed;
    }
}

impl Tracked for Creature {
    fn position(&self) -> Position {
        self.current.position
    }
    fn planned_position(&self) -> Position {
        self.planned.position
    }
}

// Like `f64::signum`, but zero for zero.
#[inline]
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[inline]
fn clamp_magnitude(value: f64, limit: f64) -> f64 {
    sign(value) * value.abs().min(limit)
}
