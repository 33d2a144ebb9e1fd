/*
 * End-to-end flock behavior: motion bounds over many ticks, repulsion
 * between overlapping creatures, collision avoidance taking priority over
 * flocking, boundary containment and viewport shrinking.
 */

use std::f64::consts::PI;

use approx::assert_relative_eq;
use flock::geometry::wrap_angle;
use flock::spatial_grid::Tracked;
use flock::{Creature, FlockConfig, Kinematics, Position, Simulation};
use proptest::prelude::*;
use rand::rngs::mock::StepRng;
use rand::rngs::StdRng;
use rand::SeedableRng;

const FAR_AWAY: f64 = -1.0e6;

// Random draws of exactly one half, so jitter adds nothing
fn no_jitter() -> StepRng {
    StepRng::new(1 << 63, 0)
}

fn sequential() -> FlockConfig {
    FlockConfig {
        enable_parallel: false,
        ..FlockConfig::default()
    }
}

fn moving_population() -> impl Strategy<Value = Vec<(f64, f64, f64, f64)>> {
    prop::collection::vec((0.0..300.0f64, 0.0..300.0f64, -PI..PI, 1.0..8.0f64), 1..30)
}

fn build(config: FlockConfig, creatures: &[(f64, f64, f64, f64)]) -> Simulation {
    let creatures = creatures
        .iter()
        .map(|&(x, y, heading, speed)| Creature::new(x, y, heading, speed))
        .collect();
    Simulation::with_creatures(config, creatures, 300.0, 300.0).expect("valid config")
}

fn assert_state_bounds(state: &Kinematics, config: &FlockConfig) -> Result<(), TestCaseError> {
    prop_assert!(state.speed >= config.min_speed && state.speed <= config.max_speed);
    prop_assert!(state.heading > -PI && state.heading <= PI);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn steering_changes_stay_within_rates(creatures in moving_population(), seed in any::<u64>()) {
        let config = sequential();
        let mut simulation = build(config.clone(), &creatures);
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..20 {
            let before: Vec<Kinematics> = simulation.snapshots().collect();
            simulation.tick_with_rng(&mut rng);

            for (creature, old) in simulation.creatures().iter().zip(&before) {
                let new = creature.state();
                assert_state_bounds(&new, &config)?;

                let steering = creature.steering();
                prop_assert!(steering.heading_change.abs() <= config.rotation_rate);
                prop_assert!(steering.speed_change.abs() <= config.speed_varying_rate);
                prop_assert!(wrap_angle(new.heading - old.heading).abs() <= config.rotation_rate + 1e-9);
                prop_assert!((new.speed - old.speed).abs() <= config.speed_varying_rate + 1e-9);
            }
        }
    }

    #[test]
    fn parallel_ticks_keep_speed_and_heading_in_range(creatures in moving_population()) {
        let config = FlockConfig::default();
        let mut simulation = build(config.clone(), &creatures);

        for _ in 0..20 {
            simulation.tick();
            for state in simulation.snapshots() {
                assert_state_bounds(&state, &config)?;
            }
        }
        prop_assert_eq!(simulation.tick_count(), 20);
    }

    // At min speed the turning circle is far smaller than the edge margin,
    // so the creature never even reaches the edge.
    #[test]
    fn slow_creature_stays_inside_the_viewport(
        x in 50.0..350.0f64,
        y in 50.0..350.0f64,
        heading in -PI..PI,
    ) {
        let config = sequential();
        let mut simulation = lone_creature(&config, x, y, heading, config.min_speed);
        let overshoot = worst_overshoot(&mut simulation, 400);
        prop_assert!(overshoot <= 0.0, "left the viewport by {}", overshoot);
    }

    // Edge avoidance only starts `sight_radius` from the edge, but a creature
    // at max speed needs a circle of radius max_speed / rotation_rate to turn
    // around. Near a corner only one edge steers, so it can swing out by up
    // to about three turning radii.
    #[test]
    fn fast_creature_stays_within_three_turning_radii(
        x in 50.0..350.0f64,
        y in 50.0..350.0f64,
        heading in -PI..PI,
    ) {
        let config = sequential();
        let mut simulation = lone_creature(&config, x, y, heading, config.max_speed);
        let overshoot = worst_overshoot(&mut simulation, 400);
        prop_assert!(overshoot <= 3.0 * turning_radius(&config), "left the viewport by {}", overshoot);
    }
}

fn turning_radius(config: &FlockConfig) -> f64 {
    config.max_speed / config.rotation_rate
}

// A single creature in a 400x400 viewport with the pointer out of the way
fn lone_creature(config: &FlockConfig, x: f64, y: f64, heading: f64, speed: f64) -> Simulation {
    let creature = Creature::new(x, y, heading, speed);
    let mut simulation =
        Simulation::with_creatures(config.clone(), vec![creature], 400.0, 400.0).expect("valid config");
    simulation.set_pointer(FAR_AWAY, FAR_AWAY);
    simulation
}

// Farthest any creature got outside the viewport over `ticks` jitter-free ticks
fn worst_overshoot(simulation: &mut Simulation, ticks: usize) -> f64 {
    let (width, height) = simulation.viewport();
    let mut rng = no_jitter();
    let mut worst = f64::NEG_INFINITY;
    for _ in 0..ticks {
        simulation.tick_with_rng(&mut rng);
        for state in simulation.snapshots() {
            let Position { x, y } = state.position;
            worst = worst.max(-x).max(x - width).max(-y).max(y - height);
        }
    }
    worst
}

#[test]
fn fast_creature_overshoots_an_edge_it_runs_straight_at() {
    let config = sequential();
    // 100 px from each wall, heading straight at it
    let runs = [
        (100.0, 200.0, PI),
        (300.0, 200.0, 0.0),
        (200.0, 100.0, -PI / 2.0),
        (200.0, 300.0, PI / 2.0),
    ];
    for (x, y, heading) in runs {
        let mut simulation = lone_creature(&config, x, y, heading, config.max_speed);
        let overshoot = worst_overshoot(&mut simulation, 200);

        // More than one tick of travel past the edge, but no deeper than the
        // turning circle reaches past the avoidance margin plus two ticks
        assert!(overshoot > config.max_speed, "overshoot {overshoot}");
        let reach = turning_radius(&config) - config.sight_radius + 2.0 * config.max_speed;
        assert!(overshoot <= reach, "overshoot {overshoot} beyond {reach}");
    }
}

#[test]
fn lone_creature_only_jitters() {
    let config = sequential();
    let creature = Creature::new(200.0, 200.0, 0.3, 4.0);
    let mut simulation =
        Simulation::with_creatures(config.clone(), vec![creature], 400.0, 400.0).expect("valid config");
    simulation.set_pointer(FAR_AWAY, FAR_AWAY);

    simulation.tick_with_rng(&mut StdRng::seed_from_u64(11));

    let after = simulation.creature(0).expect("one creature");
    assert!(wrap_angle(after.heading - 0.3).abs() <= config.rotation_rate / 2.0 + 1e-12);
    assert!((after.speed - 4.0).abs() <= config.speed_varying_rate / 2.0 + 1e-12);
    assert_relative_eq!(after.position.x, 200.0 + 0.3f64.cos() * 4.0, epsilon = 1e-9);
    assert_relative_eq!(after.position.y, 200.0 + 0.3f64.sin() * 4.0, epsilon = 1e-9);
}

#[test]
fn overlapping_resting_creatures_are_pushed_apart() {
    let config = sequential();
    let radius = config.radius;
    let left = Creature::new(200.0, 200.0, 0.0, 0.0);
    let right = Creature::new(200.0 + radius, 200.0, PI, 0.0);
    let mut simulation =
        Simulation::with_creatures(config.clone(), vec![left, right], 400.0, 400.0).expect("valid config");
    simulation.set_pointer(FAR_AWAY, FAR_AWAY);

    simulation.tick_with_rng(&mut no_jitter());

    let left = simulation.creature(0).expect("left");
    let right = simulation.creature(1).expect("right");
    assert_relative_eq!(left.position.x, 200.0 - config.repulsion_rate, epsilon = 1e-9);
    assert_relative_eq!(right.position.x, 200.0 + radius + config.repulsion_rate, epsilon = 1e-9);
    assert_relative_eq!(left.position.y, 200.0, epsilon = 1e-9);
    assert_relative_eq!(right.position.y, 200.0, epsilon = 1e-9);
    assert_relative_eq!(
        left.position.distance_squared(right.position).sqrt(),
        radius + 2.0 * config.repulsion_rate,
        epsilon = 1e-9
    );
}

#[test]
fn close_visible_creature_suppresses_flocking() {
    let config = sequential();
    // B is straight ahead of A and inside the near-collision buffer, but
    // heads elsewhere at a different speed
    let a = Creature::new(200.0, 200.0, 0.0, 2.0);
    let b = Creature::new(207.0, 200.0, 1.0, 5.0);
    let mut simulation = Simulation::with_creatures(config.clone(), vec![a, b], 400.0, 400.0).expect("valid config");
    simulation.set_pointer(FAR_AWAY, FAR_AWAY);

    simulation.tick_with_rng(&mut no_jitter());

    let a = simulation.creatures()[0].steering();
    // Turned away from B, no alignment toward its heading, no speed matching
    assert_relative_eq!(a.heading_change, -config.rotation_rate);
    assert_eq!(a.speed_change, 0.0);
    assert_eq!(simulation.creature(0).expect("a").speed, 2.0);
    assert_eq!(simulation.last_tick_stats().avoiding, 1);
}

#[test]
fn shrinking_the_viewport_drops_outside_creatures_without_panicking() {
    let creatures = vec![
        Creature::new(100.0, 100.0, 0.0, 1.0),
        Creature::new(299.0, 199.0, PI, 1.0),
        Creature::new(500.0, 100.0, 0.0, 1.0),
        Creature::new(100.0, 500.0, 0.0, 1.0),
    ];
    let mut simulation = Simulation::with_creatures(sequential(), creatures, 800.0, 600.0).expect("valid config");
    assert_eq!(simulation.grid().len(), 4);

    simulation.on_viewport_resize(300.0, 200.0);
    assert_eq!(simulation.viewport(), (300.0, 200.0));

    let grid = simulation.grid();
    assert_eq!(grid.len(), 2);
    for (index, creature) in simulation.creatures().iter().enumerate() {
        let cell = grid.cell_of(creature.position());
        if grid.within_bounds(cell) {
            assert!(grid.contains(cell, index));
        } else {
            assert!(grid.neighbors_of(index, simulation.creatures()).is_empty());
        }
    }

    for _ in 0..10 {
        simulation.tick_with_rng(&mut no_jitter());
    }
    assert_eq!(simulation.tick_count(), 10);
}
