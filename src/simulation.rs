/*
 * Simulation Module
 *
 * This module drives the flock one discrete tick at a time. A tick has two
 * strictly separated phases:
 * - Plan: every creature queries the grid around its committed position and
 *   computes its next state. Only committed state is read, so this phase is
 *   order independent and runs on the rayon pool when enabled
 * - Commit: single threaded; each creature migrates grid cells if it crossed
 *   a border, then adopts its planned state
 *
 * The simulation owns the population and the grid. Creatures never hold a
 * reference to either; the grid stores population indices.
 */

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::config::FlockConfig;
use crate::creature::{Creature, Kinematics, PlanOutcome, Surroundings};
use crate::error::{self, ConfigError};
use crate::geometry::Position;
use crate::spatial_grid::{CellCoord, SpatialGrid};

/// Counters gathered over one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Creatures that moved to another grid cell.
    pub migrations: usize,
    /// Grid cells visited by neighbor queries.
    pub cells_scanned: usize,
    /// Creatures steering away from a visible creature.
    pub avoiding: usize,
    /// Creatures that flocked with at least one visible creature.
    pub flocking: usize,
}

impl TickStats {
    fn from_outcome(outcome: PlanOutcome) -> Self {
        Self {
            avoiding: usize::from(!outcome.clear_of_creatures),
            flocking: usize::from(outcome.flocked_with > 0),
            ..Self::default()
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            migrations: self.migrations + other.migrations,
            cells_scanned: self.cells_scanned + other.cells_scanned,
            avoiding: self.avoiding + other.avoiding,
            flocking: self.flocking + other.flocking,
        }
    }
}

/// What one neighbor query saw; used by the debug overlay.
#[derive(Debug, Clone, Default)]
pub struct NeighborProbe {
    pub scanned_cells: Vec<CellCoord>,
    pub neighbors: Vec<usize>,
}

pub struct Simulation {
    config: FlockConfig,
    creatures: Vec<Creature>,
    grid: SpatialGrid,
    pointer: Position,
    width: f64,
    height: f64,
    tick_count: u64,
    last_tick: TickStats,
}

impl Simulation {
    /// Spawn `config.population_size` creatures at rest, at random places
    /// inside the viewport, with the pointer at its center.
    pub fn new(config: FlockConfig, width: f64, height: f64) -> error::Result<Self> {
        config.validate()?;
        let mut rng = rand::thread_rng();
        let creatures = (0..config.population_size)
            .map(|_| Creature::spawn(&mut rng, width, height))
            .collect();
        let simulation = Self::assemble(config, creatures, width, height);
        info!(
            creatures = simulation.creatures.len(),
            width,
            height,
            cell_offsets = simulation.grid.cell_offsets().len(),
            "Flock simulation ready",
        );
        Ok(simulation)
    }

    /// Build around a hand-placed population; `config.population_size` is
    /// overwritten with its length.
    pub fn with_creatures(
        mut config: FlockConfig,
        creatures: Vec<Creature>,
        width: f64,
        height: f64,
    ) -> error::Result<Self> {
        config.validate()?;
        config.population_size = creatures.len();
        Ok(Self::assemble(config, creatures, width, height))
    }

    fn assemble(config: FlockConfig, creatures: Vec<Creature>, width: f64, height: f64) -> Self {
        let mut grid = SpatialGrid::new(config.side_length, config.sight_radius);
        grid.initialize(&creatures, width, height);
        Self {
            config,
            creatures,
            grid,
            pointer: Position::new(width / 2.0, height / 2.0),
            width,
            height,
            tick_count: 0,
            last_tick: TickStats::default(),
        }
    }

    /// Advance one tick using thread-local randomness, planning in parallel
    /// when `enable_parallel` is set.
    pub fn tick(&mut self) {
        let snapshot = self.snapshot_states();
        self.grid.take_cells_scanned();

        let planned = if self.config.enable_parallel {
            self.plan_parallel(&snapshot)
        } else {
            self.plan_sequential(&snapshot, &mut rand::thread_rng())
        };
        self.finish_tick(planned);
    }

    /// Advance one tick sequentially, drawing all randomness from `rng`.
    pub fn tick_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let snapshot = self.snapshot_states();
        self.grid.take_cells_scanned();

        let planned = self.plan_sequential(&snapshot, rng);
        self.finish_tick(planned);
    }

    fn snapshot_states(&self) -> Vec<Kinematics> {
        self.creatures.iter().map(Creature::state).collect()
    }

    // The read-only world and the population, borrowed apart for planning.
    fn split_for_planning(&mut self) -> (World<'_>, &mut [Creature]) {
        let world = World {
            grid: &self.grid,
            config: &self.config,
            pointer: self.pointer,
            width: self.width,
            height: self.height,
        };
        (world, &mut self.creatures)
    }

    fn plan_sequential<R: Rng + ?Sized>(&mut self, snapshot: &[Kinematics], rng: &mut R) -> TickStats {
        let (world, creatures) = self.split_for_planning();
        let mut stats = TickStats::default();
        for (index, creature) in creatures.iter_mut().enumerate() {
            let outcome = world.plan(index, creature, snapshot, rng);
            stats = stats.merge(TickStats::from_outcome(outcome));
        }
        stats
    }

    fn plan_parallel(&mut self, snapshot: &[Kinematics]) -> TickStats {
        let (world, creatures) = self.split_for_planning();
        creatures
            .par_iter_mut()
            .enumerate()
            .map_init(rand::thread_rng, |rng, (index, creature)| {
                TickStats::from_outcome(world.plan(index, creature, snapshot, rng))
            })
            .reduce(TickStats::default, TickStats::merge)
    }

    fn finish_tick(&mut self, planned: TickStats) {
        let cells_scanned = self.grid.take_cells_scanned();
        let migrations = self.commit_phase();
        self.tick_count += 1;
        self.last_tick = TickStats {
            migrations,
            cells_scanned,
            ..planned
        };
        trace!(
            tick = self.tick_count,
            migrations,
            cells_scanned,
            avoiding = planned.avoiding,
            flocking = planned.flocking,
            "Committed tick",
        );
    }

    // Migrate grid membership against the still-current position, then commit.
    fn commit_phase(&mut self) -> usize {
        let mut migrations = 0;
        for (index, creature) in self.creatures.iter_mut().enumerate() {
            if self.grid.reconcile(index, &*creature) {
                migrations += 1;
            }
            creature.commit();
        }
        migrations
    }

    /// Rebuild the grid for a new viewport. Creatures keep their positions;
    /// any left outside are steered back by boundary avoidance.
    pub fn on_viewport_resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.grid.initialize(&self.creatures, width, height);
        debug!(
            width,
            height,
            outside = self.creatures.len() - self.grid.len(),
            "Rebuilt grid for new viewport",
        );
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = Position::new(x, y);
    }

    /// Apply edited settings. Growing the population spawns new creatures,
    /// shrinking it drops the newest; the grid is rebuilt whenever its shape
    /// or the population changed.
    pub fn apply_config(&mut self, config: FlockConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let reshape = config.side_length != self.config.side_length
            || config.sight_radius != self.config.sight_radius
            || config.population_size != self.creatures.len();

        if config.population_size != self.creatures.len() {
            let mut rng = rand::thread_rng();
            let (width, height) = (self.width, self.height);
            self.creatures
                .resize_with(config.population_size, || Creature::spawn(&mut rng, width, height));
        }
        self.config = config;

        if reshape {
            self.grid = SpatialGrid::new(self.config.side_length, self.config.sight_radius);
            self.grid.initialize(&self.creatures, self.width, self.height);
            debug!(
                creatures = self.creatures.len(),
                side_length = self.config.side_length,
                sight_radius = self.config.sight_radius,
                "Rebuilt grid for new settings",
            );
        }
        Ok(())
    }

    /// Scatter the whole population again.
    pub fn reset(&mut self) {
        let mut rng = rand::thread_rng();
        for creature in &mut self.creatures {
            *creature = Creature::spawn(&mut rng, self.width, self.height);
        }
        self.grid.initialize(&self.creatures, self.width, self.height);
        info!(creatures = self.creatures.len(), "Scattered flock");
    }

    /// Cells and neighbors a query from `index` would visit right now.
    pub fn probe(&self, index: usize) -> NeighborProbe {
        let mut probe = NeighborProbe::default();
        self.grid.visit_neighbors(
            index,
            &self.creatures,
            |cell| probe.scanned_cells.push(cell),
            |other| probe.neighbors.push(other),
        );
        probe
    }

    pub fn snapshots(&self) -> impl ExactSizeIterator<Item = Kinematics> + '_ {
        self.creatures.iter().map(Creature::state)
    }

    pub fn creature(&self, index: usize) -> Option<Kinematics> {
        self.creatures.get(index).map(Creature::state)
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn pointer(&self) -> Position {
        self.pointer
    }

    pub fn viewport(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_tick_stats(&self) -> TickStats {
        self.last_tick
    }
}

// Read-only view shared by every plan step of a tick.
struct World<'a> {
    grid: &'a SpatialGrid,
    config: &'a FlockConfig,
    pointer: Position,
    width: f64,
    height: f64,
}

impl World<'_> {
    fn plan<R: Rng + ?Sized>(
        &self,
        index: usize,
        creature: &mut Creature,
        snapshot: &[Kinematics],
        rng: &mut R,
    ) -> PlanOutcome {
        let neighbors: Vec<Kinematics> = self
            .grid
            .neighbors_of(index, snapshot)
            .into_iter()
            .map(|other| snapshot[other])
            .collect();
        let around = Surroundings {
            neighbors: &neighbors,
            pointer: self.pointer,
            width: self.width,
            height: self.height,
        };
        creature.plan(&around, self.config, rng)
    }
}
