/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct used for neighbor lookups. The
 * viewport is split into square cells and every creature is bucketed by the
 * cell containing it, so a sight-radius query only has to look at the few
 * cells around the query origin instead of the whole population.
 *
 * - Cells store dense population indices, never the creatures themselves
 * - The set of cell offsets a query must cover is computed once, from the
 *   sight radius and cell side, and reused for every query
 * - Membership migrates only when a creature actually crosses a cell border
 */

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::geometry::Position;

/// Anything the grid can bucket: a current position used for queries and
/// removal, and a planned position used for insertion.
pub trait Tracked {
    fn position(&self) -> Position;
    fn planned_position(&self) -> Position;
}

/// Integer coordinates of a grid cell. May lie outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: isize,
    pub y: isize,
}

impl CellCoord {
    #[inline]
    pub fn offset(self, (dx, dy): (isize, isize)) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug)]
pub struct SpatialGrid {
    pub side_length: f64,
    sight_radius_sq: f64,
    // Grid extent in cells
    pub width: usize,
    pub height: usize,
    cells: Vec<HashSet<usize>>,
    cell_offsets: Vec<(isize, isize)>,
    // Instrumentation: cells visited by queries since the last reset
    cells_scanned: AtomicUsize,
}

impl SpatialGrid {
    /// Create an empty grid; call `initialize` to give it an extent.
    pub fn new(side_length: f64, sight_radius: f64) -> Self {
        Self {
            side_length,
            sight_radius_sq: sight_radius * sight_radius,
            width: 0,
            height: 0,
            cells: Vec::new(),
            cell_offsets: compute_cell_offsets(sight_radius, side_length),
            cells_scanned: AtomicUsize::new(0),
        }
    }

    /// Reset every cell, size the grid to the viewport and insert the whole
    /// population at its current positions.
    pub fn initialize<T: Tracked>(&mut self, population: &[T], width: f64, height: f64) {
        self.width = cells_along(width, self.side_length);
        self.height = cells_along(height, self.side_length);

        self.cells.clear();
        self.cells.resize_with(self.width * self.height, HashSet::new);

        for (index, creature) in population.iter().enumerate() {
            let cell = self.cell_of(creature.position());
            if let Some(slot) = self.slot(cell) {
                self.cells[slot].insert(index);
            }
        }
    }

    // Convert world coordinates to the coordinates of the containing cell
    #[inline]
    pub fn cell_of(&self, position: Position) -> CellCoord {
        CellCoord {
            x: (position.x / self.side_length).floor() as isize,
            y: (position.y / self.side_length).floor() as isize,
        }
    }

    #[inline]
    pub fn within_bounds(&self, cell: CellCoord) -> bool {
        cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < self.width && (cell.y as usize) < self.height
    }

    // Convert cell coordinates to an index into `cells`
    #[inline]
    fn slot(&self, cell: CellCoord) -> Option<usize> {
        self.within_bounds(cell)
            .then(|| cell.y as usize * self.width + cell.x as usize)
    }

    /// Add a creature to the cell of its planned position. Out of bounds is a
    /// no-op. Returns whether the cell gained a member.
    pub fn insert<T: Tracked>(&mut self, index: usize, creature: &T) -> bool {
        let cell = self.cell_of(creature.planned_position());
        match self.slot(cell) {
            Some(slot) => self.cells[slot].insert(index),
            None => false,
        }
    }

    /// Drop a creature from the cell of its current position, if it is there.
    pub fn remove<T: Tracked>(&mut self, index: usize, creature: &T) -> bool {
        let cell = self.cell_of(creature.position());
        match self.slot(cell) {
            Some(slot) => self.cells[slot].remove(&index),
            None => false,
        }
    }

    /// Move a creature to the cell of its planned position if that differs
    /// from the cell of its current position. Returns whether membership
    /// changed, so a repeated call is a no-op reporting false.
    /// Must run before the creature commits its planned state.
    pub fn reconcile<T: Tracked>(&mut self, index: usize, creature: &T) -> bool {
        let current = self.cell_of(creature.position());
        let planned = self.cell_of(creature.planned_position());
        if current == planned {
            return false;
        }
        let removed = self.remove(index, creature);
        let inserted = self.insert(index, creature);
        removed || inserted
    }

    /// Indices of every other creature within sight radius of `population[index]`.
    pub fn neighbors_of<T: Tracked>(&self, index: usize, population: &[T]) -> Vec<usize> {
        let mut neighbors = Vec::new();
        self.visit_neighbors(index, population, |_| {}, |other| neighbors.push(other));
        neighbors
    }

    /// Walk the cells covered by a query from `population[index]`, reporting
    /// each in-bounds cell scanned and each neighbor found.
    pub fn visit_neighbors<T, C, N>(&self, index: usize, population: &[T], mut on_cell: C, mut on_neighbor: N)
    where
        T: Tracked,
        C: FnMut(CellCoord),
        N: FnMut(usize),
    {
        let Some(creature) = population.get(index) else {
            return;
        };
        let origin = creature.position();
        let origin_cell = self.cell_of(origin);
        let mut scanned = 0;

        for &offset in &self.cell_offsets {
            let cell = origin_cell.offset(offset);
            let Some(slot) = self.slot(cell) else {
                continue;
            };
            scanned += 1;
            on_cell(cell);

            for &other in &self.cells[slot] {
                if other == index {
                    continue;
                }
                let Some(candidate) = population.get(other) else {
                    continue;
                };
                if origin.distance_squared(candidate.position()) <= self.sight_radius_sq {
                    on_neighbor(other);
                }
            }
        }

        self.cells_scanned.fetch_add(scanned, Ordering::Relaxed);
    }

    pub fn contains(&self, cell: CellCoord, index: usize) -> bool {
        self.slot(cell).map_or(false, |slot| self.cells[slot].contains(&index))
    }

    pub fn members(&self, cell: CellCoord) -> impl Iterator<Item = usize> + '_ {
        self.slot(cell)
            .into_iter()
            .flat_map(move |slot| self.cells[slot].iter().copied())
    }

    /// Total number of indices bucketed across all cells.
    pub fn len(&self) -> usize {
        self.cells.iter().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(HashSet::is_empty)
    }

    pub fn cell_offsets(&self) -> &[(isize, isize)] {
        &self.cell_offsets
    }

    pub fn cells_scanned(&self) -> usize {
        self.cells_scanned.load(Ordering::Relaxed)
    }

    /// Read and zero the scan counter.
    pub fn take_cells_scanned(&self) -> usize {
        self.cells_scanned.swap(0, Ordering::Relaxed)
    }
}

fn cells_along(extent: f64, side_length: f64) -> usize {
    if extent.is_finite() && extent > 0.0 {
        (extent / side_length).ceil() as usize
    } else {
        0
    }
}

// Every cell offset whose closest approach to the origin cell is within the
// sight radius. Two cells `d` apart along an axis are separated by at least
// `(|d| - 1) * side` along that axis.
fn compute_cell_offsets(sight_radius: f64, side_length: f64) -> Vec<(isize, isize)> {
    let max_cell_distance = (sight_radius / side_length).ceil() as isize;
    let sight_radius_sq = sight_radius * sight_radius;
    let gap = |d: isize| (d.abs() - 1).max(0) as f64 * side_length;

    let mut offsets = Vec::new();
    for dx in -max_cell_distance..=max_cell_distance {
        for dy in -max_cell_distance..=max_cell_distance {
            let (gx, gy) = (gap(dx), gap(dy));
            if gx * gx + gy * gy <= sight_radius_sq {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}
