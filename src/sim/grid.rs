//! Uniform spatial hash grid
//!
//! Rebuilt from scratch every tick. Buckets hold particle indices into the
//! owning particle list, in insertion order.

use std::collections::HashMap;

use glam::DVec2;

use super::particle::Particle;

/// Offsets of the 3x3 neighborhood, raster order (dx outer, dy inner)
const NEIGHBOR_OFFSETS: [(i64, i64); 9] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 0),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<usize>>,
    len: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Cell coordinate containing `pos`
    #[inline]
    pub fn cell_of(&self, pos: DVec2) -> (i64, i64) {
        (
            (pos.x / self.cell_size).floor() as i64,
            (pos.y / self.cell_size).floor() as i64,
        )
    }

    /// Drop all buckets
    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }

    /// Append particle `index` to the bucket under `pos`
    pub fn insert(&mut self, index: usize, pos: DVec2) {
        let key = self.cell_of(pos);
        self.cells.entry(key).or_default().push(index);
        self.len += 1;
    }

    /// Clear and repopulate from the current particle positions
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.clear();
        for (i, p) in particles.iter().enumerate() {
            self.insert(i, p.pos);
        }
    }

    /// All indices in the 3x3 block of cells around `pos`.
    ///
    /// Includes whatever sits at `pos` itself; callers filter self-pairs.
    pub fn neighbors(&self, pos: DVec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.cell_of(pos);
        NEIGHBOR_OFFSETS
            .into_iter()
            .filter_map(move |(dx, dy)| self.cells.get(&(cx + dx, cy + dy)))
            .flat_map(|bucket| bucket.iter().copied())
    }

    /// Number of inserted entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}
