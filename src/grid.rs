use std::time::Duration;

use log::{info, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{ConfigError, GridConfig};

/// Moore neighborhood offsets, in slot order W, E, NW, N, NE, SW, S, SE.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// One automaton unit: its state, the verdict of the current evolve
/// phase, and the indices of the 8 cells it consults.
#[derive(Debug, Clone)]
pub struct Cell {
    x: usize,
    y: usize,
    alive: bool,
    die: bool,
    neighbors: [usize; 8],
}

impl Cell {
    fn new(x: usize, y: usize) -> Self {
        Self {
            x,
            y,
            alive: false,
            die: false,
            neighbors: [0; 8],
        }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Counts live cells among the 8 cached neighbor slots.
    pub fn alive_neighbors(&self, cells: &[Cell]) -> u8 {
        self.neighbors
            .iter()
            .filter(|&&index| cells[index].alive)
            .count() as u8
    }

    /// Phase one: store the verdict without touching `alive`, so later
    /// cells in the same pass still read the previous generation.
    pub fn evolve(&mut self, alive_neighbors: u8) {
        self.die = match (self.alive, alive_neighbors) {
            (true, 2 | 3) => false, // survives
            (false, 3) => false,    // born
            _ => true,
        };
    }

    /// Phase two: apply the verdict.
    pub fn commit(&mut self) {
        self.alive = !self.die;
    }

    pub fn toggle(&mut self) {
        self.alive = !self.alive;
    }
}

/// A toroidal board of `size * size` cells, row-major.
#[derive(Debug)]
pub struct Grid {
    config: GridConfig,
    cells: Vec<Cell>,
    generation: u64,
}

impl Grid {
    pub fn new(config: GridConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut grid = Self {
            config,
            cells: Vec::new(),
            generation: 0,
        };
        grid.initialize();
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.config.size
    }

    pub fn density(&self) -> f64 {
        self.config.density
    }

    pub fn delay(&self) -> Duration {
        self.config.delay
    }

    pub fn config(&self) -> GridConfig {
        self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.config.size + x
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.config.size && y < self.config.size);
        self.cells[self.index(x, y)].alive
    }

    pub fn set(&mut self, x: usize, y: usize, alive: bool) {
        assert!(x < self.config.size && y < self.config.size);
        let index = self.index(x, y);
        self.cells[index].alive = alive;
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.alive).count()
    }

    /// Manual edit of one cell. Out-of-range coordinates are dropped so
    /// a stale UI cursor cannot corrupt the board.
    pub fn toggle(&mut self, x: usize, y: usize) {
        let size = self.config.size;
        if x >= size || y >= size {
            warn!("toggle ({x}, {y}) outside the {size}x{size} board");
            return;
        }
        let index = self.index(x, y);
        self.cells[index].toggle();
    }

    /// Full reset: fresh cells, rebuilt neighbor cache, reseed, zeroed
    /// generation counter.
    pub fn initialize(&mut self) {
        let size = self.config.size;
        let mut cells = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                cells.push(Cell::new(x, y));
            }
        }
        self.cells = cells;
        self.build_neighbor_cache();
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.seed(&mut rng);
        self.generation = 0;
        info!("initialized {size}x{size} board, density {}", self.config.density);
    }

    /// Resolves the 8 neighbors of every cell on the torus, wrapping
    /// each axis separately.
    fn build_neighbor_cache(&mut self) {
        let size = self.config.size as i64;
        let total = self.cells.len();
        for index in 0..total {
            let x = self.cells[index].x as i64;
            let y = self.cells[index].y as i64;
            let mut neighbors = [0; 8];
            for (slot, (dx, dy)) in NEIGHBOR_OFFSETS.into_iter().enumerate() {
                let nx = (x + dx).rem_euclid(size) as usize;
                let ny = (y + dy).rem_euclid(size) as usize;
                let neighbor = ny * self.config.size + nx;
                assert!(neighbor < total, "neighbor {neighbor} of ({x}, {y}) outside the board");
                neighbors[slot] = neighbor;
            }
            self.cells[index].neighbors = neighbors;
        }
    }

    fn seed(&mut self, rng: &mut impl Rng) {
        for cell in &mut self.cells {
            cell.alive = rng.gen_bool(self.config.density);
        }
    }

    /// One generation: evolve every cell against the current state,
    /// then commit every verdict.
    pub fn tick(&mut self) {
        for index in 0..self.cells.len() {
            let count = self.cells[index].alive_neighbors(&self.cells);
            self.cells[index].evolve(count);
        }
        for cell in &mut self.cells {
            cell.commit();
        }
        self.generation += 1;
        trace!("generation {}", self.generation);
    }

    /// Swaps in a new configuration and re-initializes. A rejected
    /// configuration leaves the previous board untouched.
    pub fn reconfigure(&mut self, config: GridConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.initialize();
        Ok(())
    }

    pub fn set_size(&mut self, size: usize) -> Result<(), ConfigError> {
        let mut next = self.config;
        next.size = size;
        self.reconfigure(next)
    }

    pub fn set_density(&mut self, density: f64) -> Result<(), ConfigError> {
        let mut next = self.config;
        next.density = density;
        self.reconfigure(next)
    }

    /// Changes the delay without touching cells or counter.
    pub fn set_delay(&mut self, delay: Duration) -> Result<(), ConfigError> {
        let mut next = self.config;
        next.delay = delay;
        next.validate()?;
        self.config = next;
        Ok(())
    }
}
