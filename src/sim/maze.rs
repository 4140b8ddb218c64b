//! Seeded maze generation
//!
//! The maze is carved on an odd-sized grid with a randomized depth-first
//! search (a perfect maze: exactly one path between any two open cells), then
//! a loop-opening pass knocks out some of the single-cell walls that separate
//! two straight corridors, so the player is never forced down one path.
//!
//! Generation is a pure function of the seed string: the same seed always
//! yields the same wall list, in the same order.

use glam::Vec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::Rect;
use crate::consts::{MAZE_CELL, WORLD_MARGIN};

/// Chance that an eligible corridor wall is opened into a loop
pub const LOOP_OPEN_CHANCE: f32 = 0.18;

/// Grid cell of the carve start (and of the player start)
pub const START_CELL: (usize, usize) = (1, 1);

/// Carve steps: two cells at a time so walls stay on even coordinates
const CARVE_STEPS: [(isize, isize); 4] = [(2, 0), (-2, 0), (0, 2), (0, -2)];

/// Hash a seed string into the 32-bit stream seed (`h = h * 31 + c`)
pub fn seed_hash(seed: &str) -> u32 {
    seed.chars()
        .fold(0u32, |h, c| h.wrapping_mul(31).wrapping_add(c as u32))
}

/// Deterministic random stream for a seed string
pub fn seeded_rng(seed: &str) -> Pcg32 {
    Pcg32::seed_from_u64(u64::from(seed_hash(seed)))
}

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Open,
    Blocked,
}

/// Maze grid, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl MazeGrid {
    /// Grid dimensions that fit inside the world borders, forced odd
    pub fn dimensions_for(world: Vec2) -> (usize, usize) {
        let fit = |extent: f32| {
            let n = ((extent - WORLD_MARGIN * 2.0) / MAZE_CELL).floor().max(0.0) as usize;
            if n % 2 == 0 { n.saturating_sub(1) } else { n }
        };
        (fit(world.x), fit(world.y))
    }

    /// A fully blocked grid
    pub fn blocked(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Blocked; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y); anything outside the grid reads as blocked
    pub fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::Blocked
        }
    }

    #[inline]
    pub fn is_open(&self, x: usize, y: usize) -> bool {
        self.get(x, y) == Cell::Open
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    /// Carvable cells exclude the outermost ring
    fn in_carve_bounds(&self, x: isize, y: isize) -> bool {
        x > 0 && y > 0 && x < self.width as isize - 1 && y < self.height as isize - 1
    }

    /// Randomized depth-first carve from [`START_CELL`]
    pub fn carve<R: Rng>(&mut self, rng: &mut R) {
        let (sx, sy) = START_CELL;
        if !self.in_carve_bounds(sx as isize, sy as isize) {
            return;
        }
        self.set(sx, sy, Cell::Open);

        let mut stack = vec![(sx, sy)];
        while let Some(&(x, y)) = stack.last() {
            let mut steps = CARVE_STEPS;
            steps.shuffle(rng);

            let next = steps.iter().find_map(|&(dx, dy)| {
                let nx = x as isize + dx;
                let ny = y as isize + dy;
                (self.in_carve_bounds(nx, ny) && !self.is_open(nx as usize, ny as usize))
                    .then_some((nx as usize, ny as usize, dx, dy))
            });

            match next {
                Some((nx, ny, dx, dy)) => {
                    let wx = (x as isize + dx / 2) as usize;
                    let wy = (y as isize + dy / 2) as usize;
                    self.set(wx, wy, Cell::Open);
                    self.set(nx, ny, Cell::Open);
                    stack.push((nx, ny));
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    /// Open some walls that separate two straight corridor segments
    ///
    /// Returns how many cells were opened.
    pub fn open_loops<R: Rng>(&mut self, rng: &mut R, chance: f32) -> usize {
        let mut opened = 0;
        for y in 2..self.height.saturating_sub(2) {
            for x in 2..self.width.saturating_sub(2) {
                if self.is_open(x, y) {
                    continue;
                }
                let up = self.is_open(x, y - 1);
                let down = self.is_open(x, y + 1);
                let left = self.is_open(x - 1, y);
                let right = self.is_open(x + 1, y);

                let splits_row = left && right && !up && !down;
                let splits_column = up && down && !left && !right;
                if !(splits_row || splits_column) {
                    continue;
                }

                if rng.random::<f32>() < chance {
                    self.set(x, y, Cell::Open);
                    opened += 1;
                }
            }
        }
        opened
    }

    /// Number of open cells
    pub fn open_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Open).count()
    }

    /// Number of blocked cells
    pub fn blocked_count(&self) -> usize {
        self.cells.len() - self.open_count()
    }

    /// Open cells reachable from (x, y) through 4-connected open cells
    pub fn reachable_from(&self, x: usize, y: usize) -> usize {
        if !self.is_open(x, y) {
            return 0;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = std::collections::VecDeque::from([(x, y)]);
        seen[y * self.width + x] = true;
        let mut count = 0;

        while let Some((cx, cy)) = queue.pop_front() {
            count += 1;
            let neighbors = [
                (cx.wrapping_sub(1), cy),
                (cx + 1, cy),
                (cx, cy.wrapping_sub(1)),
                (cx, cy + 1),
            ];
            for (nx, ny) in neighbors {
                if self.is_open(nx, ny) && !seen[ny * self.width + nx] {
                    seen[ny * self.width + nx] = true;
                    queue.push_back((nx, ny));
                }
            }
        }
        count
    }

    /// World rectangle covered by grid cell (x, y)
    pub fn cell_rect(x: usize, y: usize) -> Rect {
        Rect::new(
            WORLD_MARGIN + x as f32 * MAZE_CELL,
            WORLD_MARGIN + y as f32 * MAZE_CELL,
            MAZE_CELL,
            MAZE_CELL,
        )
    }

    /// Four world border walls followed by one rectangle per blocked cell
    pub fn to_walls(&self, world: Vec2) -> Vec<Rect> {
        let mut walls = Vec::with_capacity(4 + self.blocked_count());
        walls.extend(border_walls(world));
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_open(x, y) {
                    walls.push(Self::cell_rect(x, y));
                }
            }
        }
        walls
    }
}

/// Top, bottom, left and right border walls
pub fn border_walls(world: Vec2) -> [Rect; 4] {
    [
        Rect::new(0.0, 0.0, world.x, WORLD_MARGIN),
        Rect::new(0.0, world.y - WORLD_MARGIN, world.x, WORLD_MARGIN),
        Rect::new(0.0, 0.0, WORLD_MARGIN, world.y),
        Rect::new(world.x - WORLD_MARGIN, 0.0, WORLD_MARGIN, world.y),
    ]
}

/// Carve and loop-open the grid for `seed`
pub fn generate_grid(seed: &str, world: Vec2) -> MazeGrid {
    let (width, height) = MazeGrid::dimensions_for(world);
    let mut rng = seeded_rng(seed);
    let mut grid = MazeGrid::blocked(width, height);
    grid.carve(&mut rng);
    let loops = grid.open_loops(&mut rng, LOOP_OPEN_CHANCE);
    log::debug!(
        "Maze '{}': {}x{} grid, {} open cells, {} loops opened",
        seed,
        width,
        height,
        grid.open_count(),
        loops
    );
    grid
}

/// Wall set for `seed`
pub fn generate(seed: &str, world: Vec2) -> Vec<Rect> {
    generate_grid(seed, world).to_walls(world)
}

/// Player start: center of [`START_CELL`]
pub fn start_position() -> Vec2 {
    MazeGrid::cell_rect(START_CELL.0, START_CELL.1).center()
}
