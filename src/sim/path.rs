//! Grid pathfinding over the maze
//!
//! A navigation grid is sampled from the wall set at maze-cell resolution and
//! searched with A* (4-connected, Manhattan heuristic). Used by the autopilot
//! to route around walls instead of pushing into them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::Vec2;

use super::world::World;
use crate::consts::{MAZE_CELL, WORLD_MARGIN};

/// Walkability grid aligned with the maze cells
#[derive(Debug, Clone)]
pub struct NavGrid {
    cols: usize,
    rows: usize,
    walkable: Vec<bool>,
}

impl NavGrid {
    /// Sample the world at every cell centre inside the border margin
    pub fn from_world(world: &World) -> Self {
        let span = (world.size() - WORLD_MARGIN * 2.0).max(Vec2::ZERO);
        let cols = (span.x / MAZE_CELL).ceil() as usize;
        let rows = (span.y / MAZE_CELL).ceil() as usize;
        let mut walkable = Vec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                walkable.push(!world.point_in_wall(Self::cell_center((x, y))));
            }
        }
        Self { cols, rows, walkable }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_center((x, y): (usize, usize)) -> Vec2 {
        Vec2::new(
            WORLD_MARGIN + (x as f32 + 0.5) * MAZE_CELL,
            WORLD_MARGIN + (y as f32 + 0.5) * MAZE_CELL,
        )
    }

    /// Cell containing `p`, if it lies on the grid
    pub fn cell_of(&self, p: Vec2) -> Option<(usize, usize)> {
        let local = (p - WORLD_MARGIN) / MAZE_CELL;
        if local.x < 0.0 || local.y < 0.0 {
            return None;
        }
        let (x, y) = (local.x as usize, local.y as usize);
        (x < self.cols && y < self.rows).then_some((x, y))
    }

    pub fn is_walkable(&self, (x, y): (usize, usize)) -> bool {
        x < self.cols && y < self.rows && self.walkable[y * self.cols + x]
    }

    fn neighbors(&self, (x, y): (usize, usize)) -> impl Iterator<Item = (usize, usize)> + '_ {
        let candidates = [
            x.checked_add(1).map(|nx| (nx, y)),
            x.checked_sub(1).map(|nx| (nx, y)),
            y.checked_add(1).map(|ny| (x, ny)),
            y.checked_sub(1).map(|ny| (x, ny)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(move |&c| self.is_walkable(c))
    }

    /// Shortest 4-connected cell path from `from` to `to`, both ends included
    ///
    /// Returns `None` when either end is off-grid or blocked, or no route exists.
    pub fn find_path(&self, from: Vec2, to: Vec2) -> Option<Vec<(usize, usize)>> {
        let start = self.cell_of(from)?;
        let goal = self.cell_of(to)?;
        if !self.is_walkable(start) || !self.is_walkable(goal) {
            return None;
        }

        let idx = |(x, y): (usize, usize)| y * self.cols + x;
        let heuristic = |(x, y): (usize, usize)| x.abs_diff(goal.0) + y.abs_diff(goal.1);

        let mut cost = vec![usize::MAX; self.walkable.len()];
        let mut came_from: Vec<Option<(usize, usize)>> = vec![None; self.walkable.len()];
        let mut open = BinaryHeap::new();
        cost[idx(start)] = 0;
        open.push(Reverse((heuristic(start), start)));

        while let Some(Reverse((_, current))) = open.pop() {
            if current == goal {
                let mut path = vec![current];
                let mut node = current;
                while let Some(prev) = came_from[idx(node)] {
                    path.push(prev);
                    node = prev;
                }
                path.reverse();
                return Some(path);
            }
            let g = cost[idx(current)];
            for next in self.neighbors(current) {
                let tentative = g + 1;
                if tentative < cost[idx(next)] {
                    cost[idx(next)] = tentative;
                    came_from[idx(next)] = Some(current);
                    open.push(Reverse((tentative + heuristic(next), next)));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::Rect;
    use crate::sim::maze;

    #[test]
    fn test_grid_matches_maze() {
        let world = World::generate("SEMILLA");
        let nav = NavGrid::from_world(&world);
        assert_eq!((nav.cols(), nav.rows()), (49, 37));
        let start = nav.cell_of(world.start_position()).unwrap();
        assert_eq!(start, (1, 1));
        assert!(nav.is_walkable(start));
        // Grid corner (0, 0) is a maze wall cell
        assert!(!nav.is_walkable((0, 0)));
    }

    #[test]
    fn test_path_through_maze() {
        let world = World::generate("SEMILLA");
        let nav = NavGrid::from_world(&world);
        let from = world.start_position();
        let to = NavGrid::cell_center((45, 33));
        let path = nav.find_path(from, to).expect("maze is connected");
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(45, 33)));
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            assert_eq!(a.0.abs_diff(b.0) + a.1.abs_diff(b.1), 1);
            assert!(nav.is_walkable(b));
        }
    }

    #[test]
    fn test_open_world_path_is_manhattan() {
        let size = Vec2::new(1000.0, 1000.0);
        let world = World::from_walls("open", size, maze::border_walls(size).to_vec());
        let nav = NavGrid::from_world(&world);
        let path = nav
            .find_path(NavGrid::cell_center((0, 0)), NavGrid::cell_center((5, 3)))
            .unwrap();
        assert_eq!(path.len(), 9);
    }

    #[test]
    fn test_no_path_when_walled_off() {
        let size = Vec2::new(1000.0, 1000.0);
        let mut walls = maze::border_walls(size).to_vec();
        walls.push(Rect::new(400.0, 0.0, 64.0, 1000.0));
        let world = World::from_walls("split", size, walls);
        let nav = NavGrid::from_world(&world);
        assert!(nav.find_path(Vec2::new(100.0, 500.0), Vec2::new(800.0, 500.0)).is_none());
        assert!(nav.find_path(Vec2::new(-10.0, 500.0), Vec2::new(100.0, 500.0)).is_none());
    }
}
