//! Spatial queries over the generated maze
//!
//! The `World` owns the wall set for a match. It is generated once from the
//! seed string and only ever replaced wholesale (by regenerating from the same
//! seed if the wall list is found empty mid-match).

use glam::Vec2;
use rand::Rng;

use super::geometry::{Rect, segment_intersects_rect};
use super::maze;
use crate::consts::{WORLD_HEIGHT, WORLD_MARGIN, WORLD_WIDTH};

/// Attempts made by [`World::random_clear_point`] before giving up
pub const CLEAR_POINT_ATTEMPTS: u32 = 220;
/// Distance from the world edge inside which clear points are sampled
pub const CLEAR_POINT_PADDING: f32 = 60.0;
/// Clear points never land this close to the right/bottom world edges
const CLEAR_POINT_FAR_EDGE: f32 = 96.0;
/// The strip along the bottom edge is a dead-end corridor; keep objectives out of it
const CLEAR_POINT_BOTTOM_BAND: f32 = 220.0;

/// Maze walls plus the world bounds they live in
#[derive(Debug, Clone)]
pub struct World {
    seed: String,
    size: Vec2,
    walls: Vec<Rect>,
}

impl World {
    /// Generate the standard-size world for `seed`
    pub fn generate(seed: &str) -> Self {
        Self::generate_sized(seed, Vec2::new(WORLD_WIDTH, WORLD_HEIGHT))
    }

    /// Generate a world of arbitrary size for `seed`
    pub fn generate_sized(seed: &str, size: Vec2) -> Self {
        let walls = maze::generate(seed, size);
        log::info!("Generated maze '{}' with {} walls", seed, walls.len());
        Self {
            seed: seed.to_string(),
            size,
            walls,
        }
    }

    /// Build a world around an explicit wall list
    pub fn from_walls(seed: &str, size: Vec2, walls: Vec<Rect>) -> Self {
        Self {
            seed: seed.to_string(),
            size,
            walls,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    /// Regenerate from the seed if the wall list went missing
    ///
    /// Returns true when a regeneration happened.
    pub fn ensure_walls(&mut self) -> bool {
        if !self.walls.is_empty() {
            return false;
        }
        log::warn!(
            "Wall list empty mid-match, regenerating maze '{}'",
            self.seed,
        );
        self.walls = maze::generate(&self.seed, self.size);
        true
    }

    /// Start position of the player (and later, of the exit)
    pub fn start_position(&self) -> Vec2 {
        maze::start_position()
    }

    pub fn point_in_wall(&self, p: Vec2) -> bool {
        self.walls.iter().any(|w| w.contains(p))
    }

    pub fn rect_overlaps_wall(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|w| w.overlaps(rect))
    }

    /// Is the straight line `a-b` blocked by any wall?
    pub fn segment_blocked(&self, a: Vec2, b: Vec2) -> bool {
        self.walls.iter().any(|w| segment_intersects_rect(a, b, w))
    }

    /// Is `p` inside the world shrunk by `margin` on every side?
    pub fn in_bounds(&self, p: Vec2, margin: f32) -> bool {
        p.x >= margin && p.y >= margin && p.x <= self.size.x - margin && p.y <= self.size.y - margin
    }

    /// Clamp `p` into the world shrunk by the border margin
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(
            Vec2::splat(WORLD_MARGIN),
            (self.size - WORLD_MARGIN).max(Vec2::splat(WORLD_MARGIN)),
        )
    }

    /// Random point outside every wall, away from the far edges
    ///
    /// Used for key placement and floor decals. Gives up after
    /// [`CLEAR_POINT_ATTEMPTS`] misses.
    pub fn random_clear_point<R: Rng>(&self, rng: &mut R) -> Option<Vec2> {
        let min = Vec2::splat(CLEAR_POINT_PADDING);
        let max = self.size - CLEAR_POINT_PADDING;
        if max.x <= min.x || max.y <= min.y {
            return None;
        }

        for _ in 0..CLEAR_POINT_ATTEMPTS {
            let p = Vec2::new(
                rng.random_range(min.x..max.x),
                rng.random_range(min.y..max.y),
            );
            if self.point_in_wall(p) {
                continue;
            }
            if p.x > self.size.x - CLEAR_POINT_FAR_EDGE
                || p.y > self.size.y - CLEAR_POINT_FAR_EDGE
            {
                continue;
            }
            if p.y > self.size.y - CLEAR_POINT_BOTTOM_BAND {
                continue;
            }
            return Some(p);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_start_position_clear() {
        let world = World::generate("SEMILLA");
        assert!(!world.point_in_wall(world.start_position()));
        let body = Rect::centered(world.start_position(), 24.0);
        assert!(!world.rect_overlaps_wall(&body));
    }

    #[test]
    fn test_border_queries() {
        let world = World::generate("SEMILLA");
        assert!(world.point_in_wall(Vec2::new(10.0, 10.0)));
        assert!(world.segment_blocked(world.start_position(), Vec2::new(10.0, 136.0)));
    }

    #[test]
    fn test_ensure_walls_regenerates_same_layout() {
        let reference = World::generate("SEMILLA");
        let mut world = World::from_walls("SEMILLA", reference.size(), Vec::new());
        assert!(world.ensure_walls());
        assert_eq!(world.walls(), reference.walls());
        assert!(!world.ensure_walls());
    }

    #[test]
    fn test_random_clear_point_respects_exclusions() {
        let world = World::generate("SEMILLA");
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let p = world.random_clear_point(&mut rng).expect("maze has open floor");
            assert!(!world.point_in_wall(p));
            assert!(p.y <= world.size().y - 220.0);
            assert!(p.x <= world.size().x - 96.0);
        }
    }

    #[test]
    fn test_random_clear_point_gives_up() {
        let size = Vec2::new(1000.0, 1000.0);
        let world = World::from_walls("solid", size, vec![Rect::new(0.0, 0.0, 1000.0, 1000.0)]);
        let mut rng = Pcg32::seed_from_u64(1);
        assert!(world.random_clear_point(&mut rng).is_none());
    }

    #[test]
    fn test_clamp() {
        let world = World::generate("SEMILLA");
        assert_eq!(
            world.clamp(Vec2::new(-5.0, 5000.0)),
            Vec2::new(40.0, 2360.0),
        );
    }
}
