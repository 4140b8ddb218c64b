//! Viewport camera
//!
//! Pure function of the followed position and the world/viewport sizes: the
//! view is centred on the target and clamped so it never shows past the world
//! edges.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Top-left corner of the viewport in world space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    /// Camera centred on `target`, clamped to `[0, world - viewport]` per axis
    pub fn follow(target: Vec2, world: Vec2, viewport: Vec2) -> Self {
        let max = (world - viewport).max(Vec2::ZERO);
        let offset = (target - viewport / 2.0).clamp(Vec2::ZERO, max);
        Self { offset, viewport }
    }

    /// Re-centre on `target` keeping the same viewport
    pub fn update(&mut self, target: Vec2, world: Vec2) {
        *self = Self::follow(target, world, self.viewport);
    }

    #[inline]
    pub fn screen_to_world(&self, p: Vec2) -> Vec2 {
        p + self.offset
    }

    #[inline]
    pub fn world_to_screen(&self, p: Vec2) -> Vec2 {
        p - self.offset
    }

    /// Is a world point within `pad` of the visible area?
    pub fn is_visible(&self, p: Vec2, pad: f32) -> bool {
        let s = self.world_to_screen(p);
        s.x >= -pad && s.y >= -pad && s.x <= self.viewport.x + pad && s.y <= self.viewport.y + pad
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORLD: Vec2 = Vec2::new(3200.0, 2400.0);
    const VIEW: Vec2 = Vec2::new(960.0, 540.0);

    #[test]
    fn test_follow_centres_in_open_space() {
        let cam = Camera::follow(Vec2::new(1600.0, 1200.0), WORLD, VIEW);
        assert_eq!(cam.offset, Vec2::new(1120.0, 930.0));
    }

    #[test]
    fn test_follow_clamps_at_edges() {
        let cam = Camera::follow(Vec2::new(100.0, 100.0), WORLD, VIEW);
        assert_eq!(cam.offset, Vec2::ZERO);
        let cam = Camera::follow(Vec2::new(3190.0, 2390.0), WORLD, VIEW);
        assert_eq!(cam.offset, Vec2::new(2240.0, 1860.0));
    }

    #[test]
    fn test_viewport_larger_than_world() {
        let cam = Camera::follow(Vec2::new(50.0, 50.0), Vec2::new(400.0, 300.0), VIEW);
        assert_eq!(cam.offset, Vec2::ZERO);
    }

    #[test]
    fn test_screen_world_inverse() {
        let cam = Camera::follow(Vec2::new(1600.0, 1200.0), WORLD, VIEW);
        let p = Vec2::new(12.0, 34.0);
        assert_eq!(cam.world_to_screen(cam.screen_to_world(p)), p);
        assert!(cam.is_visible(Vec2::new(1600.0, 1200.0), 0.0));
        assert!(!cam.is_visible(Vec2::new(100.0, 100.0), 80.0));
    }
}
