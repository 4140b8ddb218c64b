//! Geometry and raycasting primitives
//!
//! Everything in the maze is an axis-aligned rectangle, and everything that
//! moves is either a circle (player, enemies) or a short segment (bullets,
//! sight lines). These functions are pure; degenerate inputs (parallel or
//! zero-length segments) report "no intersection" instead of failing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Determinant magnitude below which two segments are treated as parallel
const PARALLEL_EPS: f32 = 1e-10;
/// Same, for a ray against a segment
const RAY_PARALLEL_EPS: f32 = 1e-8;

/// Axis-aligned rectangle (top-left corner plus size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        Self::new(center.x - size / 2.0, center.y - size / 2.0, size, size)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Inclusive containment (points on the border count as inside)
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Inclusive overlap test (touching edges count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(other.right() < self.x
            || other.x > self.right()
            || other.bottom() < self.y
            || other.y > self.bottom())
    }

    /// Point of the rectangle closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(self.x, self.right()),
            p.y.clamp(self.y, self.bottom()),
        )
    }

    /// The four edges: top, bottom, left, right
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let tl = Vec2::new(self.x, self.y);
        let tr = Vec2::new(self.right(), self.y);
        let bl = Vec2::new(self.x, self.bottom());
        let br = Vec2::new(self.right(), self.bottom());
        [(tl, tr), (bl, br), (tl, bl), (tr, br)]
    }
}

/// Do segments `a1-a2` and `b1-b2` intersect (endpoints included)?
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let denom = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if denom.abs() < PARALLEL_EPS {
        return false;
    }
    let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / denom;
    let u = -((a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x)) / denom;
    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Distance along a ray to where it crosses segment `s1-s2`
///
/// `dir` need not be normalized; the result is in units of `dir`. Returns
/// `None` when the ray is parallel to the segment or the crossing lies behind
/// the origin or outside the segment.
pub fn ray_segment_intersection(origin: Vec2, dir: Vec2, s1: Vec2, s2: Vec2) -> Option<f32> {
    let s = s2 - s1;
    let rxs = dir.perp_dot(s);
    if rxs.abs() < RAY_PARALLEL_EPS {
        return None;
    }
    let qp = s1 - origin;
    let t = qp.perp_dot(s) / rxs;
    let u = qp.perp_dot(dir) / rxs;
    (t >= 0.0 && (0.0..=1.0).contains(&u)).then_some(t)
}

/// Strict circle/rectangle overlap via the clamped nearest point
#[inline]
pub fn circle_rect_overlap(center: Vec2, radius: f32, rect: &Rect) -> bool {
    center.distance_squared(rect.closest_point(center)) < radius * radius
}

/// Does segment `a-b` cross any edge of `rect`, or start inside it?
pub fn segment_intersects_rect(a: Vec2, b: Vec2, rect: &Rect) -> bool {
    rect.edges()
        .iter()
        .any(|&(e1, e2)| segments_intersect(a, b, e1, e2))
        || rect.contains(a)
}

/// Closest point to `p` on segment `a-b`
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to segment `a-b`
#[inline]
pub fn point_segment_distance(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    p.distance(closest_point_on_segment(p, a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_segments_cross() {
        assert!(segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        ));
    }

    #[test]
    fn test_parallel_segments_never_intersect() {
        // Collinear overlap is degenerate and reported as a miss
        assert!(!segments_intersect(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, 0.0),
            Vec2::new(15.0, 0.0),
        ));
    }

    #[test]
    fn test_ray_hits_vertical_segment() {
        let t = ray_segment_intersection(
            Vec2::ZERO,
            Vec2::X,
            Vec2::new(50.0, -10.0),
            Vec2::new(50.0, 10.0),
        );
        assert!((t.unwrap() - 50.0).abs() < 1e-4);

        // Behind the origin
        let t = ray_segment_intersection(
            Vec2::ZERO,
            -Vec2::X,
            Vec2::new(50.0, -10.0),
            Vec2::new(50.0, 10.0),
        );
        assert!(t.is_none());
    }

    #[test]
    fn test_circle_rect_overlap() {
        let wall = Rect::new(100.0, 100.0, 64.0, 64.0);
        assert!(circle_rect_overlap(Vec2::new(95.0, 120.0), 12.0, &wall));
        assert!(!circle_rect_overlap(Vec2::new(80.0, 120.0), 12.0, &wall));
        // Corner: nearest point is (100, 100), distance ~14.1
        assert!(!circle_rect_overlap(Vec2::new(90.0, 90.0), 12.0, &wall));
        // Touching exactly is not an overlap
        assert!(!circle_rect_overlap(Vec2::new(88.0, 120.0), 12.0, &wall));
    }

    #[test]
    fn test_segment_rect() {
        let wall = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(segment_intersects_rect(
            Vec2::new(-5.0, 5.0),
            Vec2::new(15.0, 5.0),
            &wall
        ));
        // Starts inside, never crosses an edge
        assert!(segment_intersects_rect(
            Vec2::new(2.0, 2.0),
            Vec2::new(3.0, 3.0),
            &wall
        ));
        assert!(!segment_intersects_rect(
            Vec2::new(-5.0, -5.0),
            Vec2::new(-1.0, 20.0),
            &wall
        ));
    }

    #[test]
    fn test_point_segment_distance_clamps() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert!(
            (point_segment_distance(Vec2::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-5
        );
        assert!(
            (point_segment_distance(Vec2::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-5
        );
        // Zero-length segment degrades to point distance
        assert!(
            (point_segment_distance(Vec2::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-5
        );
    }

    proptest! {
        #[test]
        fn prop_closest_point_inside_rect(px in -500.0f32..500.0, py in -500.0f32..500.0) {
            let rect = Rect::new(-20.0, 10.0, 64.0, 32.0);
            let c = rect.closest_point(Vec2::new(px, py));
            prop_assert!(rect.contains(c));
        }

        #[test]
        fn prop_segment_distance_not_above_endpoints(
            px in -50.0f32..50.0, py in -50.0f32..50.0,
            ax in -50.0f32..50.0, ay in -50.0f32..50.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0,
        ) {
            let (p, a, b) = (Vec2::new(px, py), Vec2::new(ax, ay), Vec2::new(bx, by));
            let d = point_segment_distance(p, a, b);
            prop_assert!(d <= p.distance(a) + 1e-3);
            prop_assert!(d <= p.distance(b) + 1e-3);
        }
    }
}
