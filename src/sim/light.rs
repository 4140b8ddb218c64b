//! Flashlight cone: visibility, occlusion and light falloff
//!
//! A point is lit when it lies inside the player's cone (bearing within half
//! the cone angle of the aim direction, distance within the radius) and the
//! straight line from the player to it crosses no wall. Lit is the gameplay
//! gate for everything: enemies speed up and become shootable, keys and the
//! exit can only be captured while lit.

use std::f32::consts::TAU;

use glam::Vec2;

use super::geometry::{Rect, ray_segment_intersection, segment_intersects_rect};
use crate::consts::{FOV_ANGLE, FOV_RADIUS, LIGHT_FALLOFF_EXP, VISIBILITY_EPSILON, VISIBILITY_RAYS};
use crate::{angle_delta, heading, normalize_angle};

/// The player's light cone for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flashlight {
    pub origin: Vec2,
    /// Aim direction (radians)
    pub facing: f32,
    /// Full cone angle (radians)
    pub angle: f32,
    pub radius: f32,
}

impl Flashlight {
    /// Standard cone at `origin` aimed along `facing`
    pub fn new(origin: Vec2, facing: f32) -> Self {
        Self::with_cone(origin, facing, FOV_ANGLE, FOV_RADIUS)
    }

    pub fn with_cone(origin: Vec2, facing: f32, angle: f32, radius: f32) -> Self {
        Self {
            origin,
            facing,
            angle,
            radius,
        }
    }

    /// Angle and radius test only (ignores walls)
    pub fn in_cone(&self, p: Vec2) -> bool {
        let to_p = p - self.origin;
        let dist = to_p.length();
        if dist <= f32::EPSILON {
            return true;
        }
        if dist > self.radius {
            return false;
        }
        let bearing = to_p.y.atan2(to_p.x);
        angle_delta(self.facing, bearing).abs() <= self.angle / 2.0
    }

    /// In the cone and not occluded by any wall
    pub fn is_point_lit(&self, walls: &[Rect], p: Vec2) -> bool {
        self.in_cone(p) && !walls.iter().any(|w| segment_intersects_rect(self.origin, p, w))
    }

    /// Brightness in [0, 1]: 0 when unlit, concave falloff toward the rim
    pub fn light_factor(&self, walls: &[Rect], p: Vec2) -> f32 {
        if !self.is_point_lit(walls, p) {
            return 0.0;
        }
        let f = 1.0 - self.origin.distance(p) / self.radius;
        f.clamp(0.0, 1.0).powf(LIGHT_FALLOFF_EXP)
    }

    /// Lit area clipped against the walls, origin first
    pub fn polygon(&self, walls: &[Rect]) -> Vec<Vec2> {
        let half = self.angle / 2.0;
        visibility_polygon(
            walls,
            self.origin,
            self.radius,
            self.facing - half,
            self.facing + half,
        )
    }
}

/// Where a ray from `origin` at `angle` stops: the nearest wall edge within
/// `max_dist` (pulled back by [`VISIBILITY_EPSILON`]), or full length
pub fn cast_ray(walls: &[Rect], origin: Vec2, angle: f32, max_dist: f32) -> Vec2 {
    let dir = heading(angle);
    let nearest = walls
        .iter()
        .flat_map(|w| w.edges())
        .filter_map(|(a, b)| ray_segment_intersection(origin, dir, a, b))
        .filter(|&t| t <= max_dist)
        .fold(None, |best: Option<f32>, t| Some(best.map_or(t, |b| b.min(t))));

    match nearest {
        Some(t) => origin + dir * (t - VISIBILITY_EPSILON).max(0.0),
        None => origin + dir * max_dist,
    }
}

/// Fan of [`VISIBILITY_RAYS`] evenly spaced rays from `angle_start` to
/// `angle_end`, each clipped by the walls
///
/// The returned polygon starts with `origin`, followed by the ray endpoints in
/// sweep order. The sweep always turns counter-clockwise (increasing angle):
/// both ends are normalized and the end is pushed a full turn ahead when it
/// would otherwise precede the start.
pub fn visibility_polygon(
    walls: &[Rect],
    origin: Vec2,
    radius: f32,
    angle_start: f32,
    angle_end: f32,
) -> Vec<Vec2> {
    let start = normalize_angle(angle_start);
    let mut end = normalize_angle(angle_end);
    if end < start {
        end += TAU;
    }

    let mut points = Vec::with_capacity(VISIBILITY_RAYS + 2);
    points.push(origin);
    for i in 0..=VISIBILITY_RAYS {
        let t = i as f32 / VISIBILITY_RAYS as f32;
        let angle = normalize_angle(start + (end - start) * t);
        points.push(cast_ray(walls, origin, angle, radius));
    }
    points
}
