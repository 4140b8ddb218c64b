//! Collision detection and response
//!
//! Circles (player, enemies) against the maze rectangles, bullets as short
//! segments against walls and enemies, and the soft pushes that keep enemies
//! from stacking on each other or on the player.

use glam::Vec2;

use super::geometry::{Rect, circle_rect_overlap, point_segment_distance, segment_intersects_rect};
use super::state::{Bullet, Enemy};
use super::world::World;
use crate::consts::{ENEMY_SEPARATION_SLACK, PLAYER_CONTACT_REACH};

/// Share of the overlap an enemy is shoved back by when touching the player
const CONTACT_PUSH_SHARE: f32 = 0.6;
/// Pairs closer than this are treated as coincident and left alone
const MIN_SEPARATION_DIST: f32 = 0.001;

/// Result of a circle-vs-wall check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the circle overlapped the wall
    pub hit: bool,
    /// Where the centre ends up after push-out
    pub point: Vec2,
    /// Axis the circle was pushed along
    pub normal: Vec2,
    /// How far it was moved
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss(point: Vec2) -> Self {
        Self {
            hit: false,
            point,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Push a circle out of one wall along the axis of smaller penetration
///
/// The centre is snapped to exactly `radius` outside the wall edge on that
/// axis; the other coordinate is untouched.
pub fn circle_wall_collision(center: Vec2, radius: f32, wall: &Rect) -> CollisionResult {
    if !circle_rect_overlap(center, radius, wall) {
        return CollisionResult::miss(center);
    }

    let left = center.x - wall.x;
    let right = wall.right() - center.x;
    let top = center.y - wall.y;
    let bottom = wall.bottom() - center.y;

    let mut point = center;
    let normal = if left.min(right) < top.min(bottom) {
        if left < right {
            point.x = wall.x - radius;
            -Vec2::X
        } else {
            point.x = wall.right() + radius;
            Vec2::X
        }
    } else if top < bottom {
        point.y = wall.y - radius;
        -Vec2::Y
    } else {
        point.y = wall.bottom() + radius;
        Vec2::Y
    };

    CollisionResult {
        hit: true,
        point,
        normal,
        penetration: point.distance(center),
    }
}

/// Resolve a circle against every wall in turn, then clamp into the world
pub fn resolve_circle_vs_walls(world: &World, center: Vec2, radius: f32) -> Vec2 {
    let resolved = world
        .walls()
        .iter()
        .fold(center, |p, wall| circle_wall_collision(p, radius, wall).point);
    world.clamp(resolved)
}

/// Does the bullet's segment touch any wall?
pub fn bullet_hits_wall(bullet: &Bullet, walls: &[Rect]) -> bool {
    let head = bullet.pos;
    let tail = bullet.tail();
    walls
        .iter()
        .any(|w| {
            segment_intersects_rect(head, tail, w) || w.contains(head) || w.contains(tail)
        })
}

/// Capsule test: is the enemy centre within its radius of the bullet segment?
pub fn bullet_hits_enemy(bullet: &Bullet, enemy: &Enemy) -> bool {
    point_segment_distance(enemy.pos, bullet.tail(), bullet.pos) <= enemy.radius
}

/// Push overlapping alive enemies half the overlap apart each
///
/// A little overlap ([`ENEMY_SEPARATION_SLACK`]) is tolerated.
pub fn separate_enemies(enemies: &mut [Enemy]) {
    for i in 0..enemies.len() {
        if !enemies[i].is_alive() {
            continue;
        }
        for j in (i + 1)..enemies.len() {
            if !enemies[j].is_alive() {
                continue;
            }
            let delta = enemies[j].pos - enemies[i].pos;
            let dist = delta.length();
            let min_dist = enemies[i].radius + enemies[j].radius - ENEMY_SEPARATION_SLACK;
            if dist > MIN_SEPARATION_DIST && dist < min_dist {
                let push = delta / dist * (min_dist - dist) * 0.5;
                enemies[i].pos -= push;
                enemies[j].pos += push;
            }
        }
    }
}

/// Shove touching enemies off the player; returns true if any was touching
pub fn resolve_melee_contact(player_pos: Vec2, enemies: &mut [Enemy]) -> bool {
    let mut touching = false;
    for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
        let delta = player_pos - enemy.pos;
        let dist = delta.length();
        let reach = enemy.radius + PLAYER_CONTACT_REACH;
        if dist < reach && dist > MIN_SEPARATION_DIST {
            touching = true;
            enemy.pos -= delta / dist * (reach - dist) * CONTACT_PUSH_SHARE;
        }
    }
    touching
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BULLET_DAMAGE, ENEMY_RADIUS};
    use proptest::prelude::*;

    fn wall() -> Rect {
        Rect::new(100.0, 100.0, 64.0, 64.0)
    }

    #[test]
    fn test_push_out_smaller_axis() {
        // Slightly into the left face
        let r = circle_wall_collision(Vec2::new(95.0, 130.0), 12.0, &wall());
        assert!(r.hit);
        assert_eq!(r.point, Vec2::new(88.0, 130.0));
        assert_eq!(r.normal, -Vec2::X);

        // Into the bottom face
        let r = circle_wall_collision(Vec2::new(130.0, 170.0), 12.0, &wall());
        assert_eq!(r.point, Vec2::new(130.0, 176.0));
        assert_eq!(r.normal, Vec2::Y);
    }

    #[test]
    fn test_no_push_when_clear() {
        let r = circle_wall_collision(Vec2::new(50.0, 50.0), 12.0, &wall());
        assert!(!r.hit);
        assert_eq!(r.point, Vec2::new(50.0, 50.0));
    }

    #[test]
    fn test_resolve_clamps_to_world() {
        let world = World::from_walls("t", Vec2::new(1000.0, 1000.0), vec![wall()]);
        let p = resolve_circle_vs_walls(&world, Vec2::new(5.0, 995.0), 12.0);
        assert_eq!(p, Vec2::new(40.0, 960.0));
    }

    #[test]
    fn test_bullet_wall_hit() {
        let mut b = Bullet::new(1, Vec2::new(90.0, 130.0), Vec2::X);
        assert!(!bullet_hits_wall(&b, &[wall()]));
        b.pos = Vec2::new(110.0, 130.0);
        assert!(bullet_hits_wall(&b, &[wall()]));
        // Fully inside: no edge crossing, caught by containment
        b.pos = Vec2::new(150.0, 130.0);
        assert!(bullet_hits_wall(&b, &[wall()]));
    }

    #[test]
    fn test_bullet_capsule_hit() {
        let b = Bullet::new(1, Vec2::new(100.0, 0.0), Vec2::X);
        // Beside the middle of the segment, not near the head
        let near = Enemy::new(1, Vec2::new(88.0, ENEMY_RADIUS - 1.0), 0);
        assert!(bullet_hits_enemy(&b, &near));
        let far = Enemy::new(2, Vec2::new(88.0, ENEMY_RADIUS + 1.0), 0);
        assert!(!bullet_hits_enemy(&b, &far));
        // Past the head is measured from the head
        let ahead = Enemy::new(3, Vec2::new(100.0 + ENEMY_RADIUS + 0.5, 0.0), 0);
        assert!(!bullet_hits_enemy(&b, &ahead));
        assert_eq!(b.damage, BULLET_DAMAGE);
    }

    #[test]
    fn test_separate_enemies() {
        let mut enemies = vec![
            Enemy::new(1, Vec2::new(100.0, 100.0), 0),
            Enemy::new(2, Vec2::new(110.0, 100.0), 0),
        ];
        separate_enemies(&mut enemies);
        let gap = enemies[0].pos.distance(enemies[1].pos);
        assert!(
            (gap - (2.0 * ENEMY_RADIUS - ENEMY_SEPARATION_SLACK)).abs() < 1e-3
        );
        // Symmetric push
        assert!((enemies[0].pos.x - 95.0).abs() < 1e-3);
    }

    #[test]
    fn test_dying_enemies_not_separated() {
        let mut enemies = vec![
            Enemy::new(1, Vec2::new(100.0, 100.0), 0),
            Enemy::new(2, Vec2::new(105.0, 100.0), 0),
        ];
        enemies[1].kill();
        separate_enemies(&mut enemies);
        assert_eq!(enemies[0].pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_melee_contact_push() {
        let player = Vec2::new(200.0, 200.0);
        let mut enemies = vec![
            Enemy::new(1, Vec2::new(216.0, 200.0), 0),
            Enemy::new(2, Vec2::new(400.0, 200.0), 0),
        ];
        assert!(resolve_melee_contact(player, &mut enemies));
        // Reach 26, overlap 10, pushed 6 away
        assert!((enemies[0].pos.x - 222.0).abs() < 1e-3);
        assert_eq!(enemies[1].pos.x, 400.0);

        enemies.truncate(1);
        enemies[0].pos = Vec2::new(300.0, 300.0);
        assert!(!resolve_melee_contact(player, &mut enemies));
    }

    proptest! {
        #[test]
        fn prop_wall_resolution_idempotent(x in 0.0f32..1000.0, y in 0.0f32..1000.0) {
            let world = World::generate_sized("PROP", Vec2::new(1000.0, 1000.0));
            let once = resolve_circle_vs_walls(&world, Vec2::new(x, y), 12.0);
            let clear = !world.walls().iter().any(|w| circle_rect_overlap(once, 12.0, w));
            if clear {
                let twice = resolve_circle_vs_walls(&world, once, 12.0);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
