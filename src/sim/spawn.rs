//! Spawning: enemies, bursts, keys and cosmetic decals
//!
//! Every gameplay roll goes through the state's seeded stream so a match is
//! reproducible from its seed. Failed placements are skipped, never retried
//! without bound.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::events::Alert;
use super::state::{Decal, Enemy, GameState, Key};
use crate::consts::{
    ENEMY_MIN_SPAWN_DIST, ENEMY_SPAWN_ATTEMPTS, ENEMY_SPAWN_PADDING, ENEMY_VARIANTS, WORLD_MARGIN,
};
use crate::heading;

/// Clear points tried before key placement gives up
const KEY_PLACEMENT_ATTEMPTS: u32 = 500;
/// Floor decals scattered at match start
pub const DECAL_COUNT: usize = 80;
const DECAL_VARIANTS: u8 = 6;

/// Burst distance range used by escalations
const ESCALATION_BURST_RANGE: (f32, f32) = (700.0, 1100.0);
/// Burst distance range after a key
const KEY_BURST_RANGE: (f32, f32) = (650.0, 1000.0);
/// Burst distance range when the final assault begins
const FINAL_BURST_RANGE: (f32, f32) = (650.0, 950.0);
const KEY_BURST_MAX: u32 = 4;

/// Far from the player, unlit, inside the padded bounds and outside every wall
pub fn is_valid_enemy_spawn(state: &GameState, p: Vec2) -> bool {
    if p.distance(state.player.pos) < ENEMY_MIN_SPAWN_DIST {
        return false;
    }
    if !state.world.in_bounds(p, ENEMY_SPAWN_PADDING) {
        return false;
    }
    if state.world.point_in_wall(p) {
        return false;
    }
    !state.is_point_lit(p)
}

fn push_enemy(state: &mut GameState, pos: Vec2) {
    let variant = state.rng.random_range(0..ENEMY_VARIANTS);
    let id = state.next_entity_id();
    state.enemies.push(Enemy::new(id, pos, variant));
}

/// Try to place one enemy anywhere in the world
///
/// Returns false (and changes nothing) when the cap is reached or no valid
/// position turned up within [`ENEMY_SPAWN_ATTEMPTS`] tries.
pub fn spawn_enemy(state: &mut GameState) -> bool {
    if state.difficulty.capacity(state.enemies.len()) == 0 {
        return false;
    }
    let size = state.world.size();
    if size.x <= WORLD_MARGIN * 2.0 || size.y <= WORLD_MARGIN * 2.0 {
        return false;
    }

    for _ in 0..ENEMY_SPAWN_ATTEMPTS {
        let p = Vec2::new(
            state.rng.random_range(WORLD_MARGIN..size.x - WORLD_MARGIN),
            state.rng.random_range(WORLD_MARGIN..size.y - WORLD_MARGIN),
        );
        if is_valid_enemy_spawn(state, p) {
            push_enemy(state, p);
            return true;
        }
    }
    log::debug!("No valid enemy spawn after {ENEMY_SPAWN_ATTEMPTS} attempts");
    false
}

/// Spawn up to `count` enemies on a ring `min_dist..max_dist` around the player
///
/// Each slot gets [`ENEMY_SPAWN_ATTEMPTS`] tries. Returns how many spawned.
pub fn spawn_burst(state: &mut GameState, count: u32, min_dist: f32, max_dist: f32) -> u32 {
    let mut spawned = 0;
    for _ in 0..count {
        if state.difficulty.capacity(state.enemies.len()) == 0 {
            break;
        }
        for _ in 0..ENEMY_SPAWN_ATTEMPTS {
            let angle = state.rng.random::<f32>() * TAU;
            let dist = min_dist + state.rng.random::<f32>() * (max_dist - min_dist);
            let p = state.player.pos + heading(angle) * dist;
            if is_valid_enemy_spawn(state, p) {
                push_enemy(state, p);
                spawned += 1;
                break;
            }
        }
    }
    if spawned < count {
        log::debug!("Burst placed {spawned}/{count} enemies");
    }
    spawned
}

/// Spawn-timer expiry: reset the timer and spawn one batch
pub fn handle_enemy_spawning(state: &mut GameState) -> u32 {
    state.difficulty.spawn_timer = 0.0;
    let batch = (state.difficulty.batch_size(&state.tuning) as usize)
        .min(state.difficulty.capacity(state.enemies.len()));
    (0..batch).filter(|_| spawn_enemy(state)).count() as u32
}

/// Burst fired when the threat level rises
pub fn escalation_burst(state: &mut GameState) -> u32 {
    let (lo, hi) = ESCALATION_BURST_RANGE;
    spawn_burst(state, state.tuning.escalation_burst, lo, hi)
}

/// Reinforcements after a key, growing with the keys held
pub fn key_burst(state: &mut GameState) -> u32 {
    let (lo, hi) = KEY_BURST_RANGE;
    let count = (2 + state.player.keys).min(KEY_BURST_MAX);
    spawn_burst(state, count, lo, hi)
}

/// One-off burst as the final assault begins
pub fn final_assault_burst(state: &mut GameState) -> u32 {
    let (lo, hi) = FINAL_BURST_RANGE;
    spawn_burst(state, state.tuning.final_burst, lo, hi)
}

/// Place `count` keys at clear points away from the player and each other
///
/// May place fewer if the world is too cramped.
pub fn spawn_keys(state: &mut GameState, count: u32) -> usize {
    let min_player = state.tuning.key_min_player_dist;
    let min_spacing = state.tuning.key_min_spacing;
    let mut placed: Vec<Vec2> = Vec::new();

    for _ in 0..KEY_PLACEMENT_ATTEMPTS {
        if placed.len() >= count as usize {
            break;
        }
        let Some(p) = state.world.random_clear_point(&mut state.rng) else {
            break;
        };
        if p.distance(state.player.pos) < min_player {
            continue;
        }
        if placed.iter().any(|k| k.distance(p) < min_spacing) {
            continue;
        }
        placed.push(p);
    }

    if placed.len() < count as usize {
        log::warn!("Placed only {}/{} keys", placed.len(), count);
    }
    for p in &placed {
        let id = state.next_entity_id();
        state.keys.push(Key::new(id, *p));
    }
    placed.len()
}

/// Scatter cosmetic decals (not seeded; never affects gameplay)
pub fn scatter_decals(state: &mut GameState, count: usize) {
    let mut rng = rand::rng();
    state.decals.clear();
    for _ in 0..count {
        let Some(pos) = state.world.random_clear_point(&mut rng) else {
            break;
        };
        state.decals.push(Decal {
            pos,
            rotation: rng.random::<f32>() * TAU,
            variant: rng.random_range(0..DECAL_VARIANTS),
            alpha: 0.7 * (0.6 + rng.random::<f32>() * 0.4),
        });
    }
}

/// Match-start population: keys, decals, opening burst and objective alert
pub fn populate_match(state: &mut GameState) {
    let key_count = state.tuning.key_count;
    spawn_keys(state, key_count);
    scatter_decals(state, DECAL_COUNT);
    state.camera.update(state.player.pos, state.world.size());
    let opening = state.tuning.opening_burst;
    let (lo, hi) = (state.tuning.burst_min_dist, state.tuning.burst_max_dist);
    spawn_burst(state, opening, lo, hi);
    state.raise_alert(Alert::Objective);
}
