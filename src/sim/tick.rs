//! Per-frame simulation step
//!
//! One call advances the match by `dt` seconds in a fixed order: time and
//! escalation, spawning, player, enemies, bullets, contact damage, keys and
//! the exit. Everything is single-threaded and steppable from tests.

use glam::Vec2;

use super::collision::{
    bullet_hits_enemy, bullet_hits_wall, resolve_circle_vs_walls, resolve_melee_contact,
    separate_enemies,
};
use super::events::{Alert, GameEvent};
use super::spawn;
use super::state::{Bullet, Exit, GameOverReason, GamePhase, GameState};
use crate::consts::{MAX_FRAME_DT, THREAT_AUDIO_RANGE};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Pointer position in canvas space, if known
    pub pointer: Option<Vec2>,
    /// Trigger held
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    /// Movement direction from the held keys (not normalized)
    pub fn move_dir(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.up {
            dir.y -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir
    }
}

/// Advance the game state by `dt` seconds (clamped to [`MAX_FRAME_DT`])
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    // Exit opened: everything holds still until the victory beat ends
    if let Some(timer) = state.victory_timer {
        let timer = timer - dt;
        if timer <= 0.0 {
            state.set_victory();
        } else {
            state.victory_timer = Some(timer);
        }
        return;
    }

    state.world.ensure_walls();

    state.game_time += dt;
    if state
        .difficulty
        .update_escalation(state.game_time, &state.tuning)
        .is_some()
    {
        state.raise_alert(Alert::HordeFaster);
        spawn::escalation_burst(state);
    }

    if state.remaining_time() <= 0.0 {
        state.set_game_over(GameOverReason::TimeExpired);
        return;
    }

    state.difficulty.spawn_timer += dt;
    if state.difficulty.spawn_timer >= state.difficulty.spawn_interval {
        spawn::handle_enemy_spawning(state);
    }

    update_player(state, input, dt);
    update_enemies(state, dt);
    update_bullets(state, dt);
    resolve_bullet_hits(state);
    state.enemies.retain(|e| !e.is_dead());

    update_threat(state);
    update_contact(state, dt);
    if state.phase.is_finished() {
        return;
    }

    update_keys(state, dt);
    update_exit(state, dt);
    state.normalize_order();
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    if let Some(pointer) = input.pointer {
        let target = state.camera.screen_to_world(pointer);
        state.player.aim_at(target);
    }

    state.player.apply_movement(input.move_dir(), dt);
    let radius = state.player.radius;
    state.player.pos = resolve_circle_vs_walls(&state.world, state.player.pos, radius);
    state.camera.update(state.player.pos, state.world.size());

    state.player.update_timers(dt);
    if state.player.try_fire(input.fire) {
        let id = state.next_entity_id();
        let dir = crate::heading(state.player.aim);
        state.bullets.push(Bullet::new(id, state.player.muzzle(), dir));
        state.push_event(GameEvent::ShotFired);
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let light = state.flashlight();
    let target = state.player.pos;
    let scale = state.difficulty.enemy_scale;
    let world = &state.world;

    for enemy in state.enemies.iter_mut() {
        let lit = light.is_point_lit(world.walls(), enemy.pos);
        enemy.update(dt, target, lit, scale);
        if enemy.is_alive() {
            enemy.pos = resolve_circle_vs_walls(world, enemy.pos, enemy.radius);
        }
    }

    separate_enemies(&mut state.enemies);
}

fn update_bullets(state: &mut GameState, dt: f32) {
    let walls = state.world.walls();
    for bullet in state.bullets.iter_mut() {
        bullet.update(dt);
        if bullet_hits_wall(bullet, walls) {
            bullet.expire();
        }
    }
    state.bullets.retain(|b| !b.is_expired());
}

/// Each lit, alive enemy takes at most one hit per tick, and each bullet
/// damages at most one enemy
fn resolve_bullet_hits(state: &mut GameState) {
    let light = state.flashlight();
    let walls = state.world.walls();
    let mut kills = 0u32;

    for enemy in state.enemies.iter_mut() {
        if !enemy.is_alive() || !light.is_point_lit(walls, enemy.pos) {
            continue;
        }
        let Some(bullet) = state
            .bullets
            .iter_mut()
            .find(|b| !b.is_expired() && bullet_hits_enemy(b, enemy))
        else {
            continue;
        };
        bullet.expire();
        if enemy.apply_damage(bullet.damage) {
            kills += 1;
        }
    }

    state.bullets.retain(|b| !b.is_expired());
    for _ in 0..kills {
        state.score += state.tuning.score_kill;
        state.push_event(GameEvent::EnemyKilled);
    }
}

fn update_threat(state: &mut GameState) {
    let player = state.player.pos;
    let nearest = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| e.pos.distance(player))
        .fold(f32::INFINITY, f32::min);
    state.threat_proximity = if nearest.is_finite() {
        (1.0 - nearest / THREAT_AUDIO_RANGE).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let level = state.threat_proximity;
    state.push_event(GameEvent::ThreatProximity(level));
}

fn update_contact(state: &mut GameState, dt: f32) {
    let touching = resolve_melee_contact(state.player.pos, &mut state.enemies);
    state.contact_timer = if touching { state.contact_timer + dt } else { 0.0 };

    let period = state.tuning.contact_damage_period;
    while state.contact_timer >= period {
        state.contact_timer -= period;
        state.damage_player(1);
        if state.phase.is_finished() {
            break;
        }
    }
}

fn capture_factor(state: &GameState, moving_factor: f32) -> f32 {
    if state.player.speed() < state.tuning.capture_still_speed {
        1.0
    } else {
        moving_factor
    }
}

fn update_keys(state: &mut GameState, dt: f32) {
    let light = state.flashlight();
    let player = state.player.pos;
    let factor = capture_factor(state, state.tuning.key_moving_factor);
    let tuning = &state.tuning;
    let walls = state.world.walls();

    let mut collected = 0;
    for key in state.keys.iter_mut() {
        let engaged = key.pos.distance(player) < tuning.key_capture_radius
            && light.is_point_lit(walls, key.pos);
        if key.capture.advance(
            engaged,
            factor,
            tuning.key_capture_rate,
            tuning.key_decay_rate,
            dt,
        ) {
            key.collected = true;
            collected += 1;
        }
    }
    state.keys.retain(|k| !k.collected);

    for _ in 0..collected {
        on_key_collected(state);
    }
}

fn on_key_collected(state: &mut GameState) {
    state.player.keys += 1;
    let total = state.player.keys;
    state.score += state.tuning.score_key;
    state.push_event(GameEvent::KeyCollected { total });
    log::info!("Key {}/{} collected", total, state.tuning.key_count);

    state.difficulty.tighten_for_key(&state.tuning);

    let needed = state.tuning.key_count;
    if total + 1 == needed {
        state.raise_alert(Alert::SecondKey);
    } else if total == 1 && needed > 1 {
        state.raise_alert(Alert::FirstKey);
    }
    spawn::key_burst(state);

    if total >= needed && state.difficulty.apply_keys_bonus(&state.tuning) {
        let exit = Exit::new(
            state.world.start_position(),
            state.tuning.exit_size,
            state.tuning.exit_required,
        );
        state.exit = Some(exit);
        state.push_event(GameEvent::ExitSpawned);
        log::info!("Exit spawned at the start position");
        state.raise_alert(Alert::AllKeys);
    }
}

fn update_exit(state: &mut GameState, dt: f32) {
    let light = state.flashlight();
    let player = state.player.pos;
    let factor = capture_factor(state, state.tuning.exit_moving_factor);
    let tuning = &state.tuning;
    let walls = state.world.walls();

    let Some(exit) = state.exit.as_mut() else {
        return;
    };
    if exit.opened {
        return;
    }

    let engaged = exit.rect.contains(player) && light.is_point_lit(walls, exit.rect.center());
    let opened = exit.capture.advance(
        engaged,
        factor,
        tuning.exit_capture_rate,
        tuning.exit_decay_rate,
        dt,
    );
    exit.opened = opened;
    let progress = exit.capture.progress;

    if engaged {
        let (entered, burst) = state.difficulty.press_final_assault(&state.tuning);
        if entered {
            state.raise_alert(Alert::FinalAssault);
        }
        if burst {
            spawn::final_assault_burst(state);
        }
        if opened {
            log::info!("Exit opened");
            state.push_event(GameEvent::ExitOpened);
            state.victory_timer = Some(state.tuning.victory_delay);
        }
    } else {
        state.difficulty.relax(dt, progress, &state.tuning);
    }
}
