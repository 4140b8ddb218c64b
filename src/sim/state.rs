//! Game state and core simulation types
//!
//! All mutable match state lives in [`GameState`], owned by the caller of
//! [`tick`](super::tick::tick). A new match is a new `GameState`; nothing is
//! carried over.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::{Alert, AlertLog, GameEvent};
use super::geometry::Rect;
use super::light::Flashlight;
use super::maze;
use super::world::World;
use crate::camera::Camera;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{angle_delta, heading};

/// Salt mixed into the maze seed for the gameplay stream, so spawn rolls do
/// not replay the carve sequence
const GAMEPLAY_STREAM_SALT: u64 = 0x5eed_0047;

/// Current phase of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    Paused,
    GameOver { reason: GameOverReason },
    /// Exit opened and the victory beat has played out
    Victory,
}

impl GamePhase {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::GameOver { .. } | Self::Victory)
    }
}

/// Why a match was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    /// Lives ran out
    Defeated,
    /// Countdown reached zero
    TimeExpired,
}

impl GameOverReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::Defeated => "Defeated",
            Self::TimeExpired => "Time expired",
        }
    }
}

/// Where the player stands on the road to the exit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjectiveStage {
    /// Fewer than all keys collected
    PreKeys,
    /// All keys in, exit spawned
    KeysComplete,
    /// Player is (or recently was) opening the exit
    FinalAssault,
    Victory,
}

/// The player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Body heading, eases toward the direction of travel
    pub heading: f32,
    /// Aim angle toward the pointer; the flashlight points here
    pub aim: f32,
    pub lives: u8,
    pub keys: u32,
    pub fire_cooldown: f32,
    pub invuln: f32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            heading: 0.0,
            aim: 0.0,
            lives: PLAYER_LIVES,
            keys: 0,
            fire_cooldown: 0.0,
            invuln: PLAYER_INVULN_TIME,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln > 0.0
    }

    /// Accelerate toward `input_dir` with damping, clamp to max speed and
    /// integrate
    ///
    /// `input_dir` need not be normalized; zero means "coast to a stop".
    pub fn apply_movement(&mut self, input_dir: Vec2, dt: f32) {
        let accel = input_dir.normalize_or_zero() * PLAYER_SPEED * PLAYER_ACCEL;
        self.vel += (accel - self.vel * PLAYER_DAMPING) * dt;
        self.vel = self.vel.clamp_length_max(PLAYER_SPEED);
        self.pos += self.vel * dt;

        if self.speed() > PLAYER_TURN_MIN_SPEED {
            let target = self.vel.y.atan2(self.vel.x);
            self.heading += angle_delta(self.heading, target) * (PLAYER_TURN_RATE * dt).min(1.0);
        }
    }

    /// Point the flashlight (and gun) at a world position
    pub fn aim_at(&mut self, target: Vec2) {
        let d = target - self.pos;
        if d.length_squared() > f32::EPSILON {
            self.aim = d.y.atan2(d.x);
        }
    }

    /// Count down the fire cooldown and invulnerability
    pub fn update_timers(&mut self, dt: f32) {
        self.fire_cooldown -= dt;
        if self.invuln > 0.0 {
            self.invuln = (self.invuln - dt).max(0.0);
        }
    }

    /// Returns true when a shot should be fired now (and restarts the cooldown)
    pub fn try_fire(&mut self, trigger: bool) -> bool {
        if trigger && self.fire_cooldown <= 0.0 {
            self.fire_cooldown = 1.0 / BULLET_RATE;
            return true;
        }
        false
    }

    /// Where bullets leave the gun
    pub fn muzzle(&self) -> Vec2 {
        self.pos + heading(self.aim) * MUZZLE_OFFSET
    }

    pub fn flashlight(&self) -> Flashlight {
        Flashlight::new(self.pos, self.aim)
    }

    /// Lose `amount` lives (floored at 0); returns the lives left
    pub fn damage(&mut self, amount: u8) -> u8 {
        self.lives = self.lives.saturating_sub(amount);
        self.lives
    }
}

/// Enemy lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Hunting the player; collides and can be hurt
    Alive,
    /// Fading out; ignored by movement and collision
    Dying { timer: f32 },
    /// Purged at the end of the tick
    Dead,
}

/// A pursuing enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    pub heading: f32,
    pub hp: i32,
    pub radius: f32,
    /// Cosmetic look, 0..ENEMY_VARIANTS
    pub variant: u8,
    state: EnemyState,
}

impl Enemy {
    pub fn new(id: u32, pos: Vec2, variant: u8) -> Self {
        Self {
            id,
            pos,
            heading: 0.0,
            hp: ENEMY_HP,
            radius: ENEMY_RADIUS,
            variant: variant % ENEMY_VARIANTS,
            state: EnemyState::Alive,
        }
    }

    #[inline]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    /// Remaining opacity: 1 while alive, fading to 0 while dying
    pub fn fade(&self) -> f32 {
        match self.state {
            EnemyState::Alive => 1.0,
            EnemyState::Dying { timer } => (timer / ENEMY_DYING_TIME).clamp(0.0, 1.0),
            EnemyState::Dead => 0.0,
        }
    }

    /// Alive → Dying; no-op in any other state
    pub fn kill(&mut self) {
        if self.state == EnemyState::Alive {
            self.state = EnemyState::Dying {
                timer: ENEMY_DYING_TIME,
            };
        }
    }

    /// Subtract hit points; returns true if this hit killed the enemy
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0 {
            self.kill();
            return true;
        }
        false
    }

    /// Seek `target` (alive) or run the fade timer (dying)
    pub fn update(&mut self, dt: f32, target: Vec2, lit: bool, speed_scale: f32) {
        match self.state {
            EnemyState::Alive => {
                let base = if lit { ENEMY_SPEED_LIGHT } else { ENEMY_SPEED_DARK };
                let dir = (target - self.pos).normalize_or_zero();
                let vel = dir * base * speed_scale;
                self.pos += vel * dt;
                if vel != Vec2::ZERO {
                    self.heading = vel.y.atan2(vel.x);
                }
            }
            EnemyState::Dying { timer } => {
                let timer = timer - dt;
                self.state = if timer <= 0.0 {
                    EnemyState::Dead
                } else {
                    EnemyState::Dying { timer }
                };
            }
            EnemyState::Dead => {}
        }
    }
}

/// A bullet: a short bright segment ending at `pos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    /// Head of the segment
    pub pos: Vec2,
    /// Unit direction
    pub dir: Vec2,
    pub speed: f32,
    pub damage: i32,
    /// Seconds left
    pub life: f32,
    pub length: f32,
}

impl Bullet {
    pub fn new(id: u32, pos: Vec2, dir: Vec2) -> Self {
        Self {
            id,
            pos,
            dir: dir.normalize_or_zero(),
            speed: BULLET_SPEED,
            damage: BULLET_DAMAGE,
            life: BULLET_LIFE,
            length: BULLET_LENGTH,
        }
    }

    /// Trailing end of the segment
    #[inline]
    pub fn tail(&self) -> Vec2 {
        self.pos - self.dir * self.length
    }

    pub fn update(&mut self, dt: f32) {
        self.pos += self.dir * self.speed * dt;
        self.life -= dt;
    }

    /// Mark for removal this tick
    #[inline]
    pub fn expire(&mut self) {
        self.life = 0.0;
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.life <= 0.0
    }
}

/// Hold-to-capture progress shared by keys and the exit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    pub progress: f32,
    /// Recomputed every tick
    pub capturing: bool,
    pub required: f32,
}

impl Capture {
    pub fn new(required: f32) -> Self {
        Self {
            progress: 0.0,
            capturing: false,
            required,
        }
    }

    /// Accrue (engaged) or decay (not engaged); returns true on completion
    pub fn advance(&mut self, engaged: bool, factor: f32, rate: f32, decay: f32, dt: f32) -> bool {
        self.capturing = engaged;
        if engaged {
            self.progress += rate * factor * dt;
            if self.progress >= self.required {
                self.progress = self.required;
                return true;
            }
        } else if self.progress > 0.0 {
            self.progress = (self.progress - decay * dt).max(0.0);
        }
        false
    }

    /// Progress as a fraction of `required`
    pub fn fraction(&self) -> f32 {
        (self.progress / self.required).clamp(0.0, 1.0)
    }
}

/// A key waiting to be captured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    pub id: u32,
    pub pos: Vec2,
    pub capture: Capture,
    pub collected: bool,
}

impl Key {
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            capture: Capture::new(1.0),
            collected: false,
        }
    }
}

/// The exit door, present once every key is in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exit {
    pub rect: Rect,
    pub capture: Capture,
    pub opened: bool,
}

impl Exit {
    pub fn new(center: Vec2, size: f32, required: f32) -> Self {
        Self {
            rect: Rect::centered(center, size),
            capture: Capture::new(required),
            opened: false,
        }
    }
}

/// Cosmetic floor decal (never affects gameplay)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Decal {
    pub pos: Vec2,
    pub rotation: f32,
    pub variant: u8,
    pub alpha: f32,
}

/// Difficulty counters, mutated only by the escalation rules below
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Difficulty {
    pub threat_level: u32,
    pub spawn_interval: f32,
    pub enemy_scale: f32,
    /// Fractional while relaxing out of the final assault
    pub max_enemies: f32,
    pub spawn_timer: f32,
    pub bonus_time: f32,
    pub final_assault: bool,
    escalation_step: u32,
    bonus_applied: bool,
    final_burst_done: bool,
}

impl Difficulty {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            threat_level: 1,
            spawn_interval: tuning.initial_spawn_interval,
            enemy_scale: 1.0,
            max_enemies: tuning.max_enemies as f32,
            spawn_timer: 0.0,
            bonus_time: 0.0,
            final_assault: false,
            escalation_step: 0,
            bonus_applied: false,
            final_burst_done: false,
        }
    }

    /// Step the threat level if `game_time` crossed an escalation boundary
    ///
    /// Returns the new threat level when an escalation past the first
    /// interval happened (the caller fires the burst and alert).
    pub fn update_escalation(&mut self, game_time: f32, tuning: &Tuning) -> Option<u32> {
        let step = (game_time / tuning.escalation_interval).floor().max(0.0) as u32;
        if step == self.escalation_step {
            return None;
        }
        self.escalation_step = step;
        self.threat_level = step + 1;
        self.spawn_interval =
            (self.spawn_interval * tuning.escalation_spawn_ramp).max(tuning.escalation_spawn_floor);
        self.enemy_scale = (self.enemy_scale * tuning.escalation_scale_growth)
            .min(tuning.escalation_scale_ceiling);
        log::info!(
            "Threat level {} (spawn every {:.2}s, enemy speed x{:.2})",
            self.threat_level,
            self.spawn_interval,
            self.enemy_scale
        );
        (step > 0).then_some(self.threat_level)
    }

    /// Enemies per spawn cycle before capacity limits
    pub fn batch_size(&self, tuning: &Tuning) -> u32 {
        if self.final_assault {
            tuning.final_spawn_batch
        } else {
            (1 + self.threat_level / tuning.threat_levels_per_batch_step.max(1))
                .min(tuning.max_spawn_batch)
        }
    }

    /// Room left under the enemy cap
    pub fn capacity(&self, active: usize) -> usize {
        (self.max_enemies.floor().max(0.0) as usize).saturating_sub(active)
    }

    /// Pressure bump after each key
    pub fn tighten_for_key(&mut self, tuning: &Tuning) {
        self.spawn_interval =
            (self.spawn_interval * tuning.key_spawn_ramp).max(tuning.key_spawn_floor);
        self.enemy_scale =
            (self.enemy_scale * tuning.key_scale_growth).min(tuning.key_scale_ceiling);
    }

    /// Add the all-keys bonus once; returns true the first time
    pub fn apply_keys_bonus(&mut self, tuning: &Tuning) -> bool {
        if self.bonus_applied {
            return false;
        }
        self.bonus_applied = true;
        self.bonus_time += tuning.keys_bonus_time;
        true
    }

    /// Siege pressure for one tick spent opening the exit
    ///
    /// Returns `(entered, first_burst)`: whether this tick started the final
    /// assault, and whether its one-off burst should be spawned now.
    pub fn press_final_assault(&mut self, tuning: &Tuning) -> (bool, bool) {
        let entered = !self.final_assault;
        self.final_assault = true;
        self.spawn_interval = tuning.final_spawn_interval;
        self.max_enemies = tuning.final_max_enemies as f32;
        self.enemy_scale =
            (self.enemy_scale * tuning.final_scale_growth).min(tuning.final_scale_ceiling);
        let burst = !self.final_burst_done;
        self.final_burst_done = true;
        (entered, burst)
    }

    /// Ease off the siege while the player is away from the exit
    pub fn relax(&mut self, dt: f32, exit_progress: f32, tuning: &Tuning) {
        if !self.final_assault {
            return;
        }
        self.spawn_interval += (tuning.relax_spawn_interval - self.spawn_interval)
            * (dt * tuning.relax_interval_rate).min(1.0);
        self.max_enemies += (tuning.max_enemies as f32 - self.max_enemies)
            * (dt * tuning.relax_max_enemies_rate).min(1.0);
        if exit_progress <= 0.01 {
            self.final_assault = false;
        }
    }

    /// Seconds left on the countdown
    pub fn remaining_time(&self, game_time: f32, tuning: &Tuning) -> f32 {
        (tuning.max_game_time + self.bonus_time - game_time).max(0.0)
    }
}

/// Complete match state
///
/// Events raised while ticking wait in an internal queue until
/// [`drain_events`](Self::drain_events) hands them to the frontend.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub world: World,
    pub phase: GamePhase,
    pub player: Player,
    /// Active enemies (sorted by id)
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    /// Keys not yet collected
    pub keys: Vec<Key>,
    pub exit: Option<Exit>,
    pub difficulty: Difficulty,
    pub camera: Camera,
    pub score: u64,
    /// Elapsed match seconds
    pub game_time: f32,
    /// Nearest-enemy closeness, recomputed every tick
    pub threat_proximity: f32,
    /// Counts down once the exit opens; the sim is frozen meanwhile
    pub victory_timer: Option<f32>,
    pub contact_timer: f32,
    pub decals: Vec<Decal>,
    /// Gameplay randomness (spawns, key placement)
    pub rng: Pcg32,
    alerts: AlertLog,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Start a match on the standard world for `tuning.maze_seed`
    pub fn new(tuning: Tuning) -> Self {
        let world = World::generate(&tuning.maze_seed);
        Self::with_world(tuning, world)
    }

    /// Start a match on an explicit world
    ///
    /// Places the player, keys, decals and opening burst, and raises the
    /// objective alert.
    pub fn with_world(tuning: Tuning, world: World) -> Self {
        let mut state = Self::empty(tuning, world);
        super::spawn::populate_match(&mut state);
        log::info!(
            "Match started: seed '{}', {} keys, {} enemies",
            state.world.seed(),
            state.keys.len(),
            state.enemies.len()
        );
        state
    }

    /// Player at the start cell and nothing else: no keys, enemies or alerts
    pub fn empty(tuning: Tuning, world: World) -> Self {
        let start = world.start_position();
        let rng = Pcg32::seed_from_u64(
            u64::from(maze::seed_hash(world.seed())) ^ GAMEPLAY_STREAM_SALT,
        );
        let viewport = Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT);
        let camera = Camera::follow(start, world.size(), viewport);
        let difficulty = Difficulty::new(&tuning);
        Self {
            tuning,
            world,
            phase: GamePhase::Playing,
            player: Player::new(start),
            enemies: Vec::new(),
            bullets: Vec::new(),
            keys: Vec::new(),
            exit: None,
            difficulty,
            camera,
            score: 0,
            game_time: 0.0,
            threat_proximity: 0.0,
            victory_timer: None,
            contact_timer: 0.0,
            decals: Vec::new(),
            rng,
            alerts: AlertLog::default(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Keep entity lists in id order for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.bullets.sort_by_key(|b| b.id);
        self.keys.sort_by_key(|k| k.id);
    }

    pub fn flashlight(&self) -> Flashlight {
        self.player.flashlight()
    }

    /// Is `p` inside the player's cone with a clear line of sight?
    pub fn is_point_lit(&self, p: Vec2) -> bool {
        self.flashlight().is_point_lit(self.world.walls(), p)
    }

    pub fn light_factor(&self, p: Vec2) -> f32 {
        self.flashlight().light_factor(self.world.walls(), p)
    }

    pub fn remaining_time(&self) -> f32 {
        self.difficulty.remaining_time(self.game_time, &self.tuning)
    }

    pub fn alive_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    pub fn objective_stage(&self) -> ObjectiveStage {
        match (&self.phase, &self.exit) {
            (GamePhase::Victory, _) => ObjectiveStage::Victory,
            (_, Some(exit)) if exit.opened => ObjectiveStage::Victory,
            (_, Some(_)) if self.difficulty.final_assault => ObjectiveStage::FinalAssault,
            (_, Some(_)) => ObjectiveStage::KeysComplete,
            (_, None) => ObjectiveStage::PreKeys,
        }
    }

    /// Queue an event for the collaborators
    ///
    /// `ThreatProximity` is a level, not an occurrence: a newer reading
    /// replaces the one still queued, so the queue only grows with real
    /// gameplay events between drains.
    pub fn push_event(&mut self, event: GameEvent) {
        if let GameEvent::ThreatProximity(_) = event {
            if let Some(slot) = self
                .events
                .iter_mut()
                .find(|e| matches!(e, GameEvent::ThreatProximity(_)))
            {
                *slot = event;
                return;
            }
        }
        self.events.push(event);
    }

    /// Raise `alert` unless it was shown within the cooldown
    pub fn raise_alert(&mut self, alert: Alert) {
        if self
            .alerts
            .try_raise(alert, self.game_time, self.tuning.alert_cooldown)
        {
            log::info!("Alert: {}", alert.text());
            self.events.push(GameEvent::Alert(alert));
        }
    }

    /// Take every event queued since the last drain
    ///
    /// Frontends call this once per frame; anything not drained piles up
    /// until the match ends.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Take one life (respecting invulnerability); ends the match at 0
    pub fn damage_player(&mut self, amount: u8) {
        if self.player.is_invulnerable() || self.phase.is_finished() {
            return;
        }
        let lives = self.player.damage(amount);
        self.events.push(GameEvent::PlayerDamaged { lives });
        if lives == 0 {
            self.set_game_over(GameOverReason::Defeated);
        }
    }

    pub fn set_game_over(&mut self, reason: GameOverReason) {
        if self.phase.is_finished() {
            return;
        }
        log::info!("Game over: {} (score {})", reason.message(), self.score);
        self.phase = GamePhase::GameOver { reason };
        self.victory_timer = None;
        self.events.push(GameEvent::Defeat { reason });
    }

    /// Award the time bonus and end the match as won
    pub fn set_victory(&mut self) {
        if self.phase.is_finished() {
            return;
        }
        let bonus = self.remaining_time().floor() as u64 * self.tuning.score_per_second_left;
        self.score += bonus;
        log::info!("Victory! Time bonus {}, final score {}", bonus, self.score);
        self.phase = GamePhase::Victory;
        self.victory_timer = None;
        self.events.push(GameEvent::Victory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_state() -> GameState {
        GameState::empty(Tuning::default(), World::generate("SEMILLA"))
    }

    #[test]
    fn test_player_accelerates_and_clamps() {
        let mut p = Player::new(Vec2::new(500.0, 500.0));
        for _ in 0..240 {
            p.apply_movement(Vec2::new(1.0, 1.0), 1.0 / 60.0);
        }
        assert!(p.speed() <= PLAYER_SPEED + 1e-3);
        assert!(p.speed() > PLAYER_SPEED * 0.9);
        // Heading eased toward the diagonal
        assert!((p.heading - std::f32::consts::FRAC_PI_4).abs() < 0.05);

        for _ in 0..240 {
            p.apply_movement(Vec2::ZERO, 1.0 / 60.0);
        }
        assert!(p.speed() < 1.0);
    }

    #[test]
    fn test_fire_rate() {
        let mut p = Player::new(Vec2::ZERO);
        let dt = 1.0 / 60.0;
        let shots = (0..60)
            .filter(|_| {
                p.update_timers(dt);
                p.try_fire(true)
            })
            .count();
        // 8 shots per second, give or take frame quantisation
        assert!((7..=9).contains(&shots), "shots = {shots}");
        p.update_timers(10.0);
        assert!(!p.try_fire(false));
        assert!(!p.is_invulnerable());
    }

    #[test]
    fn test_muzzle_ahead_of_aim() {
        let mut p = Player::new(Vec2::new(100.0, 100.0));
        p.aim_at(Vec2::new(100.0, 300.0));
        assert!(
            (p.muzzle() - Vec2::new(100.0, 100.0 + MUZZLE_OFFSET)).length() < 1e-4
        );
    }

    #[test]
    fn test_enemy_lifecycle() {
        let mut e = Enemy::new(1, Vec2::new(0.0, 0.0), 7);
        assert!(e.variant < ENEMY_VARIANTS);
        assert!(!e.apply_damage(BULLET_DAMAGE));
        assert!(!e.apply_damage(BULLET_DAMAGE));
        assert!(e.apply_damage(BULLET_DAMAGE));
        assert!(matches!(e.state(), EnemyState::Dying { .. }));
        // Damage after death is ignored
        assert!(!e.apply_damage(BULLET_DAMAGE));

        let pos = e.pos;
        e.update(0.6, Vec2::new(100.0, 0.0), true, 1.0);
        assert_eq!(e.pos, pos);
        assert!((e.fade() - 0.5).abs() < 1e-4);
        e.update(0.61, Vec2::new(100.0, 0.0), true, 1.0);
        assert!(e.is_dead());
    }

    #[test]
    fn test_enemy_speed_depends_on_light() {
        let mut dark = Enemy::new(1, Vec2::ZERO, 0);
        let mut lit = Enemy::new(2, Vec2::ZERO, 0);
        dark.update(1.0, Vec2::new(1000.0, 0.0), false, 1.0);
        lit.update(1.0, Vec2::new(1000.0, 0.0), true, 1.5);
        assert!((dark.pos.x - ENEMY_SPEED_DARK).abs() < 1e-3);
        assert!((lit.pos.x - ENEMY_SPEED_LIGHT * 1.5).abs() < 1e-3);
    }

    #[test]
    fn test_bullet_motion_and_tail() {
        let mut b = Bullet::new(1, Vec2::ZERO, Vec2::new(2.0, 0.0));
        assert_eq!(b.tail(), Vec2::new(-BULLET_LENGTH, 0.0));
        b.update(0.1);
        assert!((b.pos.x - BULLET_SPEED * 0.1).abs() < 1e-3);
        assert!(!b.is_expired());
        b.update(0.25);
        assert!(b.is_expired());
    }

    #[test]
    fn test_capture_accrues_and_decays() {
        let mut c = Capture::new(1.0);
        assert!(!c.advance(true, 1.0, 0.9, 0.25, 0.5));
        assert!(c.capturing);
        assert!((c.progress - 0.45).abs() < 1e-5);
        assert!(!c.advance(false, 1.0, 0.9, 0.25, 1.0));
        assert!(!c.capturing);
        assert!((c.progress - 0.2).abs() < 1e-5);
        assert!(!c.advance(false, 1.0, 0.9, 0.25, 10.0));
        assert_eq!(c.progress, 0.0);
        assert!(c.advance(true, 1.0, 0.9, 0.25, 2.0));
        assert_eq!(c.progress, 1.0);
    }

    #[test]
    fn test_escalation_steps() {
        let tuning = Tuning::default();
        let mut d = Difficulty::new(&tuning);
        assert_eq!(d.update_escalation(0.0, &tuning), None);
        assert_eq!(d.update_escalation(89.9, &tuning), None);
        assert_eq!(d.update_escalation(90.0, &tuning), Some(2));
        assert_eq!(d.update_escalation(120.0, &tuning), None);
        assert!((d.spawn_interval - 2.4).abs() < 1e-4);
        assert!((d.enemy_scale - 1.05).abs() < 1e-4);

        // Ramps stop at their bounds
        for i in 3..40 {
            d.update_escalation(90.0 * i as f32, &tuning);
        }
        assert_eq!(d.spawn_interval, tuning.escalation_spawn_floor);
        assert_eq!(d.enemy_scale, tuning.escalation_scale_ceiling);
        assert_eq!(d.batch_size(&tuning), tuning.max_spawn_batch);
    }

    #[test]
    fn test_final_assault_and_relax() {
        let tuning = Tuning::default();
        let mut d = Difficulty::new(&tuning);
        assert_eq!(d.press_final_assault(&tuning), (true, true));
        assert_eq!(d.press_final_assault(&tuning), (false, false));
        assert_eq!(d.spawn_interval, 0.6);
        assert_eq!(d.capacity(10), 55);
        assert_eq!(d.batch_size(&tuning), 2);

        d.relax(0.1, 0.5, &tuning);
        assert!(d.spawn_interval > 0.6 && d.spawn_interval < 0.75);
        assert!(d.max_enemies < 65.0);
        assert!(d.final_assault);
        d.relax(0.1, 0.0, &tuning);
        assert!(!d.final_assault);
    }

    #[test]
    fn test_keys_bonus_once() {
        let tuning = Tuning::default();
        let mut d = Difficulty::new(&tuning);
        assert!(d.apply_keys_bonus(&tuning));
        assert!(!d.apply_keys_bonus(&tuning));
        assert_eq!(d.bonus_time, 60.0);
        assert_eq!(d.remaining_time(0.0, &tuning), 480.0);
    }

    #[test]
    fn test_damage_respects_invulnerability() {
        let mut state = bare_state();
        state.damage_player(1);
        assert_eq!(state.player.lives, PLAYER_LIVES);

        state.player.invuln = 0.0;
        state.damage_player(1);
        state.damage_player(1);
        state.damage_player(1);
        assert_eq!(state.player.lives, 0);
        assert_eq!(
            state.phase,
            GamePhase::GameOver {
                reason: GameOverReason::Defeated
            }
        );
        // Further damage is ignored once the match is over
        state.damage_player(1);
        let defeats = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Defeat { .. }))
            .count();
        assert_eq!(defeats, 1);
    }

    #[test]
    fn test_victory_time_bonus() {
        let mut state = bare_state();
        state.game_time = 400.5;
        state.score = 100;
        state.set_victory();
        // 19.5 s left -> 19 whole seconds
        assert_eq!(state.score, 100 + 19 * 5);
        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(state.objective_stage(), ObjectiveStage::Victory);
    }

    #[test]
    fn test_threat_proximity_keeps_latest_reading() {
        let mut state = bare_state();
        state.push_event(GameEvent::ThreatProximity(0.2));
        state.push_event(GameEvent::ShotFired);
        state.push_event(GameEvent::ThreatProximity(0.7));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ThreatProximity(0.7), GameEvent::ShotFired]
        );
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_alert_dedup_uses_sim_time() {
        let mut state = bare_state();
        state.raise_alert(Alert::Objective);
        state.raise_alert(Alert::Objective);
        state.game_time = 3.0;
        state.raise_alert(Alert::Objective);
        let alerts = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::Alert(Alert::Objective)))
            .count();
        assert_eq!(alerts, 2);
    }

    #[test]
    fn test_entity_ids_increase() {
        let mut state = bare_state();
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }
}
