//! Cripta-47 - A top-down survival-horror maze escape
//!
//! Core modules:
//! - `sim`: Simulation core (maze, light cone, collisions, horde, objectives)
//! - `camera`: Viewport tracking over the world
//! - `platform`: Input collaborator (held keys, pointer, trigger)
//! - `frame`: Read-only views handed to render/HUD collaborators
//! - `audio`: Best-effort sound dispatch driven by simulation events
//! - `tuning`: Data-driven game balance
//! - `settings` / `highscores`: Player preferences and best scores

pub mod audio;
pub mod camera;
pub mod frame;
pub mod highscores;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use camera::Camera;
pub use highscores::HighScores;
pub use settings::Settings;
pub use tuning::{ConfigError, Tuning};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use std::f32::consts::PI;

    /// Largest step a single tick may integrate (frames delayed longer are clamped)
    pub const MAX_FRAME_DT: f32 = 0.066;

    /// World and viewport dimensions
    pub const WORLD_WIDTH: f32 = 3200.0;
    pub const WORLD_HEIGHT: f32 = 2400.0;
    pub const VIEWPORT_WIDTH: f32 = 960.0;
    pub const VIEWPORT_HEIGHT: f32 = 540.0;

    /// Border wall thickness; also the clamp margin for every entity
    pub const WORLD_MARGIN: f32 = 40.0;
    /// Side of one maze grid cell
    pub const MAZE_CELL: f32 = 64.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 12.0;
    pub const PLAYER_SPEED: f32 = 200.0;
    /// Acceleration is `PLAYER_SPEED * PLAYER_ACCEL` toward the input direction
    pub const PLAYER_ACCEL: f32 = 6.0;
    pub const PLAYER_DAMPING: f32 = 6.0;
    /// Speed above which the body turns to face the movement direction
    pub const PLAYER_TURN_MIN_SPEED: f32 = 10.0;
    pub const PLAYER_TURN_RATE: f32 = 8.0;
    pub const PLAYER_LIVES: u8 = 3;
    /// Spawn protection at match start (seconds)
    pub const PLAYER_INVULN_TIME: f32 = 1.5;
    /// Extra reach added to an enemy radius for melee contact
    pub const PLAYER_CONTACT_REACH: f32 = 14.0;

    /// Flashlight cone
    pub const FOV_RADIUS: f32 = 220.0;
    pub const FOV_ANGLE: f32 = PI * 0.65;

    /// Bullets
    pub const BULLET_RATE: f32 = 8.0; // shots per second
    pub const BULLET_SPEED: f32 = 900.0;
    pub const BULLET_DAMAGE: i32 = 25;
    pub const BULLET_LIFE: f32 = 0.3;
    pub const BULLET_LENGTH: f32 = 24.0;
    pub const MUZZLE_OFFSET: f32 = 14.0;

    /// Enemies
    pub const ENEMY_SPEED_DARK: f32 = 55.0;
    pub const ENEMY_SPEED_LIGHT: f32 = 120.0;
    pub const ENEMY_HP: i32 = 60;
    pub const ENEMY_RADIUS: f32 = 12.0;
    pub const ENEMY_DYING_TIME: f32 = 1.2;
    pub const ENEMY_MIN_SPAWN_DIST: f32 = 600.0;
    /// Spawn positions must keep this distance from the world edges
    pub const ENEMY_SPAWN_PADDING: f32 = 60.0;
    pub const ENEMY_SPAWN_ATTEMPTS: u32 = 25;
    /// Tolerated overlap between two enemies before separation kicks in
    pub const ENEMY_SEPARATION_SLACK: f32 = 4.0;
    pub const ENEMY_VARIANTS: u8 = 5;

    /// Visibility polygon resolution
    pub const VISIBILITY_RAYS: usize = 96;
    /// Ray hits are pulled back by this much so the lit area never covers a wall
    pub const VISIBILITY_EPSILON: f32 = 1.5;
    pub const LIGHT_FALLOFF_EXP: f32 = 0.6;

    /// Distance at which the nearest enemy stops contributing to threat audio
    pub const THREAT_AUDIO_RANGE: f32 = 900.0;
}

/// Normalize an angle to (-π, π]
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Signed shortest difference `to - from`, in (-π, π]
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector for a heading angle
#[inline]
pub fn heading(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
