//! Read-only per-frame views for the render and HUD collaborators
//!
//! The simulation never draws. A renderer borrows a [`FrameView`] once per
//! frame; the HUD and persistence layers take an owned [`HudSnapshot`].

use glam::Vec2;
use serde::Serialize;

use crate::camera::Camera;
use crate::sim::geometry::Rect;
use crate::sim::light::Flashlight;
use crate::sim::state::{
    Bullet, Decal, Enemy, Exit, GameOverReason, GamePhase, GameState, Key, ObjectiveStage, Player,
};

/// Everything a renderer needs for one frame, borrowed from the state
#[derive(Debug)]
pub struct FrameView<'a> {
    pub walls: &'a [Rect],
    pub player: &'a Player,
    pub enemies: &'a [Enemy],
    pub bullets: &'a [Bullet],
    pub keys: &'a [Key],
    pub exit: Option<&'a Exit>,
    pub decals: &'a [Decal],
    pub camera: Camera,
    /// Cone polygon: player position followed by the clipped ray ends
    pub light_polygon: Vec<Vec2>,
    flashlight: Flashlight,
}

impl<'a> FrameView<'a> {
    pub fn new(state: &'a GameState) -> Self {
        let flashlight = state.flashlight();
        let walls = state.world.walls();
        Self {
            walls,
            player: &state.player,
            enemies: &state.enemies,
            bullets: &state.bullets,
            keys: &state.keys,
            exit: state.exit.as_ref(),
            decals: &state.decals,
            camera: state.camera,
            light_polygon: flashlight.polygon(walls),
            flashlight,
        }
    }

    pub fn is_lit(&self, p: Vec2) -> bool {
        self.flashlight.is_point_lit(self.walls, p)
    }

    /// Brightness in `[0, 1]` for shading entities and decals
    pub fn light_factor(&self, p: Vec2) -> f32 {
        self.flashlight.light_factor(self.walls, p)
    }

    /// Enemies a renderer should draw: lit, alive or still fading out
    pub fn visible_enemies(&self) -> impl Iterator<Item = &'a Enemy> + '_ {
        self.enemies
            .iter()
            .filter(move |e| !e.is_dead() && self.is_lit(e.pos))
    }
}

/// Format whole seconds as `MM:SS`
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// HUD/persistence numbers for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub score: u64,
    pub lives: u8,
    pub keys: u32,
    pub keys_needed: u32,
    pub remaining_seconds: f32,
    pub clock: String,
    pub threat_level: u32,
    pub threat_proximity: f32,
    pub enemies: usize,
    pub stage: ObjectiveStage,
    pub phase: &'static str,
    pub game_over_reason: Option<&'static str>,
    /// Exit capture progress in `[0, 1]`, once the exit exists
    pub exit_progress: Option<f32>,
}

impl HudSnapshot {
    pub fn from_state(state: &GameState) -> Self {
        let remaining = state.remaining_time();
        let (phase, reason) = match state.phase {
            GamePhase::Playing => ("playing", None),
            GamePhase::Paused => ("paused", None),
            GamePhase::GameOver { reason } => ("game_over", Some(reason)),
            GamePhase::Victory => ("victory", None),
        };
        Self {
            score: state.score,
            lives: state.player.lives,
            keys: state.player.keys,
            keys_needed: state.tuning.key_count,
            remaining_seconds: remaining,
            clock: format_clock(remaining),
            threat_level: state.difficulty.threat_level,
            threat_proximity: state.threat_proximity,
            enemies: state.alive_enemy_count(),
            stage: state.objective_stage(),
            phase,
            game_over_reason: reason.map(GameOverReason::message),
            exit_progress: state.exit.as_ref().map(|e| e.capture.fraction()),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, "game_over" | "victory")
    }
}
