//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only for anything that affects the outcome
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod events;
pub mod geometry;
pub mod light;
pub mod maze;
pub mod path;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use autopilot::Autopilot;
pub use collision::{CollisionResult, resolve_circle_vs_walls};
pub use events::{Alert, GameEvent};
pub use geometry::Rect;
pub use light::{Flashlight, visibility_polygon};
pub use path::NavGrid;
pub use spawn::spawn_enemy;
pub use state::{
    Bullet, Capture, Decal, Difficulty, Enemy, EnemyState, Exit, GameOverReason, GamePhase,
    GameState, Key, ObjectiveStage, Player,
};
pub use tick::{TickInput, tick};
pub use world::World;
