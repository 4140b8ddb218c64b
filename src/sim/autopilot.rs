//! Demo/headless autopilot
//!
//! Plays the game through the same [`TickInput`] a human would produce:
//! walks the maze toward the nearest key (or the exit once it exists), stands
//! still on it with the light on it, and shoots the closest visible enemy.

use glam::Vec2;

use super::path::NavGrid;
use super::state::GameState;
use super::tick::TickInput;
use crate::consts::FOV_RADIUS;

/// Waypoints closer than this are considered reached
const WAYPOINT_REACHED: f32 = 10.0;
/// Enemies within this distance (and in sight) get shot at
const ENGAGE_RANGE: f32 = FOV_RADIUS * 0.95;
/// Head-on to the objective for this long before turning the light on it
const OBJECTIVE_FOCUS_RANGE: f32 = 120.0;
/// Axis deadzone when turning a direction into held keys
const KEY_DEADZONE: f32 = 0.35;

/// Stateful bot; caches the navigation grid for the current maze
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    nav: Option<NavGrid>,
    wall_count: usize,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    fn nav_for(&mut self, state: &GameState) -> &NavGrid {
        let walls = state.world.walls().len();
        if self.wall_count != walls || self.nav.is_none() {
            self.wall_count = walls;
            self.nav = Some(NavGrid::from_world(&state.world));
        }
        self.nav.get_or_insert_with(|| NavGrid::from_world(&state.world))
    }

    /// Where the bot wants to stand right now
    pub fn objective(state: &GameState) -> Option<Vec2> {
        let player = state.player.pos;
        if let Some(exit) = &state.exit {
            return Some(exit.rect.center());
        }
        state
            .keys
            .iter()
            .map(|k| k.pos)
            .min_by(|a, b| a.distance(player).total_cmp(&b.distance(player)))
    }

    /// Produce this tick's input
    pub fn input(&mut self, state: &GameState) -> TickInput {
        let player = state.player.pos;
        let objective = Self::objective(state);

        // Movement: follow the grid path, then home in and stop on the target
        let move_to = objective.and_then(|target| {
            let arrive = (state.tuning.key_capture_radius * 0.5).min(WAYPOINT_REACHED);
            if target.distance(player) < arrive {
                return None;
            }
            let nav = self.nav_for(state);
            let path = nav.find_path(player, target)?;
            let next = path
                .iter()
                .skip(1)
                .map(|&c| NavGrid::cell_center(c))
                .find(|c| c.distance(player) > WAYPOINT_REACHED);
            Some(next.filter(|_| path.len() > 2).unwrap_or(target))
        });
        let dir = move_to.map_or(Vec2::ZERO, |p| (p - player).normalize_or_zero());

        // Aim: nearest visible enemy in range, else the objective when close,
        // else straight ahead
        let threat = state
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .filter(|e| e.pos.distance(player) < ENGAGE_RANGE)
            .filter(|e| !state.world.segment_blocked(player, e.pos))
            .min_by(|a, b| a.pos.distance(player).total_cmp(&b.pos.distance(player)));

        let (aim_at, fire) = match (threat, objective) {
            (Some(enemy), _) => (enemy.pos, true),
            (None, Some(target)) if target.distance(player) < OBJECTIVE_FOCUS_RANGE => {
                (target, false)
            }
            _ if dir != Vec2::ZERO => (player + dir * 100.0, false),
            _ => (player + crate::heading(state.player.aim) * 100.0, false),
        };

        TickInput {
            up: dir.y < -KEY_DEADZONE,
            down: dir.y > KEY_DEADZONE,
            left: dir.x < -KEY_DEADZONE,
            right: dir.x > KEY_DEADZONE,
            pointer: Some(state.camera.world_to_screen(aim_at)),
            fire,
            pause: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Enemy, Key};
    use crate::sim::tick::tick;
    use crate::sim::world::World;
    use crate::tuning::Tuning;

    fn bare() -> GameState {
        GameState::empty(Tuning::default(), World::generate("SEMILLA"))
    }

    #[test]
    fn test_idle_without_objective() {
        let state = bare();
        let input = Autopilot::new().input(&state);
        assert_eq!(input.move_dir(), Vec2::ZERO);
        assert!(!input.fire);
    }

    #[test]
    fn test_shoots_visible_enemy() {
        let mut state = bare();
        let pos = state.player.pos + Vec2::new(0.0, 30.0);
        state.enemies.push(Enemy::new(1, pos, 0));
        let input = Autopilot::new().input(&state);
        assert!(input.fire);
        let aim = state.camera.screen_to_world(input.pointer.unwrap());
        assert!(aim.distance(pos) < 1e-3);
    }

    #[test]
    fn test_walks_to_and_collects_key() {
        let mut state = bare();
        state.player.invuln = f32::INFINITY;
        // A key two cells along the carved corridor from the start
        let nav = NavGrid::from_world(&state.world);
        let target = [(3, 1), (1, 3)]
            .into_iter()
            .find(|&c| {
                nav.find_path(state.player.pos, NavGrid::cell_center(c))
                    .is_some_and(|p| p.len() == 3)
            })
            .map(NavGrid::cell_center)
            .expect("start cell has a carved neighbour");
        let id = state.next_entity_id();
        state.keys.push(Key::new(id, target));

        let mut bot = Autopilot::new();
        for _ in 0..600 {
            let input = bot.input(&state);
            tick(&mut state, &input, 1.0 / 60.0);
            if state.player.keys == 1 {
                break;
            }
        }
        assert_eq!(state.player.keys, 1);
    }
}
