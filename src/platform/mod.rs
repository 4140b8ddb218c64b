//! Platform input layer
//!
//! Collects raw key/pointer/touch events between frames and hands the
//! simulation one [`TickInput`] per tick. Key names follow the DOM/winit
//! convention (`"w"`, `"ArrowUp"`, `"Escape"`, ...).

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::tick::TickInput;

/// Movement directions the game understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Up,
    Down,
    Left,
    Right,
}

impl MoveKey {
    /// WASD or arrow key name to a direction (case-insensitive letters)
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "ArrowUp" => Some(Self::Up),
            "ArrowDown" => Some(Self::Down),
            "ArrowLeft" => Some(Self::Left),
            "ArrowRight" => Some(Self::Right),
            _ => match name.to_ascii_lowercase().as_str() {
                "w" => Some(Self::Up),
                "s" => Some(Self::Down),
                "a" => Some(Self::Left),
                "d" => Some(Self::Right),
                _ => None,
            },
        }
    }
}

fn is_pause_key(name: &str) -> bool {
    matches!(name, "Escape" | "p" | "P")
}

/// Input accumulated since the last tick
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<MoveKey>,
    /// Last pointer position in canvas space
    pointer: Option<Vec2>,
    pointer_down: bool,
    /// Active touch, if any; overrides the mouse while present
    touch: Option<Vec2>,
    pause_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, name: &str) {
        if let Some(key) = MoveKey::from_key_name(name) {
            self.held.insert(key);
        } else if is_pause_key(name) {
            self.pause_requested = true;
        }
    }

    pub fn key_up(&mut self, name: &str) {
        if let Some(key) = MoveKey::from_key_name(name) {
            self.held.remove(&key);
        }
    }

    pub fn is_held(&self, key: MoveKey) -> bool {
        self.held.contains(&key)
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
    }

    pub fn pointer_button(&mut self, down: bool) {
        self.pointer_down = down;
    }

    /// Touch start/move: aims and fires at the touch point
    pub fn touch(&mut self, pos: Vec2) {
        self.touch = Some(pos);
    }

    pub fn touch_end(&mut self) {
        self.touch = None;
    }

    /// Window lost focus: drop everything held so the player stops
    pub fn blur(&mut self) {
        self.held.clear();
        self.pointer_down = false;
        self.touch = None;
    }

    /// Snapshot for one tick; the pause request is consumed
    pub fn to_tick_input(&mut self) -> TickInput {
        let pause = std::mem::take(&mut self.pause_requested);
        TickInput {
            up: self.is_held(MoveKey::Up),
            down: self.is_held(MoveKey::Down),
            left: self.is_held(MoveKey::Left),
            right: self.is_held(MoveKey::Right),
            pointer: self.touch.or(self.pointer),
            fire: self.pointer_down || self.touch.is_some(),
            pause,
        }
    }
}
