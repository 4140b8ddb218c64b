//! Discrete notifications from the simulation to its collaborators
//!
//! The tick pushes [`GameEvent`]s into a queue on the game state; audio and
//! HUD layers drain it once per frame. Nothing in the simulation reads the
//! queue back.

use std::collections::HashMap;

use serde::Serialize;

use super::state::GameOverReason;

/// On-screen objective and difficulty announcements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Alert {
    /// Match start
    Objective,
    /// Threat level went up
    HordeFaster,
    FirstKey,
    SecondKey,
    AllKeys,
    /// Player started opening the exit
    FinalAssault,
}

impl Alert {
    pub fn text(self) -> &'static str {
        match self {
            Self::Objective => "Collect the 3 keys to escape.",
            Self::HordeFaster => "WARNING! The horde is getting faster!",
            Self::FirstKey => "First key secured. The exit will appear at the starting point.",
            Self::SecondKey => "Key obtained. Only one more to go.",
            Self::AllKeys => {
                "All keys collected. The door awaits at the starting point. You have 1 extra minute to escape."
            }
            Self::FinalAssault => "The horde is rushing you while you open the door!",
        }
    }
}

/// Something the outside world may want to react to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GameEvent {
    ShotFired,
    EnemyKilled,
    PlayerDamaged { lives: u8 },
    KeyCollected { total: u32 },
    ExitSpawned,
    ExitOpened,
    Victory,
    Defeat { reason: GameOverReason },
    /// Closeness of the nearest enemy, 0 (none in range) to 1 (on top of you)
    ThreatProximity(f32),
    Alert(Alert),
}

/// Remembers when each alert was last raised, in simulation seconds
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    last_raised: HashMap<Alert, f32>,
}

impl AlertLog {
    /// Record `alert` at `now` unless it was raised less than `cooldown` ago
    ///
    /// Returns true when the alert should be shown.
    pub fn try_raise(&mut self, alert: Alert, now: f32, cooldown: f32) -> bool {
        if let Some(&last) = self.last_raised.get(&alert) {
            if now - last < cooldown {
                return false;
            }
        }
        self.last_raised.insert(alert, now);
        true
    }
}
