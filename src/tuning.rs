//! Data-driven game balance
//!
//! Everything that paces a match (countdown, spawn pressure, escalation,
//! capture speeds, scoring) lives in [`Tuning`]. The default is the canonical
//! rule set; alternative balances can be loaded from JSON.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Failure while loading or validating configuration
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read or written
    Io(std::io::Error),
    /// Contents are not valid JSON for the expected shape
    Parse(serde_json::Error),
    /// A value is out of its allowed range
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config io error: {err}"),
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::Invalid { field, reason } => {
                write!(f, "invalid config field `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Match pacing and difficulty parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Maze seed string
    pub maze_seed: String,

    // === Countdown ===
    /// Base match length (seconds)
    pub max_game_time: f32,
    /// Added to the countdown once all keys are in
    pub keys_bonus_time: f32,

    // === Escalation ===
    /// Threat level rises every this many seconds
    pub escalation_interval: f32,
    pub initial_spawn_interval: f32,
    /// Spawn interval multiplier per escalation, and its floor
    pub escalation_spawn_ramp: f32,
    pub escalation_spawn_floor: f32,
    /// Enemy speed multiplier per escalation, and its ceiling
    pub escalation_scale_growth: f32,
    pub escalation_scale_ceiling: f32,
    pub escalation_burst: u32,

    // === Spawning ===
    pub max_enemies: u32,
    /// Largest batch per spawn cycle outside the final assault
    pub max_spawn_batch: u32,
    /// Threat levels per extra enemy in a batch
    pub threat_levels_per_batch_step: u32,
    pub opening_burst: u32,
    pub burst_min_dist: f32,
    pub burst_max_dist: f32,

    // === Keys ===
    pub key_count: u32,
    pub key_capture_radius: f32,
    /// Progress per second while standing still on a lit key
    pub key_capture_rate: f32,
    pub key_decay_rate: f32,
    pub key_moving_factor: f32,
    pub key_min_player_dist: f32,
    pub key_min_spacing: f32,
    pub key_spawn_ramp: f32,
    pub key_spawn_floor: f32,
    pub key_scale_growth: f32,
    pub key_scale_ceiling: f32,

    // === Exit and final assault ===
    pub exit_size: f32,
    pub exit_required: f32,
    pub exit_capture_rate: f32,
    pub exit_decay_rate: f32,
    pub exit_moving_factor: f32,
    pub final_spawn_interval: f32,
    pub final_max_enemies: u32,
    pub final_spawn_batch: u32,
    pub final_scale_growth: f32,
    pub final_scale_ceiling: f32,
    pub final_burst: u32,
    /// Spawn interval the siege relaxes toward once the player leaves the exit
    pub relax_spawn_interval: f32,
    pub relax_interval_rate: f32,
    pub relax_max_enemies_rate: f32,
    pub victory_delay: f32,

    // === Player pressure ===
    /// Below this speed the player counts as standing still for captures
    pub capture_still_speed: f32,
    pub contact_damage_period: f32,

    // === Scoring ===
    pub score_kill: u64,
    pub score_key: u64,
    pub score_per_second_left: u64,

    // === Alerts ===
    pub alert_cooldown: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            maze_seed: "SEMILLA".to_string(),

            max_game_time: 420.0,
            keys_bonus_time: 60.0,

            escalation_interval: 90.0,
            initial_spawn_interval: 2.5,
            escalation_spawn_ramp: 0.96,
            escalation_spawn_floor: 1.4,
            escalation_scale_growth: 1.05,
            escalation_scale_ceiling: 1.6,
            escalation_burst: 3,

            max_enemies: 60,
            max_spawn_batch: 3,
            threat_levels_per_batch_step: 4,
            opening_burst: 4,
            burst_min_dist: 650.0,
            burst_max_dist: 900.0,

            key_count: 3,
            key_capture_radius: 26.0,
            key_capture_rate: 0.9,
            key_decay_rate: 0.25,
            key_moving_factor: 0.4,
            key_min_player_dist: 600.0,
            key_min_spacing: 700.0,
            key_spawn_ramp: 0.9,
            key_spawn_floor: 1.0,
            key_scale_growth: 1.06,
            key_scale_ceiling: 1.7,

            exit_size: 64.0,
            exit_required: 1.0,
            exit_capture_rate: 0.11,
            exit_decay_rate: 0.10,
            exit_moving_factor: 0.45,
            final_spawn_interval: 0.6,
            final_max_enemies: 65,
            final_spawn_batch: 2,
            final_scale_growth: 1.05,
            final_scale_ceiling: 1.9,
            final_burst: 6,
            relax_spawn_interval: 0.75,
            relax_interval_rate: 2.5,
            relax_max_enemies_rate: 3.0,
            victory_delay: 0.9,

            capture_still_speed: 25.0,
            contact_damage_period: 0.85,

            score_kill: 10,
            score_key: 50,
            score_per_second_left: 5,

            alert_cooldown: 2.5,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON document (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive: [(&'static str, f32); 9] = [
            ("max_game_time", self.max_game_time),
            ("escalation_interval", self.escalation_interval),
            ("initial_spawn_interval", self.initial_spawn_interval),
            ("escalation_spawn_floor", self.escalation_spawn_floor),
            ("final_spawn_interval", self.final_spawn_interval),
            ("key_capture_radius", self.key_capture_radius),
            ("key_capture_rate", self.key_capture_rate),
            ("exit_capture_rate", self.exit_capture_rate),
            ("contact_damage_period", self.contact_damage_period),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(ConfigError::Invalid {
                field,
                reason: "must be greater than zero",
            });
        }
        if self.exit_required < 1.0 {
            return Err(ConfigError::Invalid {
                field: "exit_required",
                reason: "must be at least 1",
            });
        }
        if self.burst_max_dist < self.burst_min_dist {
            return Err(ConfigError::Invalid {
                field: "burst_max_dist",
                reason: "must not be below burst_min_dist",
            });
        }
        if self.maze_seed.is_empty() {
            return Err(ConfigError::Invalid {
                field: "maze_seed",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    /// Load from `path`, falling back to defaults on any error
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path.display());
                tuning
            }
            Err(err) => {
                log::warn!("Using default tuning ({err})");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning =
            Tuning::from_json(r#"{ "max_game_time": 360.0, "keys_bonus_time": 0.0 }"#).unwrap();
        assert_eq!(tuning.max_game_time, 360.0);
        assert_eq!(tuning.keys_bonus_time, 0.0);
        assert_eq!(tuning.maze_seed, "SEMILLA");
        assert_eq!(tuning.max_enemies, 60);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let err = Tuning::from_json(r#"{ "exit_required": 0.5 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "exit_required", .. }));

        let err = Tuning::from_json(r#"{ "initial_spawn_interval": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "initial_spawn_interval", .. }));
    }

    #[test]
    fn test_parse_error() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tuning = Tuning::load_or_default(Path::new("/nonexistent/cripta47/tuning.json"));
        assert_eq!(tuning, Tuning::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let path =
            std::env::temp_dir().join(format!("cripta47-tuning-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "exit_required": 0.5 }"#).unwrap();
        assert!(Tuning::load(&path).is_err());
        assert_eq!(Tuning::load_or_default(&path), Tuning::default());
        std::fs::remove_file(&path).unwrap();
    }
}
