//! Best-effort audio driven by simulation events
//!
//! The simulation only queues [`GameEvent`]s; this module turns them into
//! sound requests for whatever [`AudioBackend`] the platform provides. A
//! missing or failing backend is logged and otherwise ignored.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Settings;
use crate::sim::events::GameEvent;

/// Ambient groans are rolled this often (seconds, uniform)
const AMBIENT_INTERVAL: (f32, f32) = (10.0, 24.0);
/// Chance that a due ambient roll actually plays
const AMBIENT_CHANCE: f32 = 0.6;
const AMBIENT_CLIPS: u8 = 2;

/// Threat proximity above which a close-range growl may play
const PROXIMITY_THRESHOLD: f32 = 0.78;
const PROXIMITY_COOLDOWN: f32 = 5.0;
/// Chance a growl is skipped even when allowed
const PROXIMITY_SKIP_CHANCE: f32 = 0.55;
const PROXIMITY_CLIPS: u8 = 3;

/// One-shot sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Shot,
    KeyPickup,
    EnemyDeath,
    PlayerHit,
    /// The exit door appears
    DoorSpawn,
    ExitOpen,
    Victory,
    Defeat,
    /// Distant horde, cosmetic
    AmbientGroan(u8),
    /// An enemy right next to the player
    ProximityGrowl(u8),
}

impl SoundEffect {
    /// Map a simulation event to its sound, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::ShotFired => Some(Self::Shot),
            GameEvent::EnemyKilled => Some(Self::EnemyDeath),
            GameEvent::PlayerDamaged { .. } => Some(Self::PlayerHit),
            GameEvent::KeyCollected { .. } => Some(Self::KeyPickup),
            GameEvent::ExitSpawned => Some(Self::DoorSpawn),
            GameEvent::ExitOpened => Some(Self::ExitOpen),
            GameEvent::Victory => Some(Self::Victory),
            GameEvent::Defeat { .. } => Some(Self::Defeat),
            GameEvent::ThreatProximity(_) | GameEvent::Alert(_) => None,
        }
    }

    /// Mix level before master/sfx volume
    pub fn base_volume(self) -> f32 {
        match self {
            Self::Shot => 0.5,
            Self::EnemyDeath => 0.6,
            Self::PlayerHit => 0.8,
            Self::KeyPickup | Self::DoorSpawn => 0.85,
            Self::ExitOpen | Self::Victory | Self::Defeat => 1.0,
            Self::AmbientGroan(_) => 0.45,
            Self::ProximityGrowl(_) => 0.8,
        }
    }

    /// Does this sound end the in-game music loop?
    fn stops_music(self) -> bool {
        matches!(self, Self::ExitOpen | Self::Victory | Self::Defeat)
    }
}

/// Looping background tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicTrack {
    Menu,
    Game,
}

impl MusicTrack {
    fn volume(self) -> f32 {
        match self {
            Self::Menu => 0.85,
            Self::Game => 0.32,
        }
    }
}

/// Why a backend could not play something
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// No output device or context
    Unavailable,
    /// Clip not loaded (yet)
    MissingClip(&'static str),
    Backend(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "audio unavailable"),
            Self::MissingClip(name) => write!(f, "clip '{name}' not loaded"),
            Self::Backend(msg) => write!(f, "audio backend error: {msg}"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Platform sound output
pub trait AudioBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError>;

    /// Start `track` (replacing any current loop), or stop with `None`
    fn set_music(&mut self, track: Option<MusicTrack>, volume: f32) -> Result<(), AudioError>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl AudioBackend for NullBackend {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }

    fn set_music(&mut self, _track: Option<MusicTrack>, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Logs requests instead of playing them (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogBackend;

impl AudioBackend for LogBackend {
    fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
        log::trace!("sfx {effect:?} @ {volume:.2}");
        Ok(())
    }

    fn set_music(&mut self, track: Option<MusicTrack>, volume: f32) -> Result<(), AudioError> {
        log::trace!("music {track:?} @ {volume:.2}");
        Ok(())
    }
}

/// Volume/mute state plus the cosmetic ambient schedulers
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
    /// Seconds of audio time, advanced by [`update`](Self::update)
    clock: f32,
    next_ambient: f32,
    last_growl: Option<f32>,
    threat: f32,
    music: Option<MusicTrack>,
    rng: Pcg32,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B) -> Self {
        Self::with_rng(backend, Pcg32::from_rng(&mut rand::rng()))
    }

    /// Manager with a fixed cosmetic stream (tests, replays)
    pub fn with_seed(backend: B, seed: u64) -> Self {
        Self::with_rng(backend, Pcg32::seed_from_u64(seed))
    }

    fn with_rng(backend: B, rng: Pcg32) -> Self {
        Self {
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            clock: 0.0,
            next_ambient: 0.0,
            last_growl: None,
            threat: 0.0,
            music: None,
            rng,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Last reported threat proximity in `[0, 1]`
    pub fn threat(&self) -> f32 {
        self.threat
    }

    pub fn music(&self) -> Option<MusicTrack> {
        self.music
    }

    /// Seconds until the next ambient roll
    pub fn time_to_next_ambient(&self) -> f32 {
        (self.next_ambient - self.clock).max(0.0)
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play one effect; failures are logged and dropped
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.base_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(err) = self.backend.play(effect, vol) {
            log::debug!("Skipped {effect:?}: {err}");
        }
    }

    pub fn set_music(&mut self, track: Option<MusicTrack>) {
        if self.music == track {
            return;
        }
        self.music = track;
        let vol = track.map_or(0.0, |t| t.volume() * self.master_volume);
        if let Err(err) = self.backend.set_music(track, vol) {
            log::debug!("Music change to {track:?} failed: {err}");
        }
    }

    /// A fresh match: game loop on, schedulers rewound
    pub fn start_match(&mut self) {
        self.clock = 0.0;
        self.next_ambient = 0.0;
        self.last_growl = None;
        self.threat = 0.0;
        self.set_music(Some(MusicTrack::Game));
    }

    /// React to one simulation event
    pub fn handle_event(&mut self, event: &GameEvent) {
        if let GameEvent::ThreatProximity(level) = *event {
            self.threat = level.clamp(0.0, 1.0);
            self.maybe_growl();
            return;
        }
        let Some(effect) = SoundEffect::for_event(event) else {
            return;
        };
        if effect.stops_music() {
            self.set_music(None);
        }
        self.play(effect);
    }

    pub fn handle_events<'a>(&mut self, events: impl IntoIterator<Item = &'a GameEvent>) {
        for event in events {
            self.handle_event(event);
        }
    }

    fn maybe_growl(&mut self) {
        if self.threat < PROXIMITY_THRESHOLD {
            return;
        }
        if self
            .last_growl
            .is_some_and(|t| self.clock - t < PROXIMITY_COOLDOWN)
        {
            return;
        }
        if self.rng.random::<f32>() < PROXIMITY_SKIP_CHANCE {
            return;
        }
        let clip = self.rng.random_range(0..PROXIMITY_CLIPS);
        self.play(SoundEffect::ProximityGrowl(clip));
        self.last_growl = Some(self.clock);
    }

    /// Advance the audio clock and roll the ambient groan when due
    pub fn update(&mut self, dt: f32) {
        self.clock += dt.max(0.0);
        if self.clock < self.next_ambient {
            return;
        }
        if self.rng.random::<f32>() < AMBIENT_CHANCE {
            let clip = self.rng.random_range(0..AMBIENT_CLIPS);
            self.play(SoundEffect::AmbientGroan(clip));
        }
        let (lo, hi) = AMBIENT_INTERVAL;
        self.next_ambient = self.clock + self.rng.random_range(lo..hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GameOverReason;

    #[derive(Default)]
    struct Recorder {
        played: Vec<(SoundEffect, f32)>,
        music: Vec<Option<MusicTrack>>,
        fail: bool,
    }

    impl AudioBackend for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::MissingClip("keys"));
            }
            self.played.push((effect, volume));
            Ok(())
        }

        fn set_music(&mut self, track: Option<MusicTrack>, _volume: f32) -> Result<(), AudioError> {
            if self.fail {
                return Err(AudioError::Unavailable);
            }
            self.music.push(track);
            Ok(())
        }
    }

    fn manager() -> AudioManager<Recorder> {
        AudioManager::with_seed(Recorder::default(), 47)
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ShotFired),
            Some(SoundEffect::Shot),
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::KeyCollected { total: 2 }),
            Some(SoundEffect::KeyPickup)
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::ThreatProximity(0.5)),
            None,
        );
    }

    #[test]
    fn test_volume_and_mute() {
        let mut audio = manager();
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Victory);
        assert_eq!(audio.backend().played, vec![(SoundEffect::Victory, 0.5)]);

        audio.set_muted(true);
        audio.play(SoundEffect::Victory);
        assert_eq!(audio.backend().played.len(), 1);
    }

    #[test]
    fn test_match_end_stops_game_loop() {
        let mut audio = manager();
        audio.start_match();
        assert_eq!(audio.music(), Some(MusicTrack::Game));
        audio.handle_event(&GameEvent::Defeat {
            reason: GameOverReason::Defeated,
        });
        assert_eq!(audio.music(), None);
        assert_eq!(audio.backend().music, vec![Some(MusicTrack::Game), None]);
        assert_eq!(audio.backend().played[0].0, SoundEffect::Defeat);
    }

    #[test]
    fn test_backend_failure_is_swallowed() {
        let mut audio = AudioManager::with_seed(
            Recorder {
                fail: true,
                ..Default::default()
            },
            1,
        );
        audio.start_match();
        audio.handle_event(&GameEvent::ExitOpened);
        assert!(audio.backend().played.is_empty());
    }

    #[test]
    fn test_ambient_schedule() {
        let mut audio = manager();
        audio.update(0.016);
        let wait = audio.time_to_next_ambient();
        assert!((10.0..24.0).contains(&wait));

        for _ in 0..1000 {
            audio.update(1.0);
        }
        let groans = audio
            .backend()
            .played
            .iter()
            .filter(|(e, _)| matches!(e, SoundEffect::AmbientGroan(_)))
            .count();
        assert!(groans > 0);
        assert!(groans <= 101);
    }

    #[test]
    fn test_proximity_growl_threshold_and_cooldown() {
        let mut audio = manager();
        for _ in 0..600 {
            audio.handle_event(&GameEvent::ThreatProximity(0.5));
        }
        assert!(audio.backend().played.is_empty());

        // Ambient rolls are pushed out of the way first
        audio.next_ambient = f32::INFINITY;
        let mut growl_times = Vec::new();
        for i in 0..6000 {
            audio.update(1.0 / 60.0);
            let before = audio.backend().played.len();
            audio.handle_event(&GameEvent::ThreatProximity(0.9));
            if audio.backend().played.len() > before {
                growl_times.push(i as f32 / 60.0);
            }
        }
        assert!(!growl_times.is_empty());
        for pair in growl_times.windows(2) {
            assert!(pair[1] - pair[0] >= PROXIMITY_COOLDOWN - 0.05);
        }
        assert!((audio.threat() - 0.9).abs() < 1e-6);
    }
}
