//! Cripta-47 headless runner
//!
//! Plays one match with the autopilot at a fixed 60 Hz step, logs what
//! happens and prints the final HUD snapshot as JSON.
//!
//! Usage:
//!   cripta47 [--tuning FILE] [--settings FILE] [--scores FILE] [--seconds N]
//!   RUST_LOG=debug cripta47 --seconds 120

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use cripta47::audio::{AudioManager, LogBackend};
use cripta47::frame::{FrameView, HudSnapshot};
use cripta47::highscores::{self, HighScoreEntry};
use cripta47::sim::{Autopilot, GameEvent, GamePhase, GameState, tick};
use cripta47::{HighScores, Settings, Tuning};

/// Fixed simulation step
const SIM_DT: f32 = 1.0 / 60.0;
/// HUD line cadence in the log, in ticks
const HUD_LOG_EVERY: u64 = 600;

#[derive(Parser)]
#[command(name = "cripta47")]
#[command(about = "Run a headless Cripta-47 match with the autopilot")]
struct Args {
    /// Tuning JSON (missing or invalid files fall back to the built-in rule set)
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// Settings JSON
    #[arg(long, default_value = "cripta47-settings.json")]
    settings: PathBuf,
    /// Leaderboard JSON
    #[arg(long, default_value = "cripta47-scores.json")]
    scores: PathBuf,
    /// Stop after this many simulated seconds even if the match goes on
    #[arg(long, default_value_t = 600.0)]
    seconds: f32,
}

/// A running match plus its collaborators
struct Game {
    state: GameState,
    pilot: Autopilot,
    audio: AudioManager<LogBackend>,
    settings: Settings,
    last_phase: GamePhase,
    ticks: u64,
    /// Wall clock at the previous HUD line, for the tick rate readout
    last_report: Instant,
}

impl Game {
    fn new(tuning: Tuning, settings: Settings) -> Self {
        let state = GameState::new(tuning);
        let mut audio = AudioManager::new(LogBackend);
        audio.apply_settings(&settings);
        audio.start_match();
        let last_phase = state.phase;
        Self {
            state,
            pilot: Autopilot::new(),
            audio,
            settings,
            last_phase,
            ticks: 0,
            last_report: Instant::now(),
        }
    }

    /// One fixed step: input, simulation, then event fan-out
    fn step(&mut self) {
        let input = self.pilot.input(&self.state);
        tick(&mut self.state, &input, SIM_DT);
        self.ticks += 1;

        let events = self.state.drain_events();
        for event in &events {
            match event {
                GameEvent::KeyCollected { total } => log::info!("Key {total} collected"),
                GameEvent::PlayerDamaged { lives } => {
                    log::info!("Player hit, {lives} lives left")
                }
                GameEvent::ExitSpawned => log::info!("Exit spawned"),
                GameEvent::ExitOpened => log::info!("Exit opened"),
                GameEvent::Alert(alert) if self.settings.show_alerts => {
                    log::info!("{}", alert.text())
                }
                _ => {}
            }
        }
        self.audio.handle_events(&events);
        self.audio.update(SIM_DT);

        if self.state.phase != self.last_phase {
            log::debug!("Phase {:?} -> {:?}", self.last_phase, self.state.phase);
            self.last_phase = self.state.phase;
        }

        if self.ticks % HUD_LOG_EVERY == 0 {
            self.log_hud();
        }
    }

    fn log_hud(&mut self) {
        let view = FrameView::new(&self.state);
        let lit = view.visible_enemies().count();
        let hud = HudSnapshot::from_state(&self.state);
        let mut line = format!(
            "{} | score {} | lives {} | keys {}/{} | threat {} | {} enemies ({} lit)",
            hud.clock,
            hud.score,
            hud.lives,
            hud.keys,
            hud.keys_needed,
            hud.threat_level,
            hud.enemies,
            lit
        );
        if self.settings.show_fps {
            let elapsed = self.last_report.elapsed().as_secs_f32();
            if elapsed > 0.0 {
                line.push_str(&format!(" | {:.0} tps", HUD_LOG_EVERY as f32 / elapsed));
            }
        }
        self.last_report = Instant::now();
        log::info!("{line}");
    }
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let settings = Settings::load_or_default(&args.settings);

    let mut game = Game::new(tuning, settings);
    let max_ticks = (args.seconds.max(0.0) / SIM_DT).ceil() as u64;
    while game.ticks < max_ticks && !game.state.phase.is_finished() {
        game.step();
    }

    let hud = HudSnapshot::from_state(&game.state);
    println!("{}", serde_json::to_string_pretty(&hud)?);

    if hud.is_finished() {
        let mut scores = HighScores::load_or_default(&args.scores);
        let entry = HighScoreEntry {
            score: hud.score,
            keys: hud.keys,
            victory: game.state.phase == GamePhase::Victory,
            timestamp: highscores::now_timestamp(),
        };
        if let Some(rank) = scores.add_score(entry) {
            log::info!("New high score #{rank}: {}", hud.score);
            scores
                .save(&args.scores)
                .with_context(|| format!("saving scores to {}", args.scores.display()))?;
        }
    } else {
        log::info!(
            "Stopped after {:.0}s with the match still running",
            args.seconds,
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Cripta-47 (headless) starting...");
    run()
}
