//! Headless simulator (default binary).
//!
//! Drives the gameplay core for a fixed number of frames with a deterministic
//! built-in command script, then prints the final board. No terminal input and
//! no rendering beyond a plain-text dump.
//!
//! Environment:
//! - `BLOCKFALL_CONFIG`: path to a JSON configuration (defaults to the standard set)
//! - `BLOCKFALL_SEED`: piece source seed (default 1)
//! - `BLOCKFALL_FRAMES`: frames to simulate (default 3600)
//! - `BLOCKFALL_LOG_PATH`: append a JSON-lines event log to this file

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use serde::Serialize;

use blockfall::core::{BagSource, GameConfig, GameSession, LockEvent, PieceSource};
use blockfall::types::{GameCommand, PieceKind, Pos, TICK_MS};

#[derive(Debug, Clone, PartialEq, Eq)]
struct SimConfig {
    config_path: Option<String>,
    seed: u32,
    frames: u32,
    log_path: Option<String>,
}

impl SimConfig {
    fn from_env() -> Self {
        use std::env;

        let non_empty = |name: &str| {
            env::var(name)
                .ok()
                .map(|s| s.trim().to_string())
                .and_then(|s| if s.is_empty() { None } else { Some(s) })
        };

        let seed = env::var("BLOCKFALL_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);
        let frames = env::var("BLOCKFALL_FRAMES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        Self {
            config_path: non_empty("BLOCKFALL_CONFIG"),
            seed,
            frames,
            log_path: non_empty("BLOCKFALL_LOG_PATH"),
        }
    }

    fn load_game_config(&self) -> Result<GameConfig> {
        let Some(path) = &self.config_path else {
            return Ok(GameConfig::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path}"))?;
        GameConfig::from_json_str(&json).with_context(|| format!("loading config file {path}"))
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LogRecord {
    Lock {
        frame: u32,
        #[serde(flatten)]
        event: LockEvent,
    },
    GameOver {
        frame: u32,
        kind: PieceKind,
        anchor: Pos,
    },
    Reset {
        frame: u32,
        game: u32,
    },
}

/// JSON-lines event log; a no-op when no path is configured
struct EventLog {
    out: Option<BufWriter<File>>,
}

impl EventLog {
    fn open(path: Option<&str>) -> Result<Self> {
        let out = match path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening event log {path}"))?;
                Some(BufWriter::new(file))
            }
            None => None,
        };
        Ok(Self { out })
    }

    fn write(&mut self, record: &LogRecord) -> Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        serde_json::to_writer(&mut *out, record)?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(out) = self.out.as_mut() {
            out.flush()?;
        }
        Ok(())
    }
}

/// Scripted player: a few turns and sideways moves per piece, then a hard drop
#[derive(Debug, Default)]
struct ScriptPlayer {
    pending: VecDeque<GameCommand>,
    planned_for: Option<u32>,
}

impl ScriptPlayer {
    /// Commands for the current frame (at most one, every fourth frame)
    fn commands(&mut self, frame: u32, pieces_locked: u32) -> Vec<GameCommand> {
        if self.planned_for != Some(pieces_locked) {
            self.planned_for = Some(pieces_locked);
            self.plan(pieces_locked);
        }
        if frame % 4 != 0 {
            return Vec::new();
        }
        self.pending.pop_front().into_iter().collect()
    }

    fn plan(&mut self, piece: u32) {
        self.pending.clear();
        for _ in 0..piece % 4 {
            self.pending.push_back(GameCommand::RotateCw);
        }
        let shift = (piece % 9 * 7 % 9) as i32 - 4;
        let step = if shift < 0 {
            GameCommand::MoveLeft
        } else {
            GameCommand::MoveRight
        };
        for _ in 0..shift.unsigned_abs() {
            self.pending.push_back(step);
        }
        self.pending.push_back(GameCommand::HardDrop);
    }
}

fn run<S: PieceSource>(
    session: &mut GameSession<S>,
    sim: &SimConfig,
    log: &mut EventLog,
) -> Result<u32> {
    let mut player = ScriptPlayer::default();
    let mut games = 1;

    for frame in 0..sim.frames {
        let commands = player.commands(frame, session.pieces_locked());
        let report = session.step(&commands, TICK_MS);

        if let Some(event) = report.locked {
            log.write(&LogRecord::Lock { frame, event })?;
        }

        if report.game_over {
            if let Some(cause) = session.game_over_cause() {
                eprintln!("[blockfall] game {games} over at frame {frame}: {cause}");
                log.write(&LogRecord::GameOver {
                    frame,
                    kind: cause.kind,
                    anchor: cause.anchor,
                })?;
            }
            games += 1;
            log.write(&LogRecord::Reset { frame, game: games })?;
            if let Err(blocked) = session.reset() {
                anyhow::bail!("spawn blocked on an empty board: {blocked}");
            }
            player = ScriptPlayer::default();
        }
    }

    Ok(games)
}

fn main() -> Result<()> {
    let sim = SimConfig::from_env();
    let config = sim.load_game_config()?;
    let mut log = EventLog::open(sim.log_path.as_deref())?;

    let mut session = GameSession::new(&config, BagSource::new(sim.seed))
        .context("building game session")?;
    session
        .start()
        .context("spawning the first piece")?;

    let result = run(&mut session, &sim, &mut log);

    // Always try to flush what was logged.
    let flushed = log.flush();
    let games = result?;
    flushed?;

    let snapshot = session.snapshot();
    print!("{}", snapshot.to_ascii());
    println!(
        "frames={} seed={} games={} pieces_locked={} occupied={}",
        sim.frames,
        sim.seed,
        games,
        snapshot.pieces_locked,
        snapshot.occupied.len()
    );
    Ok(())
}
