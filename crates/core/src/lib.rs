//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the gameplay core of a falling-block puzzle: grid
//! occupancy, piece movement and rotation with wall kicks, gravity and lock
//! delay, line clearing, and the landing shadow. It has **no dependencies**
//! on rendering, input devices or I/O:
//!
//! - **Deterministic**: a seeded piece source and integer timers make every run reproducible
//! - **Frame driven**: the caller supplies commands and elapsed time through one entry point
//! - **Fail fast**: configuration is validated once, at session construction
//!
//! # Module Structure
//!
//! - [`grid`]: bounded cell occupancy, commit/uncommit, cascading line clear
//! - [`rotation`]: quarter-turn transforms and wall-kick table lookup
//! - [`piece`]: the active piece and its Falling/Locking/Locked state machine
//! - [`shadow`]: hard-drop landing projection
//! - [`rng`]: seedable piece sources (uniform, 7-bag, scripted)
//! - [`session`]: the per-frame loop tying everything together
//! - [`config`]: static configuration and startup validation
//! - [`snapshot`]: renderer-facing frame export
//!
//! # Example
//!
//! ```
//! use blockfall_core::{GameConfig, GameSession, UniformSource};
//! use blockfall_types::{GameCommand, TICK_MS};
//!
//! let mut session = GameSession::new(&GameConfig::default(), UniformSource::new(12345)).unwrap();
//! session.start().unwrap();
//!
//! session.step(&[GameCommand::MoveRight, GameCommand::RotateCw], TICK_MS);
//! let report = session.step(&[GameCommand::HardDrop], TICK_MS);
//!
//! assert!(report.locked.is_some());
//! assert_eq!(session.pieces_locked(), 1);
//! ```
//!
//! # Timing
//!
//! Timers are integer milliseconds:
//! - **Gravity**: one row every `step_interval_ms` (1000ms by default)
//! - **Lock Delay**: a piece that cannot descend locks at the next gravity step once
//!   `lock_delay_ms` (500ms by default) have passed since its last downward move
//!
//! Call [`GameSession::step`](session::GameSession::step) every frame with the elapsed time.

pub mod config;
pub mod grid;
pub mod piece;
pub mod rng;
pub mod rotation;
pub mod session;
pub mod shadow;
pub mod snapshot;

pub use blockfall_types as types;

// Re-export commonly used types for convenience
pub use config::{ConfigError, GameConfig, PivotMode, ShapeConfig};
pub use grid::{Bounds, Grid};
pub use piece::{ActivePiece, LockEvent, PiecePhase, SpawnBlocked};
pub use rng::{BagSource, PieceSource, ScriptedSource, SimpleRng, UniformSource};
pub use rotation::RotationSystem;
pub use session::{CommandSet, FrameReport, GameSession};
pub use shadow::ShadowPiece;
pub use snapshot::{ActiveSnapshot, GameSnapshot, TaggedCell};
