//! Session module - owns the grid and active piece and runs one frame at a time
//!
//! Each call to [`GameSession::step`] performs, in order:
//!
//! 1. lift the active piece's footprint off the grid
//! 2. apply the frame's commands (each validated against the grid)
//! 3. advance gravity and lock timers
//! 4. on lock: commit, sweep full lines, spawn the next piece
//! 5. recompute the shadow
//! 6. commit the active footprint back for rendering and readback
//!
//! Between frames the grid always contains the active piece's cells.

use crate::config::{ConfigError, GameConfig};
use crate::grid::Grid;
use crate::piece::{ActivePiece, LockEvent, PiecePhase, SpawnBlocked};
use crate::rng::PieceSource;
use crate::rotation::RotationSystem;
use crate::shadow::{self, ShadowPiece};
use crate::snapshot::{ActiveSnapshot, GameSnapshot, TaggedCell};
use crate::types::{GameCommand, MoveDirection, PieceKind, Pos, RotationDirection};

/// The commands of one frame, collapsed so each applies at most once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandSet {
    pub move_left: bool,
    pub move_right: bool,
    pub soft_drop: bool,
    pub hard_drop: bool,
    pub rotate_cw: bool,
    pub rotate_ccw: bool,
}

impl CommandSet {
    pub fn from_commands(commands: &[GameCommand]) -> Self {
        let mut set = Self::default();
        for command in commands {
            match command {
                GameCommand::MoveLeft => set.move_left = true,
                GameCommand::MoveRight => set.move_right = true,
                GameCommand::SoftDrop => set.soft_drop = true,
                GameCommand::HardDrop => set.hard_drop = true,
                GameCommand::RotateCw => set.rotate_cw = true,
                GameCommand::RotateCcw => set.rotate_ccw = true,
            }
        }
        set
    }

    /// Rotation to apply; counter-clockwise wins when both are queued
    pub fn rotation(&self) -> Option<RotationDirection> {
        if self.rotate_ccw {
            Some(RotationDirection::Ccw)
        } else if self.rotate_cw {
            Some(RotationDirection::Cw)
        } else {
            None
        }
    }

    /// Horizontal move to apply; left wins when both are queued
    pub fn horizontal(&self) -> Option<MoveDirection> {
        if self.move_left {
            Some(MoveDirection::Left)
        } else if self.move_right {
            Some(MoveDirection::Right)
        } else {
            None
        }
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub rotated: bool,
    pub moved: bool,
    /// Rows descended by soft drop, hard drop or gravity
    pub rows_dropped: u32,
    pub locked: Option<LockEvent>,
    /// Set when the frame spawned the next piece successfully
    pub spawned: Option<PieceKind>,
    /// Set when the session is (or just became) game over
    pub game_over: bool,
}

/// Gameplay core: one grid, one active piece, one piece source
#[derive(Debug)]
pub struct GameSession<S: PieceSource> {
    config: GameConfig,
    rotation: RotationSystem,
    grid: Grid,
    active: Option<ActivePiece>,
    shadow: Option<ShadowPiece>,
    source: S,
    blocked: Option<SpawnBlocked>,
    last_event: Option<LockEvent>,
    pieces_locked: u32,
    started: bool,
}

impl<S: PieceSource> GameSession<S> {
    /// Validate `config` and build an empty session
    ///
    /// No piece is spawned until [`GameSession::start`].
    pub fn new(config: &GameConfig, source: S) -> Result<Self, ConfigError> {
        let rotation = RotationSystem::from_config(config)?;
        Ok(Self {
            config: config.clone(),
            rotation,
            grid: Grid::new(config.board.width, config.board.height),
            active: None,
            shadow: None,
            source,
            blocked: None,
            last_event: None,
            pieces_locked: 0,
            started: false,
        })
    }

    /// Spawn the first piece
    pub fn start(&mut self) -> Result<(), SpawnBlocked> {
        if self.started {
            return match self.blocked {
                Some(blocked) => Err(blocked),
                None => Ok(()),
            };
        }
        self.started = true;
        let kind = self.source.next_kind();
        self.spawn(kind)
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The grid, including the active piece's footprint
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct grid access for setting up positions
    ///
    /// Intended for use before [`GameSession::start`] or after game over;
    /// writing over the active footprint breaks the no-overlap invariant.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn shadow(&self) -> Option<&ShadowPiece> {
        self.shadow.as_ref()
    }

    pub fn phase(&self) -> Option<PiecePhase> {
        self.active.map(|piece| piece.phase())
    }

    pub fn is_game_over(&self) -> bool {
        self.blocked.is_some()
    }

    /// The spawn failure that ended the game, if any
    pub fn game_over_cause(&self) -> Option<SpawnBlocked> {
        self.blocked
    }

    pub fn pieces_locked(&self) -> u32 {
        self.pieces_locked
    }

    /// Take and clear the last lock event
    pub fn take_last_event(&mut self) -> Option<LockEvent> {
        self.last_event.take()
    }

    /// Replace the active piece with `kind` at the configured spawn anchor
    pub fn spawn(&mut self, kind: PieceKind) -> Result<(), SpawnBlocked> {
        let anchor = self.config.spawn;
        self.spawn_at(kind, anchor)
    }

    /// Replace the active piece with `kind` at `anchor`
    ///
    /// The new piece is checked against the grid without the current piece's
    /// footprint. On failure the session is game over and the grid is left
    /// exactly as it was: the replaced piece's cells stay where they were and
    /// every later frame is a no-op until [`GameSession::reset`].
    pub fn spawn_at(&mut self, kind: PieceKind, anchor: Pos) -> Result<(), SpawnBlocked> {
        if let Some(blocked) = self.blocked {
            return Err(blocked);
        }
        self.started = true;
        let previous = self.active.take();
        if let Some(previous) = previous {
            self.grid.uncommit(&previous.offsets(), previous.anchor());
        }

        if let Err(blocked) = self.place_new(kind, anchor) {
            if let Some(previous) = previous {
                self.grid
                    .commit(&previous.offsets(), previous.anchor(), previous.kind());
            }
            return Err(blocked);
        }
        self.publish_active();
        Ok(())
    }

    /// Spawn onto the grid without committing the footprint
    fn place_new(&mut self, kind: PieceKind, anchor: Pos) -> Result<(), SpawnBlocked> {
        self.shadow = None;
        match ActivePiece::spawn(kind, anchor, &self.rotation, &self.grid) {
            Ok(piece) => {
                self.active = Some(piece);
                Ok(())
            }
            Err(blocked) => {
                self.active = None;
                self.blocked = Some(blocked);
                Err(blocked)
            }
        }
    }

    /// Recompute the shadow and commit the active footprint
    fn publish_active(&mut self) {
        let Some(piece) = self.active else {
            self.shadow = None;
            return;
        };
        self.shadow = Some(shadow::project(&mut self.grid, &piece));
        self.grid.commit(&piece.offsets(), piece.anchor(), piece.kind());
    }

    /// External reset: clear the grid, leave game over and spawn a fresh piece
    pub fn reset(&mut self) -> Result<(), SpawnBlocked> {
        self.grid.clear();
        self.active = None;
        self.shadow = None;
        self.blocked = None;
        self.last_event = None;
        self.pieces_locked = 0;
        self.started = true;
        let kind = self.source.next_kind();
        self.spawn(kind)
    }

    /// Run one frame
    pub fn step(&mut self, commands: &[GameCommand], elapsed_ms: u32) -> FrameReport {
        let mut report = FrameReport {
            game_over: self.is_game_over(),
            ..FrameReport::default()
        };
        if report.game_over {
            return report;
        }
        let Some(mut piece) = self.active.take() else {
            return report;
        };

        self.grid.uncommit(&piece.offsets(), piece.anchor());

        let set = CommandSet::from_commands(commands);
        if let Some(direction) = set.rotation() {
            report.rotated = piece.rotate(direction, &self.rotation, &self.grid);
        }
        if let Some(direction) = set.horizontal() {
            report.moved = piece.try_move(direction, &self.grid);
        }
        if set.soft_drop && piece.try_move(MoveDirection::Down, &self.grid) {
            report.rows_dropped += 1;
        }
        if set.hard_drop {
            report.rows_dropped += piece.hard_drop(&self.grid);
        }

        if !piece.is_locked() {
            let moved = piece.advance(
                elapsed_ms,
                self.config.step_interval_ms,
                self.config.lock_delay_ms,
                &self.grid,
            );
            if moved {
                report.rows_dropped += 1;
            }
        }

        if piece.is_locked() {
            let event = piece.lock(&mut self.grid);
            self.pieces_locked = self.pieces_locked.wrapping_add(1);
            self.last_event = Some(event);
            report.locked = Some(event);

            let kind = self.source.next_kind();
            let anchor = self.config.spawn;
            match self.place_new(kind, anchor) {
                Ok(()) => report.spawned = Some(kind),
                Err(_) => report.game_over = true,
            }
        } else {
            self.active = Some(piece);
        }

        self.publish_active();
        report
    }

    /// Fill `out` with the current frame's renderer view
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.clear();
        out.bounds = self.grid.bounds();
        out.occupied
            .extend(self.grid.occupied().map(|(pos, kind)| TaggedCell { pos, kind }));
        out.active = self.active.as_ref().map(ActiveSnapshot::from);
        out.shadow = self.shadow.map(|shadow| shadow.cells());
        out.game_over = self.is_game_over();
        out.pieces_locked = self.pieces_locked;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snapshot = GameSnapshot::default();
        self.snapshot_into(&mut snapshot);
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedSource;
    use crate::types::{LOCK_DELAY_MS, STEP_INTERVAL_MS, TICK_MS};

    fn session(kinds: &[PieceKind]) -> GameSession<ScriptedSource> {
        let mut session =
            GameSession::new(&GameConfig::default(), ScriptedSource::new(kinds.to_vec())).unwrap();
        session.start().unwrap();
        session
    }

    #[test]
    fn test_command_set_collapses_duplicates_and_orders() {
        let set = CommandSet::from_commands(&[
            GameCommand::MoveRight,
            GameCommand::RotateCw,
            GameCommand::MoveLeft,
            GameCommand::RotateCcw,
            GameCommand::MoveLeft,
        ]);
        assert_eq!(set.rotation(), Some(RotationDirection::Ccw));
        assert_eq!(set.horizontal(), Some(MoveDirection::Left));
        assert!(!set.soft_drop);
        assert!(!set.hard_drop);
    }

    #[test]
    fn test_start_commits_footprint_and_shadow() {
        let session = session(&[PieceKind::T]);
        let active = session.active().copied().unwrap();
        assert_eq!(active.kind(), PieceKind::T);
        assert_eq!(active.anchor(), GameConfig::default().spawn);
        for cell in active.cells() {
            assert_eq!(session.grid().get(cell), Some(Some(PieceKind::T)));
        }
        assert_eq!(session.grid().occupied_count(), 4);
        assert_eq!(session.shadow().unwrap().anchor.y, -10);
    }

    #[test]
    fn test_duplicate_moves_apply_once() {
        let mut session = session(&[PieceKind::T]);
        let x = session.active().unwrap().anchor().x;
        let report = session.step(&[GameCommand::MoveLeft, GameCommand::MoveLeft], TICK_MS);
        assert!(report.moved);
        assert_eq!(session.active().unwrap().anchor().x, x - 1);
    }

    #[test]
    fn test_gravity_after_step_interval() {
        let mut session = session(&[PieceKind::T]);
        let y = session.active().unwrap().anchor().y;

        let report = session.step(&[], STEP_INTERVAL_MS - 1);
        assert_eq!(report.rows_dropped, 0);
        let report = session.step(&[], 1);
        assert_eq!(report.rows_dropped, 1);
        assert_eq!(session.active().unwrap().anchor().y, y - 1);
    }

    #[test]
    fn test_grounded_piece_locks_after_delay() {
        let mut session = session(&[PieceKind::O, PieceKind::T]);
        // Soft drop to the floor
        while session.step(&[GameCommand::SoftDrop], 0).rows_dropped > 0 {}
        assert_eq!(session.phase(), Some(PiecePhase::Locking));

        let report = session.step(&[], LOCK_DELAY_MS);
        assert!(report.locked.is_none());

        let report = session.step(&[], STEP_INTERVAL_MS);
        let event = report.locked.unwrap();
        assert_eq!(event.kind, PieceKind::O);
        assert_eq!(report.spawned, Some(PieceKind::T));
        assert_eq!(session.pieces_locked(), 1);
    }

    #[test]
    fn test_hard_drop_discards_rest_of_frame() {
        let mut session = session(&[PieceKind::I, PieceKind::O]);
        let report = session.step(&[GameCommand::HardDrop], STEP_INTERVAL_MS * 3);
        assert!(report.locked.is_some());
        assert_eq!(report.spawned, Some(PieceKind::O));

        let fresh = session.active().copied().unwrap();
        assert_eq!(fresh.anchor(), GameConfig::default().spawn);
        assert_eq!(fresh.step_elapsed_ms(), 0);
        assert_eq!(session.take_last_event(), report.locked);
        assert_eq!(session.take_last_event(), None);
    }
}
