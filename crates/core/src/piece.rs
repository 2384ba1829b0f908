//! Piece module - the active piece and its lock-delay state machine
//!
//! A piece moves through three phases:
//!
//! - **Falling**: gravity advances normally
//! - **Locking**: a downward move just failed; the lock timer keeps running
//! - **Locked**: terminal; the session commits it, clears lines and spawns the next piece
//!
//! Every move and rotation is validated against the [`Grid`] before it is
//! applied, so a live piece never overlaps the stack or leaves the board. The
//! piece itself never writes to the grid except in [`ActivePiece::lock`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Grid;
use crate::rotation::{next_rotation, RotationSystem};
use crate::types::{MoveDirection, Offsets, PieceKind, Pos, RotationDirection, PIECE_CELLS};

/// Lock-delay phase of the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PiecePhase {
    Falling,
    Locking,
    Locked,
}

/// A freshly spawned piece collides at its spawn anchor (game over)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind:?} is blocked at spawn anchor ({}, {})", .anchor.x, .anchor.y)]
pub struct SpawnBlocked {
    pub kind: PieceKind,
    pub anchor: Pos,
}

/// Result of committing a locked piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEvent {
    pub kind: PieceKind,
    /// Absolute cells the piece occupied when it locked
    pub cells: [Pos; PIECE_CELLS],
    pub lines_cleared: usize,
}

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    kind: PieceKind,
    offsets: Offsets,
    anchor: Pos,
    rotation: u8,
    /// Time since the last gravity step
    step_elapsed_ms: u32,
    /// Time since the last successful downward move
    lock_elapsed_ms: u32,
    phase: PiecePhase,
}

impl ActivePiece {
    /// Spawn `kind` in rotation 0 at `anchor`
    ///
    /// Fails with [`SpawnBlocked`] when the rotation-0 footprint is out of
    /// bounds or overlaps the stack. Nothing is written to the grid.
    pub fn spawn(
        kind: PieceKind,
        anchor: Pos,
        rotation: &RotationSystem,
        grid: &Grid,
    ) -> Result<Self, SpawnBlocked> {
        let offsets = rotation.spawn_offsets(kind);
        if !grid.is_valid(&offsets, anchor) {
            return Err(SpawnBlocked { kind, anchor });
        }

        Ok(Self {
            kind,
            offsets,
            anchor,
            rotation: 0,
            step_elapsed_ms: 0,
            lock_elapsed_ms: 0,
            phase: PiecePhase::Falling,
        })
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn offsets(&self) -> Offsets {
        self.offsets
    }

    pub fn anchor(&self) -> Pos {
        self.anchor
    }

    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn phase(&self) -> PiecePhase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase == PiecePhase::Locked
    }

    pub fn lock_elapsed_ms(&self) -> u32 {
        self.lock_elapsed_ms
    }

    pub fn step_elapsed_ms(&self) -> u32 {
        self.step_elapsed_ms
    }

    /// Absolute cells of the piece
    pub fn cells(&self) -> [Pos; PIECE_CELLS] {
        self.offsets.map(|offset| offset + self.anchor)
    }

    /// Move one cell in `direction`
    ///
    /// A successful downward move restarts the lock timer and returns the
    /// piece to `Falling`; a failed one puts it in `Locking`.
    pub fn try_move(&mut self, direction: MoveDirection, grid: &Grid) -> bool {
        if self.is_locked() {
            return false;
        }

        let candidate = self.anchor + direction.offset();
        if !grid.is_valid(&self.offsets, candidate) {
            if direction == MoveDirection::Down {
                self.phase = PiecePhase::Locking;
            }
            return false;
        }

        self.anchor = candidate;
        if direction == MoveDirection::Down {
            self.lock_elapsed_ms = 0;
            self.phase = PiecePhase::Falling;
        }
        true
    }

    /// Gravity step: move down, locking if the piece has rested long enough
    pub fn step(&mut self, grid: &Grid, lock_delay_ms: u32) -> bool {
        let moved = self.try_move(MoveDirection::Down, grid);
        if !moved && self.lock_elapsed_ms >= lock_delay_ms {
            self.phase = PiecePhase::Locked;
        }
        moved
    }

    /// Drop to the lowest valid row and lock immediately
    ///
    /// Returns the number of rows dropped; bounded by the board height.
    pub fn hard_drop(&mut self, grid: &Grid) -> u32 {
        if self.is_locked() {
            return 0;
        }

        let mut rows = 0;
        while self.try_move(MoveDirection::Down, grid) {
            rows += 1;
        }
        self.phase = PiecePhase::Locked;
        rows
    }

    /// Turn one quarter in `direction`, trying wall kicks in order
    ///
    /// The turn is computed from the unchanged anchor; the first kick
    /// translation that yields a valid footprint wins. When none does, the
    /// piece is left exactly as it was.
    pub fn rotate(
        &mut self,
        direction: RotationDirection,
        rotation: &RotationSystem,
        grid: &Grid,
    ) -> bool {
        if self.is_locked() {
            return false;
        }

        let target = next_rotation(self.rotation, direction);
        let offsets = rotation.rotate(self.kind, &self.offsets, direction);

        let kicked = rotation
            .kicks(self.kind, target, direction)
            .iter()
            .map(|&kick| self.anchor + kick)
            .find(|&anchor| grid.is_valid(&offsets, anchor));

        match kicked {
            Some(anchor) => {
                self.rotation = target;
                self.offsets = offsets;
                self.anchor = anchor;
                true
            }
            None => false,
        }
    }

    /// Advance both timers by one frame and run gravity when it is due
    ///
    /// Returns true if a gravity step moved the piece.
    pub fn advance(
        &mut self,
        elapsed_ms: u32,
        step_interval_ms: u32,
        lock_delay_ms: u32,
        grid: &Grid,
    ) -> bool {
        if self.is_locked() {
            return false;
        }

        self.lock_elapsed_ms = self.lock_elapsed_ms.saturating_add(elapsed_ms);
        self.step_elapsed_ms = self.step_elapsed_ms.saturating_add(elapsed_ms);

        if self.step_elapsed_ms < step_interval_ms {
            return false;
        }
        self.step_elapsed_ms = 0;
        self.step(grid, lock_delay_ms)
    }

    /// Commit the piece to the grid and sweep full lines
    ///
    /// Consumes the piece; the caller spawns its replacement.
    pub fn lock(self, grid: &mut Grid) -> LockEvent {
        grid.commit(&self.offsets, self.anchor, self.kind);
        let lines_cleared = grid.clear_full_lines();
        LockEvent {
            kind: self.kind,
            cells: self.cells(),
            lines_cleared,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn setup() -> (RotationSystem, Grid) {
        let config = GameConfig::default();
        let rotation = RotationSystem::from_config(&config).unwrap();
        (rotation, Grid::new(10, 20))
    }

    #[test]
    fn test_spawn_resets_state() {
        let (rs, grid) = setup();
        let piece = ActivePiece::spawn(PieceKind::T, Pos::new(-1, 8), &rs, &grid).unwrap();
        assert_eq!(piece.rotation(), 0);
        assert_eq!(piece.offsets(), rs.spawn_offsets(PieceKind::T));
        assert_eq!(piece.step_elapsed_ms(), 0);
        assert_eq!(piece.lock_elapsed_ms(), 0);
        assert_eq!(piece.phase(), PiecePhase::Falling);
    }

    #[test]
    fn test_failed_down_enters_locking_and_success_returns_to_falling() {
        let (rs, grid) = setup();
        let mut piece = ActivePiece::spawn(PieceKind::O, Pos::new(0, -10), &rs, &grid).unwrap();
        assert!(!piece.try_move(MoveDirection::Down, &grid));
        assert_eq!(piece.phase(), PiecePhase::Locking);

        let mut piece = ActivePiece::spawn(PieceKind::O, Pos::new(0, 0), &rs, &grid).unwrap();
        piece.phase = PiecePhase::Locking;
        piece.lock_elapsed_ms = 300;
        assert!(piece.try_move(MoveDirection::Down, &grid));
        assert_eq!(piece.phase(), PiecePhase::Falling);
        assert_eq!(piece.lock_elapsed_ms(), 0);
    }

    #[test]
    fn test_lateral_move_keeps_lock_timer() {
        let (rs, grid) = setup();
        let mut piece = ActivePiece::spawn(PieceKind::T, Pos::new(0, 0), &rs, &grid).unwrap();
        piece.lock_elapsed_ms = 120;
        assert!(piece.try_move(MoveDirection::Left, &grid));
        assert_eq!(piece.lock_elapsed_ms(), 120);
    }

    #[test]
    fn test_step_locks_only_after_delay() {
        let (rs, grid) = setup();
        let mut piece = ActivePiece::spawn(PieceKind::O, Pos::new(0, -10), &rs, &grid).unwrap();

        piece.lock_elapsed_ms = 499;
        assert!(!piece.step(&grid, 500));
        assert_eq!(piece.phase(), PiecePhase::Locking);

        piece.lock_elapsed_ms = 500;
        assert!(!piece.step(&grid, 500));
        assert_eq!(piece.phase(), PiecePhase::Locked);
    }

    #[test]
    fn test_advance_runs_gravity_when_due() {
        let (rs, grid) = setup();
        let mut piece = ActivePiece::spawn(PieceKind::T, Pos::new(0, 5), &rs, &grid).unwrap();

        assert!(!piece.advance(999, 1000, 500, &grid));
        assert_eq!(piece.anchor(), Pos::new(0, 5));

        assert!(piece.advance(1, 1000, 500, &grid));
        assert_eq!(piece.anchor(), Pos::new(0, 4));
        assert_eq!(piece.step_elapsed_ms(), 0);
        assert_eq!(piece.lock_elapsed_ms(), 0);
    }

    #[test]
    fn test_locked_piece_ignores_commands() {
        let (rs, grid) = setup();
        let mut piece = ActivePiece::spawn(PieceKind::T, Pos::new(0, 0), &rs, &grid).unwrap();
        piece.hard_drop(&grid);
        let frozen = piece;

        assert!(!piece.try_move(MoveDirection::Left, &grid));
        assert!(!piece.rotate(RotationDirection::Cw, &rs, &grid));
        assert_eq!(piece.hard_drop(&grid), 0);
        assert_eq!(piece, frozen);
    }

    #[test]
    fn test_rotation_uses_kick_when_blocked_by_wall() {
        let (rs, grid) = setup();
        // Vertical bar hugging the left wall; turning flat needs a kick.
        let mut piece = ActivePiece::spawn(PieceKind::I, Pos::new(0, 0), &rs, &grid).unwrap();
        assert!(piece.rotate(RotationDirection::Cw, &rs, &grid));
        while piece.try_move(MoveDirection::Left, &grid) {}
        let before = piece;

        assert!(piece.rotate(RotationDirection::Cw, &rs, &grid));
        assert_ne!(piece.anchor(), before.anchor());
        assert_eq!(piece.rotation(), 2);
        assert!(grid.is_valid(&piece.offsets(), piece.anchor()));
    }

    #[test]
    fn test_lock_commits_and_reports_cells() {
        let (rs, mut grid) = setup();
        let mut piece = ActivePiece::spawn(PieceKind::O, Pos::new(2, 3), &rs, &grid).unwrap();
        piece.hard_drop(&grid);
        let event = piece.lock(&mut grid);

        assert_eq!(event.kind, PieceKind::O);
        assert_eq!(event.lines_cleared, 0);
        for cell in event.cells {
            assert_eq!(grid.get(cell), Some(Some(PieceKind::O)));
        }
    }
}
