//! Shadow projection - where the active piece would land on a hard drop
//!
//! Recomputed every frame; nothing here outlives the call.

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::piece::ActivePiece;
use crate::types::{Cell, Offsets, Pos, PIECE_CELLS};

/// Landing preview of the active piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShadowPiece {
    pub offsets: Offsets,
    pub anchor: Pos,
}

impl ShadowPiece {
    pub fn cells(&self) -> [Pos; PIECE_CELLS] {
        self.offsets.map(|offset| offset + self.anchor)
    }
}

/// Project `piece` straight down onto the stack
///
/// The piece's own footprint is lifted off the grid for the scan so it cannot
/// collide with itself, then the footprint cells are restored to exactly what
/// they held before, whether or not the piece was committed at the time.
pub fn project(grid: &mut Grid, piece: &ActivePiece) -> ShadowPiece {
    let offsets = piece.offsets();
    let footprint = piece.cells();
    let saved: [Option<Cell>; PIECE_CELLS] = footprint.map(|cell| grid.get(cell));

    grid.uncommit(&offsets, piece.anchor());

    let mut landing = piece.anchor();
    let bottom = grid.bounds().y_min - 1;
    let mut candidate = piece.anchor();
    while candidate.y >= bottom && grid.is_valid(&offsets, candidate) {
        landing = candidate;
        candidate = candidate + Pos::DOWN;
    }

    for (cell, prior) in footprint.into_iter().zip(saved) {
        if let Some(prior) = prior {
            grid.set(cell, prior);
        }
    }

    ShadowPiece {
        offsets,
        anchor: landing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rotation::RotationSystem;
    use crate::types::PieceKind;

    fn spawn(kind: PieceKind, anchor: Pos, grid: &Grid) -> ActivePiece {
        let rs = RotationSystem::from_config(&GameConfig::default()).unwrap();
        ActivePiece::spawn(kind, anchor, &rs, grid).unwrap()
    }

    #[test]
    fn test_shadow_lands_on_floor() {
        let mut grid = Grid::new(10, 20);
        let piece = spawn(PieceKind::O, Pos::new(0, 8), &grid);
        let shadow = project(&mut grid, &piece);
        assert_eq!(shadow.anchor, Pos::new(0, -10));
        assert_eq!(shadow.offsets, piece.offsets());
    }

    #[test]
    fn test_shadow_lands_on_stack() {
        let mut grid = Grid::new(10, 20);
        grid.set(Pos::new(1, -4), Some(PieceKind::Z));
        let piece = spawn(PieceKind::O, Pos::new(0, 8), &grid);
        let shadow = project(&mut grid, &piece);
        assert_eq!(shadow.anchor, Pos::new(0, -3));
    }

    #[test]
    fn test_committed_footprint_is_restored() {
        let mut grid = Grid::new(10, 20);
        let piece = spawn(PieceKind::T, Pos::new(0, 4), &grid);
        grid.commit(&piece.offsets(), piece.anchor(), piece.kind());
        let before = grid.clone();

        let shadow = project(&mut grid, &piece);
        assert_eq!(grid, before);
        assert_eq!(shadow.anchor, Pos::new(0, -10));
    }

    #[test]
    fn test_uncommitted_footprint_stays_empty() {
        let mut grid = Grid::new(10, 20);
        let piece = spawn(PieceKind::L, Pos::new(2, 2), &grid);
        let before = grid.clone();

        project(&mut grid, &piece);
        assert_eq!(grid, before);
    }
}
