//! Renderer-facing export of one frame
//!
//! A snapshot carries everything a renderer reads each frame: the occupied
//! grid cells with their tags (active footprint included), the active piece,
//! and the shadow. `snapshot_into` reuses the caller's buffers.

use serde::{Deserialize, Serialize};

use crate::grid::Bounds;
use crate::piece::{ActivePiece, PiecePhase};
use crate::types::{PieceKind, Pos, PIECE_CELLS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedCell {
    pub pos: Pos,
    pub kind: PieceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveSnapshot {
    pub kind: PieceKind,
    pub rotation: u8,
    pub anchor: Pos,
    pub cells: [Pos; PIECE_CELLS],
    pub phase: PiecePhase,
}

impl From<&ActivePiece> for ActiveSnapshot {
    fn from(value: &ActivePiece) -> Self {
        Self {
            kind: value.kind(),
            rotation: value.rotation(),
            anchor: value.anchor(),
            cells: value.cells(),
            phase: value.phase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub bounds: Bounds,
    pub occupied: Vec<TaggedCell>,
    pub active: Option<ActiveSnapshot>,
    pub shadow: Option<[Pos; PIECE_CELLS]>,
    pub game_over: bool,
    pub pieces_locked: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        self.occupied.clear();
        self.active = None;
        self.shadow = None;
        self.game_over = false;
        self.pieces_locked = 0;
    }

    pub fn playable(&self) -> bool {
        !self.game_over && self.active.is_some()
    }

    /// Text view, top row first: `@` active, `+` shadow, kind glyph for the stack
    pub fn to_ascii(&self) -> String {
        let width = self.bounds.width();
        let height = self.bounds.height();
        let mut rows = vec![vec!['.'; width]; height];

        let mut put = |pos: Pos, ch: char| {
            if !self.bounds.contains(pos) {
                return;
            }
            let col = (pos.x - self.bounds.x_min) as usize;
            let row = (self.bounds.y_max - 1 - pos.y) as usize;
            rows[row][col] = ch;
        };

        for cell in &self.occupied {
            put(cell.pos, cell.kind.glyph());
        }
        if let Some(shadow) = self.shadow {
            for pos in shadow {
                put(pos, '+');
            }
        }
        if let Some(active) = self.active {
            for pos in active.cells {
                put(pos, '@');
            }
        }

        let mut out = String::with_capacity((width + 1) * height);
        for row in rows {
            out.extend(row);
            out.push('\n');
        }
        out
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            bounds: Bounds::from_size(0, 0),
            occupied: Vec::new(),
            active: None,
            shadow: None,
            game_over: false,
            pieces_locked: 0,
        }
    }
}
