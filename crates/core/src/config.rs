//! Static game configuration and its startup validation
//!
//! Everything here is read once when a session is built. A malformed
//! configuration is rejected up front with a [`ConfigError`], so the per-frame
//! code never has to defend against short kick tables or missing shapes.

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Bounds;
use crate::types::{
    Offsets, PieceKind, Pos, BOARD_HEIGHT, BOARD_WIDTH, LOCK_DELAY_MS, STEP_INTERVAL_MS,
};

/// Required number of wall-kick rows: one per (rotation index, direction) pair
pub const KICK_ROWS: usize = 8;

/// Upper bound on candidate translations per kick row
pub const MAX_KICKS: usize = 8;

/// Candidate translations tried in order after a rotation
pub type KickRow = ArrayVec<Pos, MAX_KICKS>;

/// How a shape's offsets are rotated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotMode {
    /// Rotate about the corner between cells: shift by (-0.5, -0.5), rotate, round up
    HalfCell,
    /// Rotate about the cell at offset (0, 0)
    Integer,
}

/// Startup-time configuration failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: u16, height: u16 },

    #[error("no shape configured for {0:?}")]
    MissingShape(PieceKind),

    #[error("shape {0:?} is configured more than once")]
    DuplicateShape(PieceKind),

    #[error("wall-kick table for {kind:?} has {rows} rows, expected {expected}")]
    KickRowCount {
        kind: PieceKind,
        rows: usize,
        expected: usize,
    },

    #[error("wall-kick row {row} for {kind:?} has no candidates")]
    EmptyKickRow { kind: PieceKind, row: usize },

    #[error("{kind:?} does not fit inside the board at spawn anchor ({}, {})", .anchor.x, .anchor.y)]
    SpawnOutOfBounds { kind: PieceKind, anchor: Pos },

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Board dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub width: u16,
    pub height: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
        }
    }
}

/// Static per-kind shape data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeConfig {
    pub kind: PieceKind,
    /// Rotation-0 cell offsets
    pub cells: Offsets,
    pub pivot: PivotMode,
    /// Indexed by `rotation * 2`, minus one for counter-clockwise turns
    pub kicks: Vec<KickRow>,
}

/// Complete static configuration of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board: BoardConfig,
    /// Anchor every new piece spawns at
    pub spawn: Pos,
    pub step_interval_ms: u32,
    pub lock_delay_ms: u32,
    pub shapes: Vec<ShapeConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            spawn: Pos::new(-1, 8),
            step_interval_ms: STEP_INTERVAL_MS,
            lock_delay_ms: LOCK_DELAY_MS,
            shapes: standard_shapes(),
        }
    }
}

impl GameConfig {
    /// Parse a JSON document and validate it
    ///
    /// Missing top-level fields fall back to the defaults, so a file that only
    /// overrides `board` still gets the standard shape set.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_size(self.board.width, self.board.height)
    }

    /// Look up the shape configured for `kind`
    pub fn shape(&self, kind: PieceKind) -> Option<&ShapeConfig> {
        self.shapes.iter().find(|shape| shape.kind == kind)
    }

    /// Check every startup invariant
    pub fn validate(&self) -> Result<(), ConfigError> {
        let BoardConfig { width, height } = self.board;
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyBoard { width, height });
        }
        if self.step_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("step_interval_ms"));
        }
        if self.lock_delay_ms == 0 {
            return Err(ConfigError::ZeroInterval("lock_delay_ms"));
        }

        let mut seen = [false; 7];
        for shape in &self.shapes {
            let slot = &mut seen[shape.kind.index()];
            if *slot {
                return Err(ConfigError::DuplicateShape(shape.kind));
            }
            *slot = true;

            if shape.kicks.len() != KICK_ROWS {
                return Err(ConfigError::KickRowCount {
                    kind: shape.kind,
                    rows: shape.kicks.len(),
                    expected: KICK_ROWS,
                });
            }
            if let Some(row) = shape.kicks.iter().position(|row| row.is_empty()) {
                return Err(ConfigError::EmptyKickRow {
                    kind: shape.kind,
                    row,
                });
            }

            let bounds = self.bounds();
            if !shape
                .cells
                .iter()
                .all(|&cell| bounds.contains(cell + self.spawn))
            {
                return Err(ConfigError::SpawnOutOfBounds {
                    kind: shape.kind,
                    anchor: self.spawn,
                });
            }
        }

        if let Some(kind) = PieceKind::ALL.into_iter().find(|kind| !seen[kind.index()]) {
            return Err(ConfigError::MissingShape(kind));
        }

        Ok(())
    }
}

/// Build a kick row from literal pairs
fn kick_row(pairs: [(i32, i32); 5]) -> KickRow {
    pairs.into_iter().map(Pos::from).collect()
}

/// I piece kick table
fn i_kicks() -> Vec<KickRow> {
    vec![
        kick_row([(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)]),
        kick_row([(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)]),
        kick_row([(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)]),
        kick_row([(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]),
        kick_row([(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)]),
        kick_row([(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)]),
        kick_row([(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)]),
        kick_row([(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)]),
    ]
}

/// Kick table shared by J, L, O, S, T and Z
fn jlostz_kicks() -> Vec<KickRow> {
    vec![
        kick_row([(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
        kick_row([(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
        kick_row([(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)]),
        kick_row([(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)]),
        kick_row([(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
        kick_row([(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
        kick_row([(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)]),
        kick_row([(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)]),
    ]
}

fn offsets(pairs: [(i32, i32); 4]) -> Offsets {
    pairs.map(Pos::from)
}

/// The standard seven shapes with their rotation-0 layouts
pub fn standard_shapes() -> Vec<ShapeConfig> {
    PieceKind::ALL
        .into_iter()
        .map(|kind| {
            let (cells, pivot, kicks) = match kind {
                PieceKind::I => (
                    offsets([(-1, 1), (0, 1), (1, 1), (2, 1)]),
                    PivotMode::HalfCell,
                    i_kicks(),
                ),
                PieceKind::O => (
                    offsets([(0, 1), (1, 1), (0, 0), (1, 0)]),
                    PivotMode::HalfCell,
                    jlostz_kicks(),
                ),
                PieceKind::T => (
                    offsets([(0, 1), (-1, 0), (0, 0), (1, 0)]),
                    PivotMode::Integer,
                    jlostz_kicks(),
                ),
                PieceKind::S => (
                    offsets([(0, 1), (1, 1), (-1, 0), (0, 0)]),
                    PivotMode::Integer,
                    jlostz_kicks(),
                ),
                PieceKind::Z => (
                    offsets([(-1, 1), (0, 1), (0, 0), (1, 0)]),
                    PivotMode::Integer,
                    jlostz_kicks(),
                ),
                PieceKind::J => (
                    offsets([(-1, 1), (-1, 0), (0, 0), (1, 0)]),
                    PivotMode::Integer,
                    jlostz_kicks(),
                ),
                PieceKind::L => (
                    offsets([(1, 1), (-1, 0), (0, 0), (1, 0)]),
                    PivotMode::Integer,
                    jlostz_kicks(),
                ),
            };
            ShapeConfig {
                kind,
                cells,
                pivot,
                kicks,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn standard_shapes_cover_every_kind_once() {
        let shapes = standard_shapes();
        assert_eq!(shapes.len(), 7);
        for kind in PieceKind::ALL {
            assert_eq!(shapes.iter().filter(|s| s.kind == kind).count(), 1);
        }
    }

    #[test]
    fn only_bar_and_square_use_half_cell_pivot() {
        for shape in standard_shapes() {
            let expected = matches!(shape.kind, PieceKind::I | PieceKind::O);
            assert_eq!(shape.pivot == PivotMode::HalfCell, expected, "{:?}", shape.kind);
        }
    }

    #[test]
    fn short_kick_table_is_rejected() {
        let mut config = GameConfig::default();
        config.shapes[2].kicks.truncate(6);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::KickRowCount {
                kind: PieceKind::T,
                rows: 6,
                expected: KICK_ROWS
            }
        ));
    }

    #[test]
    fn missing_and_duplicate_shapes_are_rejected() {
        let mut config = GameConfig::default();
        config.shapes.retain(|s| s.kind != PieceKind::Z);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingShape(PieceKind::Z))
        ));

        let mut config = GameConfig::default();
        let dup = config.shapes[0].clone();
        config.shapes.push(dup);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateShape(PieceKind::I))
        ));
    }

    #[test]
    fn spawn_outside_board_is_rejected() {
        let config = GameConfig {
            spawn: Pos::new(0, 9),
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpawnOutOfBounds { .. })
        ));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = GameConfig {
            lock_delay_ms: 0,
            ..GameConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroInterval("lock_delay_ms"))
        ));
    }

    #[test]
    fn json_overrides_merge_with_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "board": { "width": 12, "height": 24 } }"#).unwrap();
        assert_eq!(config.board.width, 12);
        assert_eq!(config.board.height, 24);
        assert_eq!(config.shapes, standard_shapes());
        assert_eq!(config.lock_delay_ms, LOCK_DELAY_MS);
    }

    #[test]
    fn json_round_trip_keeps_kick_rows() {
        let config = GameConfig::default();
        let json = config.to_json_string().unwrap();
        let parsed = GameConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        assert!(matches!(
            GameConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }
}
