//! Rotation module - quarter-turn transforms and wall-kick lookup
//!
//! Offsets are rotated with a fixed quarter-turn matrix scaled by the turn
//! direction. Each shape picks one pivot mode for its lifetime:
//!
//! - **Half-cell** (I, O): offsets are shifted by (-0.5, -0.5), rotated, and
//!   each axis is rounded up
//! - **Integer** (J, L, S, T, Z): offsets are rotated about the origin cell
//!
//! Half-cell arithmetic runs on doubled coordinates so it stays exact in
//! integers.

use crate::config::{ConfigError, GameConfig, KickRow, PivotMode};
use crate::types::{Offsets, PieceKind, Pos, RotationDirection, ROTATIONS};

/// Quarter-turn matrix, row-major `(m0, m1, m2, m3)`
pub const ROTATION_MATRIX: [i32; 4] = [0, -1, 1, 0];

/// Wrap `value` into `[min, max)`
pub fn wrap(value: i32, min: i32, max: i32) -> i32 {
    min + (value - min).rem_euclid(max - min)
}

/// Rotation index reached by turning once from `rotation`
pub fn next_rotation(rotation: u8, direction: RotationDirection) -> u8 {
    wrap(
        i32::from(rotation) + direction.sign(),
        0,
        i32::from(ROTATIONS),
    ) as u8
}

/// Kick-table row for a turn that ends at `target_rotation`
///
/// Row `target * 2`, minus one for counter-clockwise turns, wrapped into the
/// table's row count.
pub fn kick_row_index(target_rotation: u8, direction: RotationDirection, rows: usize) -> usize {
    let mut index = i32::from(target_rotation) * 2;
    if direction.sign() < 0 {
        index -= 1;
    }
    wrap(index, 0, rows.max(1) as i32) as usize
}

/// ceil(k / 2) for any integer k
fn ceil_half(k: i32) -> i32 {
    (k + 1).div_euclid(2)
}

/// Rotate every offset one quarter turn
pub fn rotate_offsets(pivot: PivotMode, offsets: &Offsets, direction: RotationDirection) -> Offsets {
    let d = direction.sign();
    let [m0, m1, m2, m3] = ROTATION_MATRIX;

    offsets.map(|cell| match pivot {
        PivotMode::Integer => Pos::new(
            cell.x * m0 * d + cell.y * m1 * d,
            cell.x * m2 * d + cell.y * m3 * d,
        ),
        PivotMode::HalfCell => {
            let (x2, y2) = (2 * cell.x - 1, 2 * cell.y - 1);
            Pos::new(
                ceil_half(x2 * m0 * d + y2 * m1 * d),
                ceil_half(x2 * m2 * d + y2 * m3 * d),
            )
        }
    })
}

/// Per-kind static data, resolved from the configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeData {
    pub kind: PieceKind,
    pub spawn_offsets: Offsets,
    pub pivot: PivotMode,
    pub kicks: Vec<KickRow>,
}

/// Shape table indexed by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationSystem {
    shapes: Vec<ShapeData>,
}

impl RotationSystem {
    /// Build from a configuration, validating it first
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut shapes = Vec::with_capacity(PieceKind::ALL.len());
        for kind in PieceKind::ALL {
            let shape = config.shape(kind).ok_or(ConfigError::MissingShape(kind))?;
            shapes.push(ShapeData {
                kind,
                spawn_offsets: shape.cells,
                pivot: shape.pivot,
                kicks: shape.kicks.clone(),
            });
        }

        Ok(Self { shapes })
    }

    pub fn shape(&self, kind: PieceKind) -> &ShapeData {
        &self.shapes[kind.index()]
    }

    /// Rotation-0 offsets of `kind`
    pub fn spawn_offsets(&self, kind: PieceKind) -> Offsets {
        self.shape(kind).spawn_offsets
    }

    /// Offsets of `kind` after one quarter turn from `offsets`
    pub fn rotate(&self, kind: PieceKind, offsets: &Offsets, direction: RotationDirection) -> Offsets {
        rotate_offsets(self.shape(kind).pivot, offsets, direction)
    }

    /// Candidate translations for a turn ending at `target_rotation`, in trial order
    pub fn kicks(&self, kind: PieceKind, target_rotation: u8, direction: RotationDirection) -> &[Pos] {
        let table = &self.shape(kind).kicks;
        match table.get(kick_row_index(target_rotation, direction, table.len())) {
            Some(row) => row.as_slice(),
            None => &[],
        }
    }
}
