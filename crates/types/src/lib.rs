//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data, usable from the core logic, the headless
//! simulator and any renderer sitting on top.
//!
//! # Coordinates
//!
//! The playfield uses Y-up integer coordinates centered on the origin:
//!
//! - **Columns**: `[-(W/2), -(W/2) + W)`, so `-5..5` for the default width of 10
//! - **Rows**: `[-(H/2), -(H/2) + H)`, so `-10..10` for the default height of 20
//! - **Down** is `(0, -1)`; gravity decrements the row
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `TICK_MS` | 16 | Frame interval used by the simulator (~60 FPS) |
//! | `STEP_INTERVAL_MS` | 1000 | Gravity step interval |
//! | `LOCK_DELAY_MS` | 500 | Grace period before a grounded piece locks |
//!
//! # Examples
//!
//! ```
//! use blockfall_types::{GameCommand, PieceKind, Pos, RotationDirection};
//!
//! let kind = PieceKind::from_str("t").unwrap();
//! assert_eq!(kind, PieceKind::T);
//!
//! assert_eq!(Pos::new(1, 2) + Pos::DOWN, Pos::new(1, 1));
//!
//! assert_eq!(GameCommand::from_str("rotateCw"), Some(GameCommand::RotateCw));
//! assert_eq!(RotationDirection::Ccw.sign(), -1);
//! ```

use std::ops::{Add, Neg, Sub};

use serde::{Deserialize, Serialize};

/// Default board width in cells (10 columns)
pub const BOARD_WIDTH: u16 = 10;

/// Default board height in cells (20 rows)
pub const BOARD_HEIGHT: u16 = 20;

/// Fixed frame interval in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Gravity step interval (1000ms = one row per second)
pub const STEP_INTERVAL_MS: u32 = 1000;

/// Lock delay once the piece stops descending (500ms)
pub const LOCK_DELAY_MS: u32 = 500;

/// Number of cells in every tetromino
pub const PIECE_CELLS: usize = 4;

/// Number of distinct rotation indices
pub const ROTATIONS: u8 = 4;


/// The seven tetromino kinds
///
/// The kind doubles as the shape tag stored in every occupied grid cell.
/// - **I**: bar
/// - **O**: square
/// - **T**, **S**, **Z**, **J**, **L**: the integer-pivot shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    /// All kinds in declaration order
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse piece kind from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_str("i"), Some(PieceKind::I));
    /// assert_eq!(PieceKind::from_str("O"), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "i" => Some(PieceKind::I),
            "o" => Some(PieceKind::O),
            "t" => Some(PieceKind::T),
            "s" => Some(PieceKind::S),
            "z" => Some(PieceKind::Z),
            "j" => Some(PieceKind::J),
            "l" => Some(PieceKind::L),
            _ => None,
        }
    }

    /// Convert to lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }

    /// Stable index in `0..7`, matching [`PieceKind::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Single-character tag for text dumps
    pub fn glyph(&self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::T => 'T',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
        }
    }
}

/// Integer cell position or translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const ZERO: Pos = Pos { x: 0, y: 0 };
    pub const LEFT: Pos = Pos { x: -1, y: 0 };
    pub const RIGHT: Pos = Pos { x: 1, y: 0 };
    pub const DOWN: Pos = Pos { x: 0, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Pos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Pos {
    type Output = Pos;

    fn neg(self) -> Pos {
        Pos::new(-self.x, -self.y)
    }
}

/// A cell on the grid
///
/// - `None`: Empty cell
/// - `Some(PieceKind)`: Occupied, tagged with the shape that filled it
pub type Cell = Option<PieceKind>;

/// Cell offsets of a piece relative to its anchor, one entry per cell
///
/// Always replaced as a whole value; never edited entry by entry.
pub type Offsets = [Pos; PIECE_CELLS];

/// Single-cell translation requested by a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveDirection {
    Left,
    Right,
    Down,
}

impl MoveDirection {
    pub fn offset(&self) -> Pos {
        match self {
            MoveDirection::Left => Pos::LEFT,
            MoveDirection::Right => Pos::RIGHT,
            MoveDirection::Down => Pos::DOWN,
        }
    }
}

/// Quarter-turn direction
///
/// `Cw` carries sign `+1` and `Ccw` sign `-1`; the sign feeds both the
/// rotation matrix and the wall-kick row parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationDirection {
    Cw,
    Ccw,
}

impl RotationDirection {
    pub fn sign(&self) -> i32 {
        match self {
            RotationDirection::Cw => 1,
            RotationDirection::Ccw => -1,
        }
    }
}

/// Discrete commands consumed from the input layer
///
/// These are the abstract events a frame may carry; the session applies
/// them in a fixed order regardless of how they were queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameCommand {
    /// Move piece one cell left
    MoveLeft,
    /// Move piece one cell right
    MoveRight,
    /// Move piece one cell down
    SoftDrop,
    /// Drop to the lowest valid row and lock immediately
    HardDrop,
    /// Quarter turn, direction `+1`
    RotateCw,
    /// Quarter turn, direction `-1`
    RotateCcw,
}

impl GameCommand {
    /// Parse command from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_types::GameCommand;
    ///
    /// assert_eq!(GameCommand::from_str("moveLeft"), Some(GameCommand::MoveLeft));
    /// assert_eq!(GameCommand::from_str("hardDrop"), Some(GameCommand::HardDrop));
    /// assert_eq!(GameCommand::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "moveleft" => Some(GameCommand::MoveLeft),
            "moveright" => Some(GameCommand::MoveRight),
            "softdrop" => Some(GameCommand::SoftDrop),
            "harddrop" => Some(GameCommand::HardDrop),
            "rotatecw" => Some(GameCommand::RotateCw),
            "rotateccw" => Some(GameCommand::RotateCcw),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameCommand::MoveLeft => "moveLeft",
            GameCommand::MoveRight => "moveRight",
            GameCommand::SoftDrop => "softDrop",
            GameCommand::HardDrop => "hardDrop",
            GameCommand::RotateCw => "rotateCw",
            GameCommand::RotateCcw => "rotateCcw",
        }
    }

    /// Rotation carried by this command, if any
    pub fn rotation(&self) -> Option<RotationDirection> {
        match self {
            GameCommand::RotateCw => Some(RotationDirection::Cw),
            GameCommand::RotateCcw => Some(RotationDirection::Ccw),
            _ => None,
        }
    }
}
