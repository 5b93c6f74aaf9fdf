//! Cursor state management
//!
//! The cursor tracks position, visibility, shape and the attribute set
//! applied to newly written cells. Snapshots for DECSC/DECRC are taken as
//! [`SavedCursor`] values; the screen keeps one slot per screen.

use serde::{Deserialize, Serialize};

use super::cell::CellAttrs;
use super::charset::Charsets;

/// Cursor shape (DECSCUSR)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Block cursor (filled rectangle)
    #[default]
    Block,
    /// Underline cursor
    Underline,
    /// Vertical bar cursor
    Bar,
}

impl CursorShape {
    pub fn name(self) -> &'static str {
        match self {
            CursorShape::Block => "block",
            CursorShape::Underline => "underline",
            CursorShape::Bar => "bar",
        }
    }
}

/// Cursor state: position, attributes and presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Row position (0-indexed)
    pub row: usize,
    /// Column position (0-indexed)
    pub col: usize,
    /// Attributes applied to new characters
    pub attrs: CellAttrs,
    /// Whether the cursor is visible (DECTCEM)
    pub visible: bool,
    /// Cursor shape
    pub shape: CursorShape,
    /// Whether cursor is blinking
    pub blinking: bool,
    /// The last column was written; the next printable wraps first
    pub pending_wrap: bool,
    /// Designated and invoked character sets
    pub charsets: Charsets,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            row: 0,
            col: 0,
            attrs: CellAttrs::default(),
            visible: true,
            shape: CursorShape::Block,
            blinking: true,
            pending_wrap: false,
            charsets: Charsets::default(),
        }
    }
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub row: usize,
    pub col: usize,
    pub attrs: CellAttrs,
    pub pending_wrap: bool,
    pub charsets: Charsets,
    pub origin: bool,
    pub autowrap: bool,
}

impl SavedCursor {
    /// Clamp the saved position into a grid of the given size
    pub fn clamp(&mut self, cols: usize, rows: usize) {
        self.col = self.col.min(cols.saturating_sub(1));
        self.row = self.row.min(rows.saturating_sub(1));
    }
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, row: usize, col: usize, cols: usize, rows: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Move cursor left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
        self.pending_wrap = false;
    }

    /// Move cursor right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
        self.pending_wrap = false;
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
        self.pending_wrap = false;
    }

    /// Take a DECSC snapshot; origin and autowrap live in the mode register
    pub fn save(&self, origin: bool, autowrap: bool) -> SavedCursor {
        SavedCursor {
            row: self.row,
            col: self.col,
            attrs: self.attrs,
            pending_wrap: self.pending_wrap,
            charsets: self.charsets,
            origin,
            autowrap,
        }
    }

    /// Apply a DECRC snapshot, clamped into the current grid
    pub fn restore(&mut self, saved: &SavedCursor, cols: usize, rows: usize) {
        self.row = saved.row.min(rows.saturating_sub(1));
        self.col = saved.col.min(cols.saturating_sub(1));
        self.attrs = saved.attrs;
        self.pending_wrap = saved.pending_wrap;
        self.charsets = saved.charsets;
    }

    /// Reset cursor to default state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
