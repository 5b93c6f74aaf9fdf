//! Deterministic snapshot generation
//!
//! Snapshots capture the active screen, cursor, modes and backlog counters
//! in a serializable form for renderers, tests and the headless driver.
//! Given the same byte stream, the engine produces identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, Style};
use super::cursor::Cursor;
use super::modes::Modes;
use super::screen::Screen;

/// A complete snapshot of the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub cols: usize,
    pub rows: usize,
    /// Active grid content (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    pub cursor: CursorSnapshot,
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    pub modes: Modes,
    pub title: Option<String>,
    pub icon_name: Option<String>,
    pub backlog: BacklogSnapshot,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub content: String,
    pub fg: Color,
    pub bg: Color,
    #[serde(default, skip_serializing_if = "is_plain")]
    pub style: Style,
    /// 0 for continuation, 1 normal, 2 wide
    pub width: u8,
}

fn is_plain(style: &Style) -> bool {
    style.bits() == 0
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub row: usize,
    pub col: usize,
    pub visible: bool,
    pub shape: String,
    pub blinking: bool,
    pub pending_wrap: bool,
}

/// Backlog counters; row contents are read through the backlog API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogSnapshot {
    pub len: usize,
    pub capacity: usize,
    pub backpos: u64,
    pub generation: u64,
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            content: cell.content.clone(),
            fg: cell.attrs.fg,
            bg: cell.attrs.bg,
            style: cell.attrs.style,
            width: cell.width,
        }
    }
}

impl From<&Cursor> for CursorSnapshot {
    fn from(cursor: &Cursor) -> Self {
        CursorSnapshot {
            row: cursor.row,
            col: cursor.col,
            visible: cursor.visible,
            shape: cursor.shape.name().to_string(),
            blinking: cursor.blinking,
            pending_wrap: cursor.pending_wrap,
        }
    }
}

impl Snapshot {
    /// Create a snapshot from the current screen state
    pub fn from_screen(screen: &Screen, title: Option<&str>, icon_name: Option<&str>) -> Self {
        let grid = screen
            .grid()
            .iter()
            .map(|row| row.cells.iter().map(CellSnapshot::from).collect())
            .collect();
        let (scroll_top, scroll_bottom) = screen.scroll_region();
        let backlog = screen.backlog();

        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot::from(screen.cursor()),
            scroll_top,
            scroll_bottom,
            modes: screen.modes().clone(),
            title: title.map(str::to_owned),
            icon_name: icon_name.map(str::to_owned),
            backlog: BacklogSnapshot {
                len: backlog.len(),
                capacity: backlog.capacity(),
                backpos: backlog.backpos(),
                generation: backlog.generation(),
            },
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Plain text of the grid, trailing blank lines removed
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            for cell in row.iter().filter(|c| c.width != 0) {
                if cell.content.is_empty() {
                    result.push(' ');
                } else {
                    result.push_str(&cell.content);
                }
            }
            while result.ends_with(' ') {
                result.pop();
            }
            result.push('\n');
        }

        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }

    /// Compare grid contents only
    pub fn content_equals(&self, other: &Snapshot) -> bool {
        self.cols == other.cols && self.rows == other.rows && self.grid == other.grid
    }
}
