//! Terminal Core Module
//!
//! Platform-independent terminal state. This module contains:
//! - Cell representation with attributes
//! - The fixed-size grid and its row operations
//! - Cursor state, save slots and character sets
//! - The backlog (scrollback ring) with beacons
//! - The mode register
//! - The screen tying them together, and deterministic snapshots
//!
//! The core is completely deterministic: the same sequence of operations
//! always produces the same state.

mod backlog;
mod cell;
mod charset;
mod cursor;
mod grid;
mod modes;
mod screen;
mod snapshot;

pub use backlog::{Backlog, BacklogBeacon, BacklogIter, BacklogLookup, BacklogRow, Resume};
pub use cell::{Cell, CellAttrs, Color, Style};
pub use charset::{Charset, Charsets};
pub use cursor::{Cursor, CursorShape, SavedCursor};
pub use grid::{Grid, Row};
pub use modes::{ModeEffect, Modes, MouseExt, MouseMode, ScreenKind};
pub use screen::Screen;
pub use snapshot::{BacklogSnapshot, CellSnapshot, CursorSnapshot, Snapshot};
