//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing a glyph
//! and its associated rendering attributes.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

/// A single cell in the terminal grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The glyph in this cell. Empty for blanks and for continuation cells
    /// of wide characters; may hold several codepoints for combining marks.
    pub content: String,
    /// Colors and style
    pub attrs: CellAttrs,
    /// Display width: 1 for normal cells, 2 for the lead half of a wide
    /// character, 0 for its continuation placeholder
    pub width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: String::new(),
            attrs: CellAttrs::default(),
            width: 1,
        }
    }
}

impl Cell {
    /// Create a new cell with a single character and default attributes
    pub fn new(c: char) -> Self {
        Self::with_attrs(c, CellAttrs::default())
    }

    /// Create a cell holding `c` drawn with `attrs`
    pub fn with_attrs(c: char, attrs: CellAttrs) -> Self {
        Self {
            content: c.to_string(),
            attrs,
            width: Self::char_width(c).max(1) as u8,
        }
    }

    /// A blank cell that keeps the given background (erase semantics)
    pub fn blank(bg: Color) -> Self {
        Self {
            content: String::new(),
            attrs: CellAttrs {
                bg,
                ..CellAttrs::default()
            },
            width: 1,
        }
    }

    /// The placeholder that follows a wide character
    pub fn continuation(attrs: CellAttrs) -> Self {
        Self {
            content: String::new(),
            attrs,
            width: 0,
        }
    }

    /// Display width of a character as the grid sees it (0, 1 or 2)
    pub fn char_width(c: char) -> usize {
        UnicodeWidthChar::width(c).unwrap_or(0).min(2)
    }

    /// Check if this cell is empty (no content)
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// True when the cell is indistinguishable from a freshly cleared one
    pub fn is_blank(&self) -> bool {
        self.content.is_empty() && self.width == 1 && self.attrs == CellAttrs::default()
    }

    /// Check if this cell is the second half of a double-width character
    pub fn is_wide_continuation(&self) -> bool {
        self.width == 0
    }

    /// Check if this cell starts a double-width character
    pub fn is_wide(&self) -> bool {
        self.width == 2
    }

    /// Append a combining character to the existing glyph
    pub fn append_combining(&mut self, c: char) {
        if !self.content.is_empty() {
            self.content.push(c);
        }
    }

    /// Clear the cell to default state
    pub fn clear(&mut self) {
        self.content.clear();
        self.attrs = CellAttrs::default();
        self.width = 1;
    }

    /// Clear the cell but preserve background color (for erase operations)
    pub fn erase(&mut self, bg: Color) {
        self.clear();
        self.attrs.bg = bg;
    }
}

/// The attribute set applied to newly written cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellAttrs {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text style attributes
    pub style: Style,
}

impl CellAttrs {
    /// SGR 0
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Color representation supporting indexed and RGB colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// 256-color palette index
    Indexed(u8),
    /// 24-bit RGB color
    Rgb(u8, u8, u8),
}

impl Color {
    /// Standard ANSI colors (0-7)
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Stable byte encoding used by the session checksum
    pub(crate) fn fingerprint(&self) -> [u8; 4] {
        match *self {
            Color::Default => [0, 0, 0, 0],
            Color::Indexed(i) => [1, i, 0, 0],
            Color::Rgb(r, g, b) => [2, r, g, b],
        }
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub faint: bool,
    pub italic: bool,
    pub underline: bool,
    pub blink: bool,
    pub inverse: bool,
    pub hidden: bool,
    pub strikethrough: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pack the flags into one byte, bold in the lowest bit
    pub fn bits(&self) -> u8 {
        [
            self.bold,
            self.faint,
            self.italic,
            self.underline,
            self.blink,
            self.inverse,
            self.hidden,
            self.strikethrough,
        ]
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, &on)| acc | ((on as u8) << i))
    }
}
