//! Screen model implementation
//!
//! The screen owns both grids, the cursor with its two save slots, the
//! backlog, the mode register, the scroll region and the tab stops. Every
//! mutation a control sequence can cause is a method here; the dispatcher
//! only translates parameters.

use super::backlog::Backlog;
use super::cell::{Cell, Color};
use super::cursor::{Cursor, SavedCursor};
use super::grid::{Grid, Row};
use super::modes::{ModeEffect, Modes, ScreenKind};
use crate::error::{Result, TermptyError};

/// The main screen structure
#[derive(Debug, Clone)]
pub struct Screen {
    /// Primary screen grid
    primary: Grid,
    /// Alternate screen grid
    alternate: Grid,
    cursor: Cursor,
    /// DECSC slots, indexed by [`ScreenKind::index`]
    saved: [Option<SavedCursor>; 2],
    /// Scrollback, fed only by the primary grid
    backlog: Backlog,
    modes: Modes,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
    tab_stops: Vec<bool>,
    /// Last graphic character written, for REP
    last_printed: Option<char>,
}

impl Screen {
    /// Create a new screen with the given dimensions
    pub fn new(cols: usize, rows: usize, backlog_capacity: usize) -> Result<Self> {
        Ok(Self {
            primary: Grid::new(cols, rows)?,
            alternate: Grid::new(cols, rows)?,
            cursor: Cursor::new(),
            saved: [None, None],
            backlog: Backlog::new(backlog_capacity)?,
            modes: Modes::new(),
            scroll_top: 0,
            scroll_bottom: rows - 1,
            tab_stops: default_tab_stops(cols),
            last_printed: None,
        })
    }

    pub fn cols(&self) -> usize {
        self.primary.cols()
    }

    pub fn rows(&self) -> usize {
        self.primary.rows()
    }

    /// The grid selected by `altbuf`
    pub fn grid(&self) -> &Grid {
        self.grid_of(self.active())
    }

    pub fn grid_of(&self, kind: ScreenKind) -> &Grid {
        match kind {
            ScreenKind::Primary => &self.primary,
            ScreenKind::Alternate => &self.alternate,
        }
    }

    fn grid_mut(&mut self) -> &mut Grid {
        if self.modes.altbuf {
            &mut self.alternate
        } else {
            &mut self.primary
        }
    }

    fn cursor_row_mut(&mut self) -> Option<&mut Row> {
        let row = self.cursor.row;
        self.grid_mut().row_mut(row)
    }

    pub fn active(&self) -> ScreenKind {
        self.modes.active_screen()
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    pub fn saved_cursor(&self, kind: ScreenKind) -> Option<&SavedCursor> {
        self.saved[kind.index()].as_ref()
    }

    pub fn backlog(&self) -> &Backlog {
        &self.backlog
    }

    pub fn modes(&self) -> &Modes {
        &self.modes
    }

    pub fn modes_mut(&mut self) -> &mut Modes {
        &mut self.modes
    }

    /// Scroll region as inclusive `(top, bottom)` rows
    pub fn scroll_region(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    pub fn tab_stops(&self) -> impl Iterator<Item = usize> + '_ {
        self.tab_stops
            .iter()
            .enumerate()
            .filter_map(|(i, &set)| set.then_some(i))
    }

    /// Cell on the active grid
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.grid().cell(row, col)
    }

    /// Replace a cell on the active grid
    pub fn write_cell(&mut self, row: usize, col: usize, cell: Cell) -> Result<()> {
        self.grid_mut().write_cell(row, col, cell)
    }

    fn erase_bg(&self) -> Color {
        self.cursor.attrs.bg
    }

    // --- Printing ----------------------------------------------------------

    /// Print a character at the cursor, applying the active charset
    pub fn print(&mut self, c: char) {
        let c = self.cursor.charsets.translate(c);
        self.put_char(c);
    }

    /// REP: repeat the last printed graphic character
    pub fn repeat_last(&mut self, n: usize) {
        if let Some(c) = self.last_printed {
            for _ in 0..n {
                self.put_char(c);
            }
        }
    }

    fn put_char(&mut self, c: char) {
        let width = Cell::char_width(c);
        if width == 0 {
            self.append_combining(c);
            return;
        }
        let cols = self.cols();
        if width > cols {
            return;
        }

        if self.cursor.pending_wrap {
            if self.modes.autowrap {
                self.wrap();
            } else {
                self.cursor.pending_wrap = false;
            }
        }

        if width == 2 && self.cursor.col + 1 >= cols {
            if self.modes.autowrap {
                self.wrap();
            } else {
                self.cursor.col = cols - 2;
            }
        }

        let col = self.cursor.col;
        let attrs = self.cursor.attrs;
        let insert = self.modes.insert;
        if let Some(row) = self.cursor_row_mut() {
            if insert {
                row.insert_blanks(col, width, attrs.bg);
            }
            row.cells[col] = Cell::with_attrs(c, attrs);
            if width == 2 {
                row.cells[col + 1] = Cell::continuation(attrs);
            }
            row.normalize_wide();
        }
        self.last_printed = Some(c);

        let next = col + width;
        if next >= cols {
            self.cursor.col = cols - 1;
            self.cursor.pending_wrap = self.modes.autowrap;
        } else {
            self.cursor.col = next;
        }
    }

    fn append_combining(&mut self, c: char) {
        let mut col = if self.cursor.pending_wrap {
            self.cursor.col
        } else if self.cursor.col > 0 {
            self.cursor.col - 1
        } else {
            return;
        };
        let row = self.cursor.row;
        if col > 0
            && self
                .grid()
                .cell(row, col)
                .is_some_and(Cell::is_wide_continuation)
        {
            col -= 1;
        }
        if let Some(cell) = self.grid_mut().cell_mut(row, col) {
            cell.append_combining(c);
        }
    }

    /// Deferred wrap: mark the row as soft-wrapped and move to the next line
    fn wrap(&mut self) {
        if let Some(row) = self.cursor_row_mut() {
            row.wrapped = true;
        }
        self.cursor.carriage_return();
        self.index();
    }

    // --- C0 and simple escapes ---------------------------------------------

    /// LF, VT, FF. With LNM set the cursor also returns to column 0.
    pub fn linefeed(&mut self) {
        self.index();
        if self.modes.linefeed_newline {
            self.cursor.carriage_return();
        }
    }

    /// IND - move down, scrolling at the bottom of the region
    pub fn index(&mut self) {
        self.cursor.pending_wrap = false;
        let row = self.cursor.row;
        if row == self.scroll_bottom {
            self.scroll_up(1);
        } else if row + 1 < self.rows() {
            self.cursor.row += 1;
        }
    }

    /// RI - move up, scrolling at the top of the region
    pub fn reverse_index(&mut self) {
        self.cursor.pending_wrap = false;
        let row = self.cursor.row;
        if row == self.scroll_top {
            self.scroll_down(1);
        } else if row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// NEL
    pub fn next_line(&mut self) {
        self.index();
        self.cursor.carriage_return();
    }

    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// HT / CHT: advance to the n-th next tab stop, or the last column
    pub fn tab(&mut self, n: usize) {
        let last = self.cols() - 1;
        let mut col = self.cursor.col;
        for _ in 0..n {
            col = (col + 1..=last)
                .find(|&i| self.tab_stops[i])
                .unwrap_or(last);
        }
        self.cursor.col = col;
        self.cursor.pending_wrap = false;
    }

    /// CBT: back to the n-th previous tab stop, or column 0
    pub fn back_tab(&mut self, n: usize) {
        let mut col = self.cursor.col;
        for _ in 0..n {
            col = (0..col).rev().find(|&i| self.tab_stops[i]).unwrap_or(0);
        }
        self.cursor.col = col;
        self.cursor.pending_wrap = false;
    }

    pub fn set_tab_stop(&mut self) {
        let col = self.cursor.col;
        if let Some(stop) = self.tab_stops.get_mut(col) {
            *stop = true;
        }
    }

    pub fn clear_tab_stop(&mut self) {
        let col = self.cursor.col;
        if let Some(stop) = self.tab_stops.get_mut(col) {
            *stop = false;
        }
    }

    pub fn clear_all_tab_stops(&mut self) {
        self.tab_stops.iter_mut().for_each(|s| *s = false);
    }

    // --- Scrolling ---------------------------------------------------------

    /// Scroll the region up by n lines. On the primary grid, rows leaving a
    /// region anchored at the top of the screen go to the backlog.
    pub fn scroll_up(&mut self, n: usize) {
        let (top, bottom, bg) = (self.scroll_top, self.scroll_bottom, self.erase_bg());
        let evicted = self.grid_mut().scroll_up(top, bottom, n, bg);
        if !self.modes.altbuf && top == 0 {
            for row in evicted {
                self.backlog.push(row);
            }
        }
    }

    /// Scroll the region down by n lines
    pub fn scroll_down(&mut self, n: usize) {
        let (top, bottom, bg) = (self.scroll_top, self.scroll_bottom, self.erase_bg());
        self.grid_mut().scroll_down(top, bottom, n, bg);
    }

    /// DECSTBM with 0-indexed inclusive bounds. Regions shorter than two
    /// lines are ignored; a valid region homes the cursor.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let bottom = bottom.min(self.rows() - 1);
        if top >= bottom {
            return;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        self.move_to(0, 0);
    }

    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows() - 1;
    }

    fn cursor_in_region(&self) -> bool {
        (self.scroll_top..=self.scroll_bottom).contains(&self.cursor.row)
    }

    /// IL
    pub fn insert_lines(&mut self, n: usize) {
        if !self.cursor_in_region() {
            return;
        }
        let (row, bottom, bg) = (self.cursor.row, self.scroll_bottom, self.erase_bg());
        self.grid_mut().insert_lines(row, bottom, n, bg);
        self.cursor.carriage_return();
    }

    /// DL
    pub fn delete_lines(&mut self, n: usize) {
        if !self.cursor_in_region() {
            return;
        }
        let (row, bottom, bg) = (self.cursor.row, self.scroll_bottom, self.erase_bg());
        self.grid_mut().delete_lines(row, bottom, n, bg);
        self.cursor.carriage_return();
    }

    // --- Erasing and editing -----------------------------------------------

    /// ED. Mode 3 clears the backlog and leaves the grid alone.
    pub fn erase_in_display(&mut self, mode: u16) {
        let (row, col, bg) = (self.cursor.row, self.cursor.col, self.erase_bg());
        let rows = self.rows();
        match mode {
            0 => {
                if let Some(r) = self.cursor_row_mut() {
                    r.erase_range(col..usize::MAX, bg);
                }
                self.grid_mut().erase_rows(row + 1..rows, bg);
            }
            1 => {
                self.grid_mut().erase_rows(0..row, bg);
                if let Some(r) = self.cursor_row_mut() {
                    r.erase_range(0..col + 1, bg);
                }
            }
            2 => self.grid_mut().clear(bg),
            3 => {
                self.backlog.clear();
                return;
            }
            _ => {
                tracing::debug!(mode, "unknown ED mode");
                return;
            }
        }
        self.cursor.pending_wrap = false;
    }

    /// EL
    pub fn erase_in_line(&mut self, mode: u16) {
        let (col, bg) = (self.cursor.col, self.erase_bg());
        let range = match mode {
            0 => col..usize::MAX,
            1 => 0..col + 1,
            2 => 0..usize::MAX,
            _ => {
                tracing::debug!(mode, "unknown EL mode");
                return;
            }
        };
        self.cursor.pending_wrap = false;
        if let Some(r) = self.cursor_row_mut() {
            r.erase_range(range, bg);
        }
    }

    /// ECH
    pub fn erase_chars(&mut self, n: usize) {
        let (col, bg) = (self.cursor.col, self.erase_bg());
        self.cursor.pending_wrap = false;
        if let Some(r) = self.cursor_row_mut() {
            r.erase_range(col..col.saturating_add(n), bg);
        }
    }

    /// ICH
    pub fn insert_chars(&mut self, n: usize) {
        let (col, bg) = (self.cursor.col, self.erase_bg());
        self.cursor.pending_wrap = false;
        if let Some(r) = self.cursor_row_mut() {
            r.insert_blanks(col, n, bg);
        }
    }

    /// DCH
    pub fn delete_chars(&mut self, n: usize) {
        let (col, bg) = (self.cursor.col, self.erase_bg());
        self.cursor.pending_wrap = false;
        if let Some(r) = self.cursor_row_mut() {
            r.delete_cells(col, n, bg);
        }
    }

    /// DECALN: fill with `E`, reset the region and home the cursor
    pub fn screen_alignment(&mut self) {
        self.grid_mut().fill('E');
        self.reset_scroll_region();
        self.cursor.move_to(0, 0, self.cols(), self.rows());
    }

    // --- Cursor movement ---------------------------------------------------

    /// CUP/HVP with 0-indexed coordinates, relative to the region in
    /// origin mode
    pub fn move_to(&mut self, row: usize, col: usize) {
        let (cols, rows) = (self.cols(), self.rows());
        if self.modes.origin {
            let row = (self.scroll_top + row).min(self.scroll_bottom);
            self.cursor.move_to(row, col, cols, rows);
        } else {
            self.cursor.move_to(row, col, cols, rows);
        }
    }

    /// CUU: stops at the region top when starting inside the region
    pub fn move_up(&mut self, n: usize) {
        let limit = if self.cursor.row >= self.scroll_top {
            self.scroll_top
        } else {
            0
        };
        self.cursor.row = self.cursor.row.saturating_sub(n).max(limit);
        self.cursor.pending_wrap = false;
    }

    /// CUD: stops at the region bottom when starting inside the region
    pub fn move_down(&mut self, n: usize) {
        let limit = if self.cursor.row <= self.scroll_bottom {
            self.scroll_bottom
        } else {
            self.rows() - 1
        };
        self.cursor.row = self.cursor.row.saturating_add(n).min(limit);
        self.cursor.pending_wrap = false;
    }

    pub fn move_forward(&mut self, n: usize) {
        let cols = self.cols();
        self.cursor.move_right(n, cols);
    }

    pub fn move_backward(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    /// CHA / HPA
    pub fn set_col(&mut self, col: usize) {
        self.cursor.col = col.min(self.cols() - 1);
        self.cursor.pending_wrap = false;
    }

    /// VPA, honouring origin mode
    pub fn set_row(&mut self, row: usize) {
        let col = self.cursor.col;
        self.move_to(row, col);
    }

    /// 1-based cursor position as reported by DSR 6
    pub fn report_position(&self) -> (usize, usize) {
        let top = if self.modes.origin { self.scroll_top } else { 0 };
        (self.cursor.row - top.min(self.cursor.row) + 1, self.cursor.col + 1)
    }

    // --- Save / restore ----------------------------------------------------

    /// DECSC into the slot of the active screen
    pub fn save_cursor(&mut self) {
        let slot = self.active().index();
        self.saved[slot] = Some(self.cursor.save(self.modes.origin, self.modes.autowrap));
    }

    /// DECRC from the slot of the active screen; an empty slot is a no-op
    pub fn restore_cursor(&mut self) {
        let slot = self.active().index();
        let (cols, rows) = (self.cols(), self.rows());
        if let Some(saved) = &self.saved[slot] {
            self.cursor.restore(saved, cols, rows);
            self.modes.origin = saved.origin;
            self.modes.autowrap = saved.autowrap;
        }
    }

    // --- Modes -------------------------------------------------------------

    /// DECSET/DECRST. Returns false for unknown modes.
    pub fn set_dec_mode(&mut self, mode: u16, enable: bool) -> bool {
        match self.modes.set_dec_mode(mode, enable) {
            ModeEffect::None => {}
            ModeEffect::AltScreen { mode, enable } => {
                if enable {
                    self.enter_alternate(mode);
                } else {
                    self.leave_alternate(mode);
                }
            }
            ModeEffect::SaveRestoreCursor { save } => {
                if save {
                    self.save_cursor();
                } else {
                    self.restore_cursor();
                }
            }
            ModeEffect::Origin => self.move_to(0, 0),
            ModeEffect::CursorVisible(visible) => self.cursor.visible = visible,
            ModeEffect::CursorBlink(blink) => self.cursor.blinking = blink,
            ModeEffect::Unknown => return false,
        }
        true
    }

    /// DEC private mode value for DECRQM
    pub fn dec_mode(&self, mode: u16) -> Option<bool> {
        match mode {
            12 => Some(self.cursor.blinking),
            25 => Some(self.cursor.visible),
            _ => self.modes.dec_mode(mode),
        }
    }

    /// Switch to the alternate grid (47, 1047, 1049)
    fn enter_alternate(&mut self, mode: u16) {
        if self.modes.altbuf {
            return;
        }
        if mode == 1049 {
            self.save_cursor();
        }
        self.modes.altbuf = true;
        if mode == 1049 {
            let bg = self.erase_bg();
            self.alternate.clear(bg);
        }
        tracing::trace!(mode, "entered alternate screen");
    }

    /// Switch back to the primary grid. 1047 and 1049 discard what was
    /// drawn on the alternate grid; 1049 restores the cursor.
    fn leave_alternate(&mut self, mode: u16) {
        if !self.modes.altbuf {
            return;
        }
        if mode != 47 {
            self.alternate.clear(Color::Default);
        }
        self.modes.altbuf = false;
        if mode == 1049 {
            self.restore_cursor();
        }
        tracing::trace!(mode, "left alternate screen");
    }

    // --- Resets ------------------------------------------------------------

    /// DECSTR: reset modes and attributes, keep the grid contents
    pub fn soft_reset(&mut self) {
        self.modes.autowrap = true;
        self.modes.origin = false;
        self.modes.insert = false;
        self.modes.app_cursor_keys = false;
        self.modes.app_keypad = false;
        self.reset_scroll_region();
        self.cursor.attrs.reset();
        self.cursor.charsets = Default::default();
        self.cursor.visible = true;
        self.cursor.pending_wrap = false;
        self.saved = [None, None];
    }

    /// RIS: back to the state of a fresh screen of the current size
    pub fn hard_reset(&mut self) {
        self.primary.clear(Color::Default);
        self.alternate.clear(Color::Default);
        self.cursor.reset();
        self.saved = [None, None];
        self.modes.reset();
        self.reset_scroll_region();
        self.tab_stops = default_tab_stops(self.cols());
        self.backlog.clear();
        self.last_printed = None;
    }

    // --- Resizing ----------------------------------------------------------

    /// Change the backlog capacity, evicting the oldest rows on shrink
    pub fn set_backlog_capacity(&mut self, capacity: usize) -> Result<()> {
        self.backlog.set_capacity(capacity)
    }

    /// Resize both grids.
    ///
    /// Shrinking drops blank rows below the cursor first, then moves rows
    /// off the top (into the backlog on the primary grid). Growing the primary grid
    /// pulls the newest backlog rows back above the current content.
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<()> {
        if cols == 0 || rows == 0 {
            return Err(TermptyError::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        if cols == self.cols() && rows == self.rows() {
            return Ok(());
        }

        let primary_anchor = if self.modes.altbuf {
            self.saved[0]
                .as_ref()
                .map_or_else(|| last_content_row(&self.primary), |s| s.row)
        } else {
            self.cursor.row
        };
        let alternate_anchor = if self.modes.altbuf {
            self.cursor.row
        } else {
            last_content_row(&self.alternate)
        };

        let primary_anchor = self.resize_primary_height(rows, primary_anchor)?;
        let alternate_anchor = resize_height(&mut self.alternate, rows, alternate_anchor, |_| {})?;
        self.primary.set_cols(cols)?;
        self.alternate.set_cols(cols)?;

        if self.modes.altbuf {
            self.cursor.row = alternate_anchor;
            if let Some(saved) = self.saved[0].as_mut() {
                saved.row = primary_anchor;
            }
        } else {
            self.cursor.row = primary_anchor;
        }
        self.cursor.col = self.cursor.col.min(cols - 1);
        self.cursor.row = self.cursor.row.min(rows - 1);
        if self.cursor.col < cols - 1 {
            self.cursor.pending_wrap = false;
        }
        for saved in self.saved.iter_mut().flatten() {
            saved.clamp(cols, rows);
        }

        self.reset_scroll_region();
        let old_cols = self.tab_stops.len();
        self.tab_stops.truncate(cols);
        self.tab_stops
            .extend((old_cols..cols).map(|i| i > 0 && i % 8 == 0));
        tracing::debug!(cols, rows, "screen resized");
        Ok(())
    }

    /// Height change for the primary grid, moving rows to and from the
    /// backlog. Returns the new anchor row.
    fn resize_primary_height(&mut self, rows: usize, anchor: usize) -> Result<usize> {
        let old_rows = self.primary.rows();
        if rows > old_rows {
            let cols = self.primary.cols();
            let mut pulled = Vec::new();
            while pulled.len() < rows - old_rows {
                match self.backlog.pop_newest() {
                    Some(row) => pulled.push(row.into_row(cols)?),
                    None => break,
                }
            }
            pulled.reverse();
            let shift = pulled.len();
            self.primary.prepend(pulled)?;
            self.primary.extend_to(rows)?;
            return Ok(anchor + shift);
        }
        let backlog = &mut self.backlog;
        resize_height(&mut self.primary, rows, anchor, |row| {
            backlog.push(row);
        })
    }

    /// Grid text for debugging and tests
    pub fn text(&self) -> String {
        self.grid().text()
    }
}

/// Shrink or grow `grid` to `rows`. Rows leaving from the top are handed to
/// `evict`. Returns the new anchor row.
fn resize_height(
    grid: &mut Grid,
    rows: usize,
    anchor: usize,
    mut evict: impl FnMut(Row),
) -> Result<usize> {
    let old_rows = grid.rows();
    if rows >= old_rows {
        grid.extend_to(rows)?;
        return Ok(anchor);
    }
    let anchor = anchor.min(old_rows - 1);
    let excess = old_rows - rows;
    let blank_below = grid
        .iter()
        .skip(anchor + 1)
        .rev()
        .take_while(|row| row.content_len() == 0)
        .count();
    let from_bottom = excess.min(blank_below);
    grid.truncate(old_rows - from_bottom);
    let from_top = excess - from_bottom;
    for row in grid.take_top(from_top) {
        evict(row);
    }
    Ok(anchor.saturating_sub(from_top))
}

fn last_content_row(grid: &Grid) -> usize {
    grid.iter()
        .rposition(|row| row.content_len() > 0)
        .unwrap_or(0)
}

fn default_tab_stops(cols: usize) -> Vec<bool> {
    (0..cols).map(|i| i > 0 && i % 8 == 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn screen(cols: usize, rows: usize) -> Screen {
        Screen::new(cols, rows, 100).unwrap()
    }

    fn print_str(screen: &mut Screen, s: &str) {
        for c in s.chars() {
            screen.print(c);
        }
    }

    #[test]
    fn test_screen_new() {
        let screen = screen(80, 24);
        assert_eq!(screen.cols(), 80);
        assert_eq!(screen.rows(), 24);
        assert_eq!(screen.scroll_region(), (0, 23));
        assert_eq!(screen.active(), ScreenKind::Primary);
        assert!(Screen::new(0, 24, 10).is_err());
    }

    #[test]
    fn test_print_char() {
        let mut screen = screen(80, 24);
        screen.print('A');
        assert_eq!(screen.cell(0, 0).unwrap().content, "A");
        assert_eq!(screen.cursor().col, 1);
    }

    #[test]
    fn test_deferred_wrap() {
        let mut screen = screen(5, 3);
        print_str(&mut screen, "ABCDE");
        assert_eq!(screen.cursor().col, 4);
        assert!(screen.cursor().pending_wrap);

        screen.print('F');
        assert_eq!((screen.cursor().row, screen.cursor().col), (1, 1));
        assert!(screen.grid().row(0).unwrap().wrapped);
        assert_eq!(screen.text(), "ABCDE\nF\n");
    }

    #[test]
    fn test_no_autowrap_overwrites_last_column() {
        let mut screen = screen(5, 3);
        screen.set_dec_mode(7, false);
        print_str(&mut screen, "ABCDEFG");
        assert_eq!(screen.text(), "ABCDG\n\n");
        assert_eq!(screen.cursor().row, 0);
    }

    #[test]
    fn test_wide_char_wraps_at_edge() {
        let mut screen = screen(5, 3);
        print_str(&mut screen, "ABCD中");
        assert_eq!(screen.cell(1, 0).unwrap().content, "中");
        assert!(screen.cell(1, 1).unwrap().is_wide_continuation());
        assert_eq!(screen.cursor().col, 2);
    }

    #[test]
    fn test_combining_attaches_to_previous() {
        let mut screen = screen(10, 2);
        print_str(&mut screen, "e\u{0301}x");
        assert_eq!(screen.cell(0, 0).unwrap().content, "e\u{0301}");
        assert_eq!(screen.cell(0, 1).unwrap().content, "x");
    }

    #[test]
    fn test_linefeed_scrolls_into_backlog() {
        let mut screen = screen(10, 3);
        for s in ["one", "two", "three", "four"] {
            screen.carriage_return();
            print_str(&mut screen, s);
            screen.linefeed();
        }
        assert_eq!(screen.backlog().len(), 2);
        let oldest: Vec<_> = screen.backlog().iter().map(|r| r.text()).collect();
        assert_eq!(oldest, vec!["one", "two"]);
        assert_eq!(screen.text(), "three\nfour\n");
    }

    #[test]
    fn test_region_scroll_skips_backlog() {
        let mut screen = screen(10, 5);
        screen.set_scroll_region(1, 3);
        assert_eq!(screen.cursor().row, 0);
        screen.move_to(3, 0);
        screen.linefeed();
        assert!(screen.backlog().is_empty());
    }

    #[test]
    fn test_erase_in_line() {
        let mut screen = screen(10, 1);
        print_str(&mut screen, "ABCDEFGHIJ");
        screen.move_to(0, 4);
        screen.erase_in_line(0);
        assert_eq!(screen.text(), "ABCD");

        screen.erase_in_line(1);
        assert_eq!(screen.text(), "");
    }

    #[test]
    fn test_erase_in_display_keeps_background() {
        let mut screen = screen(4, 2);
        screen.cursor_mut().attrs.bg = Color::BLUE;
        screen.erase_in_display(2);
        assert_eq!(screen.cell(1, 3).unwrap().attrs.bg, Color::BLUE);
    }

    #[test]
    fn test_insert_delete_lines_respect_region() {
        let mut screen = screen(4, 4);
        for (r, s) in ["A", "B", "C", "D"].iter().enumerate() {
            screen.move_to(r, 0);
            print_str(&mut screen, s);
        }
        screen.set_scroll_region(0, 2);
        screen.move_to(1, 0);
        screen.insert_lines(1);
        assert_eq!(screen.text(), "A\n\nB\nD");
        screen.delete_lines(5);
        assert_eq!(screen.text(), "A\n\n\nD");
    }

    #[test]
    fn test_tab_stops() {
        let mut screen = screen(20, 1);
        screen.tab(1);
        assert_eq!(screen.cursor().col, 8);
        screen.tab(2);
        assert_eq!(screen.cursor().col, 19);
        screen.back_tab(1);
        assert_eq!(screen.cursor().col, 16);

        screen.clear_all_tab_stops();
        screen.move_to(0, 3);
        screen.set_tab_stop();
        screen.move_to(0, 0);
        screen.tab(1);
        assert_eq!(screen.cursor().col, 3);
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut screen = screen(80, 24);
        screen.move_to(5, 10);
        screen.cursor_mut().attrs.style.bold = true;
        screen.save_cursor();

        screen.move_to(0, 0);
        screen.cursor_mut().attrs.reset();
        screen.restore_cursor();

        assert_eq!((screen.cursor().row, screen.cursor().col), (5, 10));
        assert!(screen.cursor().attrs.style.bold);
    }

    #[test]
    fn test_restore_without_save_is_noop() {
        let mut screen = screen(80, 24);
        screen.move_to(3, 4);
        screen.restore_cursor();
        assert_eq!((screen.cursor().row, screen.cursor().col), (3, 4));
    }

    #[test]
    fn test_alternate_screen_roundtrip() {
        let mut screen = screen(10, 3);
        print_str(&mut screen, "primary");
        screen.move_to(1, 2);
        let before = screen.grid_of(ScreenKind::Primary).clone();

        screen.set_dec_mode(1049, true);
        assert_eq!(screen.active(), ScreenKind::Alternate);
        assert_eq!(screen.text(), "\n\n");
        print_str(&mut screen, "junk");
        screen.move_to(2, 7);

        screen.set_dec_mode(1049, false);
        assert_eq!(screen.active(), ScreenKind::Primary);
        assert_eq!(screen.grid_of(ScreenKind::Primary), &before);
        assert_eq!((screen.cursor().row, screen.cursor().col), (1, 2));
        assert_eq!(screen.grid_of(ScreenKind::Alternate).text(), "\n\n");
    }

    #[test]
    fn test_mode_47_keeps_alternate_content() {
        let mut screen = screen(10, 2);
        screen.set_dec_mode(47, true);
        print_str(&mut screen, "alt");
        screen.set_dec_mode(47, false);
        screen.set_dec_mode(47, true);
        assert_eq!(screen.text(), "alt\n");
    }

    #[test]
    fn test_alternate_does_not_touch_mouse_modes() {
        let mut screen = screen(10, 2);
        screen.set_dec_mode(1002, true);
        screen.set_dec_mode(2004, true);
        screen.set_dec_mode(1049, true);
        screen.set_dec_mode(1049, false);
        assert!(screen.modes().bracketed_paste);
        assert_eq!(screen.dec_mode(1002), Some(true));
    }

    #[test]
    fn test_resize_shrink_pushes_top_rows() {
        let mut screen = screen(10, 4);
        for (r, s) in ["a", "b", "c", "d"].iter().enumerate() {
            screen.move_to(r, 0);
            print_str(&mut screen, s);
        }
        screen.resize(10, 2).unwrap();
        assert_eq!(screen.text(), "c\nd");
        assert_eq!(screen.cursor().row, 1);
        assert_eq!(screen.backlog().len(), 2);

        screen.resize(10, 4).unwrap();
        assert_eq!(screen.text(), "a\nb\nc\nd");
        assert_eq!(screen.cursor().row, 3);
        assert!(screen.backlog().is_empty());
    }

    #[test]
    fn test_resize_drops_rows_below_cursor_first() {
        let mut screen = screen(10, 4);
        print_str(&mut screen, "top");
        screen.resize(10, 2).unwrap();
        assert_eq!(screen.text(), "top\n");
        assert!(screen.backlog().is_empty());
        assert_eq!(screen.cursor().row, 0);
    }

    #[test]
    fn test_resize_keeps_content_below_cursor() {
        let mut screen = screen(10, 4);
        for (r, s) in ["a", "b", "c"].iter().enumerate() {
            screen.move_to(r, 0);
            print_str(&mut screen, s);
        }
        screen.move_to(0, 0);
        screen.resize(10, 2).unwrap();
        // The blank last row goes first, then "a" leaves from the top
        assert_eq!(screen.text(), "b\nc");
        assert_eq!(screen.cursor().row, 0);
        assert_eq!(screen.backlog().len(), 1);

        screen.resize(10, 4).unwrap();
        assert_eq!(screen.text(), "a\nb\nc\n");
        assert_eq!(screen.cursor().row, 1);
        assert!(screen.backlog().is_empty());
    }

    #[test]
    fn test_erase_in_display_clears_pending_wrap() {
        let mut screen = screen(5, 2);
        print_str(&mut screen, "ABCDE");
        assert!(screen.cursor().pending_wrap);
        screen.erase_in_display(0);
        assert!(!screen.cursor().pending_wrap);
        print_str(&mut screen, "X");
        assert_eq!(screen.text(), "ABCDX\n");
        assert_eq!((screen.cursor().row, screen.cursor().col), (0, 4));
        assert!(screen.cursor().pending_wrap);

        screen.erase_in_display(2);
        assert!(!screen.cursor().pending_wrap);
    }

    #[test]
    fn test_resize_clamps_cursor_and_tabs() {
        let mut screen = screen(20, 10);
        screen.move_to(9, 19);
        screen.save_cursor();
        screen.resize(5, 10).unwrap();
        assert_eq!(screen.cursor().col, 4);
        assert_eq!(screen.saved_cursor(ScreenKind::Primary).unwrap().col, 4);
        screen.resize(30, 10).unwrap();
        assert_eq!(screen.tab_stops().collect::<Vec<_>>(), vec![8, 16, 24]);
        assert!(matches!(
            screen.resize(0, 3),
            Err(TermptyError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_hard_reset() {
        let mut screen = screen(10, 2);
        print_str(&mut screen, "text");
        screen.linefeed();
        screen.linefeed();
        screen.set_dec_mode(2004, true);
        screen.set_scroll_region(0, 0);
        screen.hard_reset();
        assert_eq!(screen.text(), "\n");
        assert!(screen.backlog().is_empty());
        assert!(!screen.modes().bracketed_paste);
        assert_eq!((screen.cursor().row, screen.cursor().col), (0, 0));
    }

    #[test]
    fn test_repeat_last() {
        let mut screen = screen(10, 1);
        screen.print('x');
        screen.repeat_last(3);
        assert_eq!(screen.text(), "xxxx");
    }

    #[test]
    fn test_report_position_origin_mode() {
        let mut screen = screen(10, 10);
        screen.set_scroll_region(2, 8);
        screen.set_dec_mode(6, true);
        screen.move_to(1, 3);
        assert_eq!(screen.cursor().row, 3);
        assert_eq!(screen.report_position(), (2, 4));
    }
}
