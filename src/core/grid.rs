//! Terminal Grid
//!
//! A fixed-size 2D store of cells. Every row mutation finishes with a
//! normalisation pass so that a wide lead cell is always followed by its
//! continuation and no continuation is left without a lead.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color};
use crate::error::{Result, TermptyError};

/// A row of cells in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The cells in this row
    pub cells: Vec<Cell>,
    /// Whether this row was soft-wrapped into the next one
    pub wrapped: bool,
}

impl Row {
    pub fn new(cols: usize) -> Self {
        Self::blank(cols, Color::Default)
    }

    /// A row of erased cells carrying `bg`
    pub fn blank(cols: usize, bg: Color) -> Self {
        Self {
            cells: vec![Cell::blank(bg); cols],
            wrapped: false,
        }
    }

    /// Like [`Row::new`] but reports allocation failure
    pub fn try_new(cols: usize) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(cols)
            .map_err(|e| TermptyError::alloc("grid row", e))?;
        cells.resize(cols, Cell::default());
        Ok(Self {
            cells,
            wrapped: false,
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Pad with blanks or truncate to `cols`
    pub fn resize(&mut self, cols: usize) -> Result<()> {
        if cols > self.cells.len() {
            self.cells
                .try_reserve_exact(cols - self.cells.len())
                .map_err(|e| TermptyError::alloc("grid row", e))?;
        }
        self.cells.resize(cols, Cell::default());
        self.normalize_wide();
        Ok(())
    }

    pub fn erase(&mut self, bg: Color) {
        for cell in &mut self.cells {
            cell.erase(bg);
        }
        self.wrapped = false;
    }

    /// Erase cells in `range` (clamped to the row)
    pub fn erase_range(&mut self, range: Range<usize>, bg: Color) {
        let end = range.end.min(self.cells.len());
        let start = range.start.min(end);
        for cell in &mut self.cells[start..end] {
            cell.erase(bg);
        }
        self.normalize_wide();
    }

    /// ICH: shift cells from `col` right by `n`, dropping what falls off
    pub fn insert_blanks(&mut self, col: usize, n: usize, bg: Color) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let n = n.min(len - col);
        self.cells[col..].rotate_right(n);
        for cell in &mut self.cells[col..col + n] {
            cell.erase(bg);
        }
        self.normalize_wide();
    }

    /// DCH: remove `n` cells at `col`, shifting the rest left
    pub fn delete_cells(&mut self, col: usize, n: usize, bg: Color) {
        let len = self.cells.len();
        if col >= len {
            return;
        }
        let n = n.min(len - col);
        self.cells[col..].rotate_left(n);
        for cell in &mut self.cells[len - n..] {
            cell.erase(bg);
        }
        self.normalize_wide();
    }

    /// Blank any wide lead without a continuation and any continuation
    /// without a lead. Orphans keep their background.
    pub fn normalize_wide(&mut self) {
        let len = self.cells.len();
        let mut i = 0;
        while i < len {
            match self.cells[i].width {
                2 if i + 1 < len && self.cells[i + 1].width == 0 => i += 2,
                1 => i += 1,
                _ => {
                    let bg = self.cells[i].attrs.bg;
                    self.cells[i].erase(bg);
                    i += 1;
                }
            }
        }
    }

    /// Number of cells up to and including the last non-blank one
    pub fn content_len(&self) -> usize {
        self.cells
            .iter()
            .rposition(|c| !c.is_blank())
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// The row as text, blanks as spaces, trailing spaces trimmed
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len());
        for cell in &self.cells {
            if cell.is_wide_continuation() {
                continue;
            }
            if cell.is_empty() {
                out.push(' ');
            } else {
                out.push_str(&cell.content);
            }
        }
        let trimmed = out.trim_end_matches(' ').len();
        out.truncate(trimmed);
        out
    }
}

/// The terminal grid - a 2D array of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Row>,
    cols: usize,
}

impl Grid {
    /// Allocate a blank grid; both dimensions must be non-zero
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(TermptyError::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(rows)
            .map_err(|e| TermptyError::alloc("grid rows", e))?;
        for _ in 0..rows {
            storage.push(Row::try_new(cols)?);
        }
        Ok(Self {
            rows: storage,
            cols,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Get a reference to a cell
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }

    /// Get a mutable reference to a cell. Callers that change widths must
    /// re-normalise the row.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col))
    }

    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    pub fn row_mut(&mut self, row: usize) -> Option<&mut Row> {
        self.rows.get_mut(row)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Replace one cell; positions outside the grid are rejected untouched
    pub fn write_cell(&mut self, row: usize, col: usize, cell: Cell) -> Result<()> {
        let (width, height) = (self.cols, self.rows.len());
        let target = self
            .rows
            .get_mut(row)
            .filter(|_| col < width)
            .ok_or(TermptyError::OutOfBounds {
                row,
                col,
                width,
                height,
            })?;
        target.cells[col] = cell;
        target.normalize_wide();
        Ok(())
    }

    /// Erase every cell with `bg`
    pub fn clear(&mut self, bg: Color) {
        for row in &mut self.rows {
            row.erase(bg);
        }
    }

    /// Erase whole rows in `range`
    pub fn erase_rows(&mut self, range: Range<usize>, bg: Color) {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        for row in &mut self.rows[start..end] {
            row.erase(bg);
        }
    }

    /// DECALN: fill the screen with `E`
    pub fn fill(&mut self, c: char) {
        for row in &mut self.rows {
            for cell in &mut row.cells {
                *cell = Cell::new(c);
            }
            row.wrapped = false;
        }
    }

    /// Scroll rows `top..=bottom` up by `n`. The rows moved out of the
    /// region are returned oldest first; blank rows fill in at the bottom.
    pub fn scroll_up(&mut self, top: usize, bottom: usize, n: usize, bg: Color) -> Vec<Row> {
        let Some(n) = self.region_count(top, bottom, n) else {
            return Vec::new();
        };
        let evicted: Vec<Row> = self.rows.drain(top..top + n).collect();
        let at = bottom + 1 - n;
        let cols = self.cols;
        self.rows
            .splice(at..at, std::iter::repeat_with(|| Row::blank(cols, bg)).take(n));
        evicted
    }

    /// Scroll rows `top..=bottom` down by `n`, discarding rows that fall
    /// off the bottom of the region
    pub fn scroll_down(&mut self, top: usize, bottom: usize, n: usize, bg: Color) {
        let Some(n) = self.region_count(top, bottom, n) else {
            return;
        };
        self.rows[top..=bottom].rotate_right(n);
        for row in &mut self.rows[top..top + n] {
            row.erase(bg);
        }
    }

    /// IL: insert `n` blank lines at `row`, pushing lines down to `bottom`
    pub fn insert_lines(&mut self, row: usize, bottom: usize, n: usize, bg: Color) {
        self.scroll_down(row, bottom, n, bg);
    }

    /// DL: delete `n` lines at `row`, pulling lines up from `bottom`
    pub fn delete_lines(&mut self, row: usize, bottom: usize, n: usize, bg: Color) {
        let Some(n) = self.region_count(row, bottom, n) else {
            return;
        };
        self.rows[row..=bottom].rotate_left(n);
        for r in &mut self.rows[bottom + 1 - n..=bottom] {
            r.erase(bg);
        }
    }

    fn region_count(&self, top: usize, bottom: usize, n: usize) -> Option<usize> {
        if n == 0 || top > bottom || bottom >= self.rows.len() {
            return None;
        }
        Some(n.min(bottom - top + 1))
    }

    /// Pad or truncate every row to `cols`
    pub fn set_cols(&mut self, cols: usize) -> Result<()> {
        for row in &mut self.rows {
            row.resize(cols)?;
        }
        self.cols = cols;
        Ok(())
    }

    /// Remove `n` rows from the top, returning them oldest first
    pub(crate) fn take_top(&mut self, n: usize) -> Vec<Row> {
        let n = n.min(self.rows.len());
        self.rows.drain(..n).collect()
    }

    /// Drop rows from the bottom until `len` remain
    pub(crate) fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
    }

    /// Insert rows above the current first row; `rows` is oldest first
    pub(crate) fn prepend(&mut self, rows: Vec<Row>) -> Result<()> {
        self.rows
            .try_reserve_exact(rows.len())
            .map_err(|e| TermptyError::alloc("grid rows", e))?;
        self.rows.splice(0..0, rows);
        Ok(())
    }

    /// Append blank rows until the grid has `len` rows
    pub(crate) fn extend_to(&mut self, len: usize) -> Result<()> {
        if len <= self.rows.len() {
            return Ok(());
        }
        self.rows
            .try_reserve_exact(len - self.rows.len())
            .map_err(|e| TermptyError::alloc("grid rows", e))?;
        while self.rows.len() < len {
            self.rows.push(Row::try_new(self.cols)?);
        }
        Ok(())
    }

    /// All rows as text
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(Row::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(grid: &mut Grid, row: usize, s: &str) {
        for (i, c) in s.chars().enumerate() {
            grid.write_cell(row, i, Cell::new(c)).unwrap();
        }
    }

    #[test]
    fn test_grid_new() {
        let grid = Grid::new(80, 24).unwrap();
        assert_eq!(grid.cols(), 80);
        assert_eq!(grid.rows(), 24);
        assert!(grid.cell(23, 79).unwrap().is_blank());
    }

    #[test]
    fn test_grid_rejects_zero_dimensions() {
        assert!(matches!(
            Grid::new(0, 24),
            Err(TermptyError::InvalidDimensions { width: 0, .. })
        ));
        assert!(Grid::new(80, 0).is_err());
    }

    #[test]
    fn test_write_cell_out_of_bounds() {
        let mut grid = Grid::new(10, 5).unwrap();
        let before = grid.clone();
        let err = grid.write_cell(5, 0, Cell::new('X')).unwrap_err();
        assert!(matches!(err, TermptyError::OutOfBounds { row: 5, .. }));
        assert!(grid.write_cell(0, 10, Cell::new('X')).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_grid_scroll_up() {
        let mut grid = Grid::new(10, 5).unwrap();
        letters(&mut grid, 0, "A");
        letters(&mut grid, 1, "B");

        let scrolled = grid.scroll_up(0, 4, 1, Color::Default);
        assert_eq!(scrolled.len(), 1);
        assert_eq!(scrolled[0].cells[0].content, "A");
        assert_eq!(grid.cell(0, 0).unwrap().content, "B");
        assert!(grid.cell(4, 0).unwrap().is_empty());
        assert_eq!(grid.rows(), 5);
    }

    #[test]
    fn test_scroll_up_within_region() {
        let mut grid = Grid::new(4, 5).unwrap();
        for (r, s) in ["A", "B", "C", "D", "E"].iter().enumerate() {
            letters(&mut grid, r, s);
        }
        let evicted = grid.scroll_up(1, 3, 2, Color::Default);
        assert_eq!(evicted.len(), 2);
        assert_eq!(grid.text(), "A\nD\n\n\nE");
    }

    #[test]
    fn test_grid_scroll_down() {
        let mut grid = Grid::new(4, 5).unwrap();
        letters(&mut grid, 0, "A");
        letters(&mut grid, 4, "Z");

        grid.scroll_down(0, 4, 1, Color::Default);
        assert!(grid.cell(0, 0).unwrap().is_empty());
        assert_eq!(grid.cell(1, 0).unwrap().content, "A");
        assert_eq!(grid.text(), "\nA\n\n\n");
    }

    #[test]
    fn test_insert_delete_lines() {
        let mut grid = Grid::new(4, 4).unwrap();
        for (r, s) in ["A", "B", "C", "D"].iter().enumerate() {
            letters(&mut grid, r, s);
        }
        grid.insert_lines(1, 2, 1, Color::Default);
        assert_eq!(grid.text(), "A\n\nB\nD");

        grid.delete_lines(0, 3, 2, Color::Default);
        assert_eq!(grid.text(), "B\nD\n\n");
    }

    #[test]
    fn test_row_content_len() {
        let mut row = Row::new(80);
        assert_eq!(row.content_len(), 0);

        row.cells[5] = Cell::new('A');
        assert_eq!(row.content_len(), 6);

        row.cells[10] = Cell::new('B');
        assert_eq!(row.content_len(), 11);
    }

    #[test]
    fn test_insert_delete_chars() {
        let mut grid = Grid::new(10, 1).unwrap();
        letters(&mut grid, 0, "ABCDE");

        grid.row_mut(0).unwrap().insert_blanks(2, 2, Color::Default);
        assert_eq!(grid.row(0).unwrap().text(), "AB  CDE");

        grid.row_mut(0).unwrap().delete_cells(1, 3, Color::Default);
        assert_eq!(grid.row(0).unwrap().text(), "ACDE");
    }

    #[test]
    fn test_erase_range_splits_wide_char() {
        let mut row = Row::new(6);
        row.cells[2] = Cell::new('中');
        row.cells[3] = Cell::continuation(row.cells[2].attrs);
        row.erase_range(3..6, Color::Default);
        assert!(row.cells[2].is_blank());
        assert!(row.cells[3].is_blank());
    }

    #[test]
    fn test_delete_cells_splits_wide_char() {
        let mut row = Row::new(4);
        row.cells[0] = Cell::new('中');
        row.cells[1] = Cell::continuation(row.cells[0].attrs);
        row.cells[2] = Cell::new('x');
        row.delete_cells(0, 1, Color::Default);
        assert!(!row.cells.iter().any(|c| c.width == 0));
        assert_eq!(row.text(), " x");
    }

    #[test]
    fn test_resize_truncates_wide_at_edge() {
        let mut row = Row::new(4);
        row.cells[2] = Cell::new('中');
        row.cells[3] = Cell::continuation(row.cells[2].attrs);
        row.resize(3).unwrap();
        assert_eq!(row.len(), 3);
        assert!(row.cells[2].is_blank());
    }

    #[test]
    fn test_grid_set_cols() {
        let mut grid = Grid::new(10, 3).unwrap();
        letters(&mut grid, 0, "HELLO");
        grid.set_cols(3).unwrap();
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.row(0).unwrap().text(), "HEL");
        grid.set_cols(12).unwrap();
        assert_eq!(grid.row(0).unwrap().len(), 12);
        assert_eq!(grid.row(0).unwrap().text(), "HEL");
    }
}
