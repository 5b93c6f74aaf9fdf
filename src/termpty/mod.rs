//! The terminal session
//!
//! [`Termpty`] ties the parser to the screen: bytes written by the child
//! process go in through [`Termpty::feed`], reply bytes for the child come
//! out of [`Termpty::take_write_buffer`], and renderers read cells, the
//! cursor and the backlog through the query methods.
//!
//! All mutators take `&mut self`, so feeding, resizing and changing the
//! backlog capacity can never overlap. Wrap the session in a `Mutex` to
//! share it between a reader thread and a renderer.

mod checksum;
mod dispatch;
mod sgr;

pub use sgr::{parse_sgr, SgrAttribute};

use sha2::{Digest, Sha256};

use crate::config::TermptyConfig;
use crate::core::{Backlog, Cell, Cursor, Modes, Screen, Snapshot};
use crate::error::Result;
use crate::parser::Parser;

use checksum::SessionProps;
use dispatch::Dispatcher;

/// A terminal session: parser, screen and pending replies
#[derive(Debug, Clone)]
pub struct Termpty {
    parser: Parser,
    state: Dispatcher,
}

impl Termpty {
    /// Create a session with blank grids and an empty backlog
    pub fn new(width: usize, height: usize, backlog_capacity: usize) -> Result<Self> {
        let screen = Screen::new(width, height, backlog_capacity)?;
        tracing::debug!(width, height, backlog_capacity, "session created");
        Ok(Self {
            parser: Parser::new(),
            state: Dispatcher::new(screen),
        })
    }

    /// Create a session from a validated configuration
    pub fn with_config(config: &TermptyConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.cols, config.rows, config.backlog_capacity)
    }

    /// Consume bytes from the child process. Sequences may be split across
    /// calls at any byte.
    pub fn feed(&mut self, data: &[u8]) {
        let state = &mut self.state;
        self.parser.parse(data, |action| state.dispatch(action));
    }

    /// Drain the reply bytes queued for the child process
    pub fn take_write_buffer(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.state.write_buffer)
    }

    /// Reply bytes queued so far, without draining them
    pub fn write_buffer(&self) -> &[u8] {
        &self.state.write_buffer
    }

    /// Replace a cell of the active grid directly
    pub fn write_cell(&mut self, row: usize, col: usize, cell: Cell) -> Result<()> {
        self.state.screen.write_cell(row, col, cell)
    }

    /// Resize both grids. On error the session must be dropped.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        self.state.screen.resize(width, height)
    }

    pub fn set_backlog_capacity(&mut self, capacity: usize) -> Result<()> {
        self.state.screen.set_backlog_capacity(capacity)
    }

    /// End the session, releasing grids, backlog and buffers
    pub fn destroy(self) {
        tracing::debug!(
            width = self.cols(),
            height = self.rows(),
            "session destroyed"
        );
    }

    // --- Queries -----------------------------------------------------------

    pub fn cols(&self) -> usize {
        self.state.screen.cols()
    }

    pub fn rows(&self) -> usize {
        self.state.screen.rows()
    }

    pub fn screen(&self) -> &Screen {
        &self.state.screen
    }

    /// Cell of the active grid, `None` outside it
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.state.screen.cell(row, col)
    }

    pub fn cursor(&self) -> &Cursor {
        self.state.screen.cursor()
    }

    /// Cursor position as `(row, col)`, 0-indexed
    pub fn cursor_position(&self) -> (usize, usize) {
        let cursor = self.cursor();
        (cursor.row, cursor.col)
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor().visible
    }

    pub fn modes(&self) -> &Modes {
        self.state.screen.modes()
    }

    pub fn title(&self) -> Option<&str> {
        self.state.title.as_deref()
    }

    pub fn icon_name(&self) -> Option<&str> {
        self.state.icon_name.as_deref()
    }

    pub fn backlog(&self) -> &Backlog {
        self.state.screen.backlog()
    }

    /// Text of one row of the active grid, trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.state.screen.grid().row(row).map(|r| r.text())
    }

    /// Text of the whole active grid, one line per row
    pub fn screen_text(&self) -> String {
        self.state.screen.text()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_screen(&self.state.screen, self.title(), self.icon_name())
    }

    /// BEL characters received so far
    pub fn bell_count(&self) -> u64 {
        self.state.bell_count
    }

    // --- Fingerprints ------------------------------------------------------

    /// Digest of everything: grids, cursor, modes, backlog counters, icon
    /// and title, cursor shape and pending replies
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        checksum::hash_visible(&mut hasher, &self.state.screen);
        checksum::hash_session(&mut hasher, &self.state.screen, &self.props());
        checksum::finish(hasher)
    }

    /// Digest of what a renderer could show: grids, cursor, dimensions
    /// and modes
    pub fn visible_checksum(&self) -> String {
        let mut hasher = Sha256::new();
        checksum::hash_visible(&mut hasher, &self.state.screen);
        checksum::finish(hasher)
    }

    /// Digest of the remaining session state
    pub fn session_checksum(&self) -> String {
        let mut hasher = Sha256::new();
        checksum::hash_session(&mut hasher, &self.state.screen, &self.props());
        checksum::finish(hasher)
    }

    fn props(&self) -> SessionProps<'_> {
        SessionProps {
            title: self.title(),
            icon_name: self.icon_name(),
            cursor_shape: self.cursor().shape,
            write_buffer: &self.state.write_buffer,
        }
    }
}
