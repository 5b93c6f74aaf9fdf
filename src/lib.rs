//! Termpty Terminal-State Engine
//!
//! Turns the byte stream a child process writes to its pseudo-terminal into
//! a grid of character cells, cursor and mode state, and a scrollback
//! history. This crate provides:
//!
//! - `core`: Screen model, cells, cursor, grids, backlog
//! - `parser`: VT/xterm escape sequence parser
//! - `termpty`: The session façade, sequence dispatch and checksums
//! - `headless`: A driver that feeds a session from any reader
//!
//! Rendering, PTY plumbing and process management are left to the caller.

pub mod config;
pub mod core;
pub mod error;
pub mod headless;
pub mod parser;
pub mod termpty;

pub use config::TermptyConfig;
pub use core::Snapshot;
pub use error::{Result, TermptyError};
pub use termpty::Termpty;
