//! Headless driver
//!
//! Runs a session without a PTY or renderer: bytes are read from any
//! [`Read`] source in fixed-size chunks, fed to a [`Termpty`], and the final
//! state is rendered as a checksum, plain text or a JSON snapshot. Used by
//! the `termpty-headless` binary and by tests.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::config::TermptyConfig;
use crate::error::Result;
use crate::termpty::Termpty;

/// How the final state is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Combined session checksum (64 hex digits)
    #[default]
    Checksum,
    /// Active grid as plain text
    Text,
    /// Full snapshot as pretty-printed JSON
    Json,
}

/// Feed everything `reader` yields into a new session
pub fn run<R: Read>(config: &TermptyConfig, mut reader: R) -> Result<Termpty> {
    let mut termpty = Termpty::with_config(config)?;
    let mut buf = vec![0u8; config.chunk_size];
    let mut total = 0usize;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        termpty.feed(&buf[..n]);
        total += n;
    }

    tracing::debug!(bytes = total, "input consumed");
    Ok(termpty)
}

/// Feed the contents of a file into a new session
pub fn run_file(config: &TermptyConfig, path: &Path) -> Result<Termpty> {
    let file = File::open(path)?;
    run(config, file)
}

/// Render the session in the requested format
pub fn render(termpty: &Termpty, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Checksum => termpty.checksum(),
        OutputFormat::Text => termpty.screen_text(),
        OutputFormat::Json => termpty.snapshot().to_json()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const INPUT: &[u8] = b"\x1b[1;32mgreen\x1b[0m\r\n\x1b]2;headless\x07\xe4\xb8\xad\xe6\x96\x87";

    fn config(chunk_size: usize) -> TermptyConfig {
        TermptyConfig {
            cols: 20,
            rows: 4,
            chunk_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_from_reader() {
        let termpty = run(&config(4096), Cursor::new(INPUT)).unwrap();
        assert_eq!(termpty.row_text(0).unwrap(), "green");
        assert_eq!(termpty.row_text(1).unwrap(), "中文");
        assert_eq!(termpty.title(), Some("headless"));
    }

    #[test]
    fn test_chunk_size_does_not_matter() {
        let whole = run(&config(4096), Cursor::new(INPUT)).unwrap();
        for chunk_size in [1, 2, 3, 7] {
            let chunked = run(&config(chunk_size), Cursor::new(INPUT)).unwrap();
            assert_eq!(chunked.checksum(), whole.checksum(), "chunk {}", chunk_size);
        }
    }

    #[test]
    fn test_run_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(INPUT).unwrap();
        file.flush().unwrap();

        let from_file = run_file(&config(16), file.path()).unwrap();
        let from_memory = run(&config(16), Cursor::new(INPUT)).unwrap();
        assert_eq!(from_file.checksum(), from_memory.checksum());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_file(&config(16), &dir.path().join("missing.bin"));
        assert!(matches!(result, Err(crate::TermptyError::Io(_))));
    }

    #[test]
    fn test_invalid_config() {
        assert!(run(&config(0), Cursor::new(INPUT)).is_err());
    }

    #[test]
    fn test_render_formats() {
        let termpty = run(&config(4096), Cursor::new(INPUT)).unwrap();

        let checksum = render(&termpty, OutputFormat::Checksum).unwrap();
        assert_eq!(checksum.len(), 64);
        assert!(checksum.chars().all(|c| c.is_ascii_hexdigit()));

        let text = render(&termpty, OutputFormat::Text).unwrap();
        assert!(text.starts_with("green\n中文"));

        let json = render(&termpty, OutputFormat::Json).unwrap();
        let snapshot = crate::Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.title.as_deref(), Some("headless"));
    }
}
