//! Termpty Headless Runner
//!
//! Feeds a byte stream from stdin or a file into a session and prints the
//! final state. With no options it prints the session checksum.
//!
//! # Usage
//!
//! ```bash
//! printf 'Hello\x1b[31mRed\x1b[0m' | termpty-headless
//! termpty-headless --cols 132 --rows 43 --format text capture.bin
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use termpty::headless::{self, OutputFormat};
use termpty::TermptyConfig;

/// Headless terminal-state engine for testing and automation
#[derive(Debug, Parser)]
#[command(name = "termpty-headless", version)]
struct Args {
    /// Input file (stdin if not specified)
    input: Option<PathBuf>,

    /// Terminal columns
    #[arg(short, long, default_value_t = 80)]
    cols: usize,

    /// Terminal rows
    #[arg(short, long, default_value_t = 24)]
    rows: usize,

    /// Scrollback capacity in rows
    #[arg(short, long, default_value_t = 2000)]
    backlog: usize,

    /// Bytes fed per read
    #[arg(long, default_value_t = 4096)]
    chunk_size: usize,

    /// What to print once the input is consumed
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Checksum)]
    format: OutputFormat,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();
    let config = TermptyConfig {
        cols: args.cols,
        rows: args.rows,
        backlog_capacity: args.backlog,
        chunk_size: args.chunk_size,
    };

    let result = match &args.input {
        Some(path) => headless::run_file(&config, path),
        None => headless::run(&config, io::stdin().lock()),
    };

    let output = result.and_then(|termpty| headless::render(&termpty, args.format));
    match output {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "headless run failed");
            eprintln!("termpty-headless: {}", e);
            ExitCode::FAILURE
        }
    }
}
