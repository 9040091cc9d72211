//! # Studio CLI
//!
//! Headless driver for `studio-core`: create pages, check them against the
//! structural invariants, and replay recorded input against a page.
//!
//! ## Usage
//!
//! ```bash
//! studio new --width 1080 --height 1350 --out page.json
//! studio validate page.json
//! studio replay page.json events.json --out edited.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `load_config` - `EditorConfig` from file, environment and flags
//! - `replay` / `validate` - The operations behind each subcommand

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use studio_core::{Editor, EditorConfig, EditorError, InputEvent, Page, PageViolation};
use thiserror::Error;

/// Errors surfaced by CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A document failed to parse or a config was rejected.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// An events file failed to parse.
    #[error("Invalid events file {path}: {source}")]
    Events {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Command-line arguments for studio.
#[derive(Debug, Clone, Parser)]
#[command(name = "studio")]
#[command(about = "Headless page editor: create, validate and replay edits")]
#[command(version)]
pub struct CliArgs {
    /// Editor config file (JSON)
    #[arg(long, global = true, env = "STUDIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the minimum layer width/height
    #[arg(long, global = true)]
    pub min_layer_size: Option<f32>,

    /// Override the maximum number of undo steps kept
    #[arg(long, global = true)]
    pub history_limit: Option<usize>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Studio subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print an empty page as JSON
    New {
        /// Page width in pixels
        #[arg(long, default_value = "1080")]
        width: f32,
        /// Page height in pixels
        #[arg(long, default_value = "1080")]
        height: f32,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check a page against the structural invariants
    Validate {
        /// Page JSON file
        page: PathBuf,
    },

    /// Replay recorded input events against a page
    Replay {
        /// Page JSON file
        page: PathBuf,
        /// JSON array of input events
        events: PathBuf,
        /// Write the edited page here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Repair the page before replaying instead of rejecting it
        #[arg(long)]
        normalize: bool,
    },
}

/// Summary of a replay run.
#[derive(Debug, Clone)]
pub struct ReplayOutcome {
    /// The page after every event was applied.
    pub page: Page,
    /// Number of events read.
    pub events: usize,
    /// Events that changed the page, selection or view.
    pub effective: usize,
    /// Undo steps available at the end.
    pub undo_depth: usize,
}

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_or_print(out: Option<&Path>, contents: &str, stdout: &mut impl Write) -> CliResult<()> {
    match out {
        Some(path) => std::fs::write(path, contents).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            writeln!(stdout, "{contents}")?;
            Ok(())
        }
    }
}

/// Build the editor config: defaults, then the config file, then flags.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or the result is invalid.
pub fn load_config(args: &CliArgs) -> CliResult<EditorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            EditorConfig::from_json(&read(path)?)?
        }
        None => EditorConfig::default(),
    };
    if let Some(min) = args.min_layer_size {
        config.min_layer_size = min;
    }
    if let Some(limit) = args.history_limit {
        config.history_limit = Some(limit);
    }
    config.validate()?;
    Ok(config)
}

/// Read a page file and list every invariant it breaks.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn validate(path: &Path, config: &EditorConfig) -> CliResult<Vec<PageViolation>> {
    let page = Page::from_json(&read(path)?)?;
    Ok(page.violations(config.min_layer_size))
}

/// Replay `events` against `page` and return the edited page.
///
/// A gesture still in flight after the last event is cancelled.
///
/// # Errors
///
/// Returns an error if the page is invalid and `normalize` is off.
pub fn replay(
    page: Page,
    events: &[InputEvent],
    config: EditorConfig,
    normalize: bool,
) -> CliResult<ReplayOutcome> {
    let page = if normalize {
        let violations = page.violations(config.min_layer_size);
        if !violations.is_empty() {
            tracing::warn!("Normalizing page with {} violations", violations.len());
        }
        page.normalized(config.min_layer_size)
    } else {
        page.validate(config.min_layer_size)?;
        page
    };

    let mut editor = Editor::with_config(page, config);
    let mut effective = 0;
    for (index, event) in events.iter().enumerate() {
        if editor.handle_event(event) {
            effective += 1;
        } else {
            tracing::trace!("Event {index} had no effect");
        }
    }
    if editor.cancel_interaction() {
        tracing::warn!("Replay ended mid-gesture; the gesture was discarded");
    }

    Ok(ReplayOutcome {
        page: editor.page().clone(),
        events: events.len(),
        effective,
        undo_depth: editor.history().past_len(),
    })
}

/// Run a parsed command line. Returns `false` when validation found problems.
///
/// # Errors
///
/// Returns an error if any file cannot be read, parsed or written.
pub fn run(args: &CliArgs, stdout: &mut impl Write) -> CliResult<bool> {
    let config = load_config(args)?;
    match &args.command {
        Command::New { width, height, out } => {
            let page = Page::new(*width, *height);
            page.validate(config.min_layer_size)?;
            write_or_print(out.as_deref(), &page.to_json()?, stdout)?;
            Ok(true)
        }
        Command::Validate { page } => {
            let violations = validate(page, &config)?;
            for violation in &violations {
                writeln!(stdout, "{}: {violation}", page.display())?;
            }
            if violations.is_empty() {
                writeln!(stdout, "{}: ok", page.display())?;
            }
            Ok(violations.is_empty())
        }
        Command::Replay {
            page,
            events,
            out,
            normalize,
        } => {
            let initial = Page::from_json(&read(page)?)?;
            let recorded: Vec<InputEvent> =
                serde_json::from_str(&read(events)?).map_err(|source| CliError::Events {
                    path: events.clone(),
                    source,
                })?;
            let outcome = replay(initial, &recorded, config, *normalize)?;
            tracing::info!(
                "Replayed {} events ({} effective), {} undo steps",
                outcome.events,
                outcome.effective,
                outcome.undo_depth
            );
            write_or_print(out.as_deref(), &outcome.page.to_json()?, stdout)?;
            Ok(true)
        }
    }
}
