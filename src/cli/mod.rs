//! # Command-Line Interface
//!
//! Inspection and maintenance commands over plan snapshot files.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `tree` | Print the task hierarchy with WBS labels |
//! | `stats` | Count tasks, resources, assignments, calendars, relations |
//! | `renumber` | Dense IDs, optionally in hierarchy order |
//! | `validate` | Renumber unique IDs above the ceiling |
//! | `remove-task`, `remove-resource` | Cascade removal |
//! | `span` | Project start, finish and working duration |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! Without the flag the `[output] default_format` config value applies.
//!
//! ## Logging
//!
//! Logs go to stderr through `tracing`. `--verbose` raises the default level
//! to debug; `RUST_LOG` overrides both.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod plan;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
