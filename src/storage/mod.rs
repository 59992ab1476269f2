//! # Storage Layer
//!
//! File collaborators around the in-memory registry.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Plan snapshot | JSON, or YAML by extension | any path given to the CLI |
//! | Config | TOML | `<config dir>/plankit/config.toml` or `--config` |
//!
//! ## Concurrency Safety
//!
//! - [`SnapshotStore`] takes a shared lock to read and an exclusive lock
//!   (`fs2`) to write
//! - Writes are atomic (temp file + rename)
//!
//! ## Key Types
//!
//! - [`SnapshotStore`] - Read/write a plan snapshot file
//! - [`PlanSnapshot`] - The serialized shape of a plan
//! - [`Config`] - Registry options and CLI preferences

mod config;
mod snapshot;
mod store;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat};
pub use snapshot::{
    AssignmentRecord, CalendarRecord, DayRecord, PlanSnapshot, RelationRecord, ResourceRecord,
    SnapshotError, TaskRecord,
};
pub use store::{SnapshotFormat, SnapshotStore};
