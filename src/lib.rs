//! plankit - the in-memory model of a project plan
//!
//! [`ProjectFile`] holds every task, resource, assignment and calendar of a
//! plan with stable identity, keeps the ID and unique-ID indexes consistent,
//! and rebuilds the task hierarchy from the flat, outline-levelled rows that
//! file formats deliver.

pub mod domain;
pub mod project;
pub mod storage;
pub mod cli;

pub use domain::{AssignmentKey, CalendarKey, ResourceKey, Task, TaskKey};
pub use project::{ProjectError, ProjectEvent, ProjectFile, ProjectOptions};
