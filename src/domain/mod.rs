//! Domain models for plankit
//!
//! Entities, handles and the value types they carry. No registry logic and
//! no I/O lives here.

mod arena;
mod assignment;
mod calendar;
mod fields;
mod graph;
mod id;
mod relation;
mod resource;
mod task;

pub use arena::Arena;
pub use assignment::{ResourceAssignment, DEFAULT_UNITS};
pub use calendar::{
    working_minutes_between, Day, DayType, Duration, ProjectCalendar, TimeUnit, WorkingRange,
    BASELINE_CALENDAR_NAME, DEFAULT_BASE_CALENDAR_NAME, MINUTES_PER_DAY,
};
pub use fields::{FieldType, ResourceField, TaskField};
pub use graph::{RelationError, RelationGraph};
pub use id::{ArenaKey, AssignmentKey, CalendarKey, EntityKind, ResourceKey, TaskKey, MAX_UNIQUE_ID};
pub use relation::{Relation, RelationType};
pub use resource::Resource;
pub use task::{derive_label, Task};
