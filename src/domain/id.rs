//! Entity handles and identity values
//!
//! Every entity lives in an arena owned by the project and is addressed by a
//! handle (`TaskKey`, `ResourceKey`, ...). Handles are minted once and never
//! reused, so they stay valid across renumbering.
//!
//! Handles are distinct from the two integer identities an entity carries:
//! - `id`: presentation order, dense, reassigned by renumbering
//! - `unique_id`: durable cross-reference key
//!
//! Handle display format: `{prefix}#{index}` (e.g., `task#3`)

use std::fmt;
use std::hash::Hash;

/// Largest unique ID a bounded-range host accepts
pub const MAX_UNIQUE_ID: u32 = 0x1F_FFFF;

/// A stable arena handle
pub trait ArenaKey: Copy + Eq + Hash + fmt::Debug {
    /// Creates a handle from an arena slot index
    fn from_index(index: usize) -> Self;

    /// Returns the arena slot index
    fn index(self) -> usize;
}

macro_rules! entity_key {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl ArenaKey for $name {
            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_key!(
    /// Handle to a task
    TaskKey,
    "task"
);
entity_key!(
    /// Handle to a resource
    ResourceKey,
    "resource"
);
entity_key!(
    /// Handle to a resource assignment
    AssignmentKey,
    "assignment"
);
entity_key!(
    /// Handle to a calendar
    CalendarKey,
    "calendar"
);

/// The four entity kinds held by a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Task,
    Resource,
    Assignment,
    Calendar,
}

impl EntityKind {
    /// All kinds in registry scan order
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Task,
        EntityKind::Resource,
        EntityKind::Assignment,
        EntityKind::Calendar,
    ];

    /// Returns a display label for the kind
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Resource => "resource",
            EntityKind::Assignment => "assignment",
            EntityKind::Calendar => "calendar",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
