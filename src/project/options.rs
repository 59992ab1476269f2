//! Behaviour switches for a project registry
//!
//! These are plain serde structs so the storage layer can load them from
//! TOML; the registry itself never touches the filesystem.

use serde::{Deserialize, Serialize};

use crate::domain::{DEFAULT_BASE_CALENDAR_NAME, MAX_UNIQUE_ID};

/// Label and level generation during structure rebuilds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureOptions {
    /// Regenerate WBS labels on every rebuild
    pub auto_wbs: bool,

    /// Set outline level on programmatically created child tasks
    pub auto_outline_level: bool,

    /// Regenerate outline numbers on every rebuild
    pub auto_outline_number: bool,
}

impl Default for StructureOptions {
    fn default() -> Self {
        Self {
            auto_wbs: true,
            auto_outline_level: true,
            auto_outline_number: true,
        }
    }
}

/// Identity assignment on entity creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityOptions {
    pub auto_task_id: bool,
    pub auto_task_unique_id: bool,
    pub auto_resource_id: bool,
    pub auto_resource_unique_id: bool,
    pub auto_calendar_unique_id: bool,
    pub auto_assignment_unique_id: bool,

    /// Largest unique ID accepted before a kind is renumbered
    pub unique_id_ceiling: u32,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            auto_task_id: true,
            auto_task_unique_id: true,
            auto_resource_id: true,
            auto_resource_unique_id: true,
            auto_calendar_unique_id: true,
            auto_assignment_unique_id: true,
            unique_id_ceiling: MAX_UNIQUE_ID,
        }
    }
}

impl IdentityOptions {
    /// Options for a format reader that supplies every identity itself
    pub fn manual() -> Self {
        Self {
            auto_task_id: false,
            auto_task_unique_id: false,
            auto_resource_id: false,
            auto_resource_unique_id: false,
            auto_calendar_unique_id: false,
            auto_assignment_unique_id: false,
            ..Self::default()
        }
    }
}

/// Calendar lookup defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarOptions {
    /// Calendar used by `duration` when no name is given
    pub default_name: String,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_BASE_CALENDAR_NAME.to_string(),
        }
    }
}

/// All registry options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOptions {
    pub structure: StructureOptions,
    pub identity: IdentityOptions,
    pub calendar: CalendarOptions,
}
