//! Resource domain model

use super::id::{AssignmentKey, CalendarKey, ResourceKey};

/// A person, material or cost that can be assigned to tasks
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub(crate) key: ResourceKey,
    pub(crate) id: Option<u32>,
    pub(crate) unique_id: Option<u32>,
    pub(crate) calendar: Option<CalendarKey>,
    pub(crate) assignments: Vec<AssignmentKey>,

    /// Resource name
    pub name: Option<String>,

    /// Short initials shown in views
    pub initials: Option<String>,
}

impl Resource {
    pub(crate) fn new(key: ResourceKey) -> Self {
        Self {
            key,
            id: None,
            unique_id: None,
            calendar: None,
            assignments: Vec::new(),
            name: None,
            initials: None,
        }
    }

    /// Returns the arena handle
    pub fn key(&self) -> ResourceKey {
        self.key
    }

    /// Returns the presentation ID
    pub fn id(&self) -> Option<u32> {
        self.id
    }

    /// Returns the durable unique ID
    pub fn unique_id(&self) -> Option<u32> {
        self.unique_id
    }

    /// Returns the resource's own working calendar
    pub fn calendar(&self) -> Option<CalendarKey> {
        self.calendar
    }

    /// Returns the assignments held by this resource
    pub fn assignments(&self) -> &[AssignmentKey] {
        &self.assignments
    }

    /// Sets the resource name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }
}
