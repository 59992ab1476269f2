//! Resource assignment domain model
//!
//! An assignment links one task to at most one resource. The links are
//! handles, so the unique IDs they resolve to follow any renumbering of the
//! task or resource.

use super::calendar::Duration;
use super::id::{AssignmentKey, ResourceKey, TaskKey};

/// Default assignment units (percent)
pub const DEFAULT_UNITS: f64 = 100.0;

/// Work allocated to a resource on a task
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceAssignment {
    pub(crate) key: AssignmentKey,
    pub(crate) unique_id: Option<u32>,
    pub(crate) task: TaskKey,
    pub(crate) resource: Option<ResourceKey>,

    /// Allocation in percent
    pub units: f64,

    /// Planned work
    pub work: Option<Duration>,
}

impl ResourceAssignment {
    pub(crate) fn new(key: AssignmentKey, task: TaskKey, resource: Option<ResourceKey>) -> Self {
        Self {
            key,
            unique_id: None,
            task,
            resource,
            units: DEFAULT_UNITS,
            work: None,
        }
    }

    /// Returns the arena handle
    pub fn key(&self) -> AssignmentKey {
        self.key
    }

    /// Returns the durable unique ID
    pub fn unique_id(&self) -> Option<u32> {
        self.unique_id
    }

    /// Returns the owning task
    pub fn task(&self) -> TaskKey {
        self.task
    }

    /// Returns the assigned resource, if any
    pub fn resource(&self) -> Option<ResourceKey> {
        self.resource
    }
}
