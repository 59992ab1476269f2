//! Task domain model
//!
//! Tasks form the project hierarchy. The parent and child links are handles
//! into the project's task arena; the project keeps them consistent with the
//! flat task list, so they are read-only outside the crate.

use chrono::NaiveDateTime;

use super::id::{AssignmentKey, TaskKey};

/// A task within a project
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub(crate) key: TaskKey,
    pub(crate) id: Option<u32>,
    pub(crate) unique_id: Option<u32>,
    pub(crate) parent: Option<TaskKey>,
    pub(crate) children: Vec<TaskKey>,
    pub(crate) assignments: Vec<AssignmentKey>,

    /// Task name
    pub name: Option<String>,

    /// Depth in the hierarchy, 1 = top level
    pub outline_level: Option<u32>,

    /// Work breakdown structure label
    pub wbs: Option<String>,

    /// Outline number label (e.g. `1.2.3`)
    pub outline_number: Option<String>,

    /// Placeholder row with no real content
    pub null: bool,

    /// Zero-length marker task
    pub milestone: bool,

    /// Planned start
    pub start: Option<NaiveDateTime>,

    /// Planned finish
    pub finish: Option<NaiveDateTime>,

    /// Actual start
    pub actual_start: Option<NaiveDateTime>,

    /// Actual finish
    pub actual_finish: Option<NaiveDateTime>,
}

impl Task {
    pub(crate) fn new(key: TaskKey) -> Self {
        Self {
            key,
            id: None,
            unique_id: None,
            parent: None,
            children: Vec::new(),
            assignments: Vec::new(),
            name: None,
            outline_level: None,
            wbs: None,
            outline_number: None,
            null: false,
            milestone: false,
            start: None,
            finish: None,
            actual_start: None,
            actual_finish: None,
        }
    }

    /// Returns the arena handle
    pub fn key(&self) -> TaskKey {
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

    /// Returns the parent task, or None for a top-level task
    pub fn parent(&self) -> Option<TaskKey> {
        self.parent
    }

    /// Returns the child tasks in order
    pub fn children(&self) -> &[TaskKey] {
        &self.children
    }

    /// Returns the assignments on this task
    pub fn assignments(&self) -> &[AssignmentKey] {
        &self.assignments
    }

    /// Returns true if this is a placeholder task
    pub fn is_null(&self) -> bool {
        self.null
    }

    /// Returns true if this task has children
    pub fn is_summary(&self) -> bool {
        !self.children.is_empty()
    }

    /// Returns true if this is the hidden root task (unique ID 0)
    pub fn is_hidden_root(&self) -> bool {
        self.unique_id == Some(0)
    }

    /// Sets the task name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Effective start used for project span: actual before planned,
    /// and the finish date for milestones
    pub fn effective_start(&self) -> Option<NaiveDateTime> {
        if self.milestone {
            self.actual_finish.or(self.finish)
        } else {
            self.actual_start.or(self.start)
        }
    }

    /// Effective finish used for project span
    pub fn effective_finish(&self) -> Option<NaiveDateTime> {
        self.actual_finish.or(self.finish)
    }
}

/// Derives a hierarchical label (WBS or outline number) for a task
///
/// `position` is the 1-based slot the task takes among its siblings.
/// Top-level labels are the position, except for the hidden root which is
/// always `"0"`. Child labels extend the parent label; a trailing `.0` on the
/// parent is dropped, and a parent labelled `"0"` yields plain positions.
pub fn derive_label(
    parent_label: Option<Option<&str>>,
    position: usize,
    hidden_root: bool,
) -> String {
    match parent_label {
        None if hidden_root => "0".to_string(),
        None => position.to_string(),
        Some(label) => {
            let base = label.unwrap_or("0");
            let base = base.strip_suffix(".0").unwrap_or(base);
            if base == "0" || base.is_empty() {
                position.to_string()
            } else {
                format!("{}.{}", base, position)
            }
        }
    }
}
