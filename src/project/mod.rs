//! # Project Registry
//!
//! [`ProjectFile`] is the authoritative in-memory model of one project plan.
//! It owns every task, resource, assignment and calendar, and keeps the
//! following consistent under every public operation:
//!
//! - the flat "all" list of each kind
//! - the ID and unique-ID indexes of each kind
//! - the task forest (top-level list plus each task's child list)
//! - the assignment lists held by tasks and resources
//!
//! ## Submodules
//!
//! | Module | Operations |
//! |--------|------------|
//! | `identity` | ID/unique-ID setters, counters, renumbering, ceiling validation |
//! | `hierarchy` | structure rebuild, flatten-to-IDs, tree navigation |
//! | `cascade` | removal with transitive cleanup |
//! | `events` | read/written notifications to listeners |
//! | `schedule` | calendars, durations, project span, relations |
//! | `metadata` | filters, groups, tables, views, aliases |
//!
//! ## Single writer
//!
//! Every mutating operation takes `&mut self`, so the borrow checker rules
//! out concurrent structural mutation. Listeners only ever see shared
//! borrows of entities and cannot mutate the registry during dispatch.

mod cascade;
mod events;
mod header;
mod hierarchy;
mod identity;
mod metadata;
mod options;
mod registry;
mod schedule;

use thiserror::Error;

use crate::domain::{
    Arena, AssignmentKey, CalendarKey, ProjectCalendar, RelationGraph, Resource,
    ResourceAssignment, ResourceKey, Task, TaskKey,
};

pub use events::{EventDispatcher, Listener, ListenerId, ProjectEvent};
pub use header::ProjectHeader;
pub use metadata::{
    Filter, GraphicalIndicator, Group, IndicatorCriterion, ProjectMetadata, SubProject, Table,
    View, ViewState,
};
pub use options::{CalendarOptions, IdentityOptions, ProjectOptions, StructureOptions};
pub use registry::{Counter, Counters, IdIndex};

#[derive(Debug, Error, PartialEq)]
pub enum ProjectError {
    #[error("Configuration error: calendar '{0}' not found")]
    Configuration(String),
}

/// A loaded project plan
#[derive(Debug, Default)]
pub struct ProjectFile {
    options: ProjectOptions,
    header: ProjectHeader,
    counters: Counters,

    tasks: Arena<TaskKey, Task>,
    all_tasks: Vec<TaskKey>,
    child_tasks: Vec<TaskKey>,
    task_ids: IdIndex<TaskKey>,
    task_unique_ids: IdIndex<TaskKey>,

    resources: Arena<ResourceKey, Resource>,
    all_resources: Vec<ResourceKey>,
    resource_ids: IdIndex<ResourceKey>,
    resource_unique_ids: IdIndex<ResourceKey>,

    assignments: Arena<AssignmentKey, ResourceAssignment>,
    all_assignments: Vec<AssignmentKey>,
    assignment_unique_ids: IdIndex<AssignmentKey>,

    calendars: Arena<CalendarKey, ProjectCalendar>,
    all_calendars: Vec<CalendarKey>,
    calendar_unique_ids: IdIndex<CalendarKey>,

    relations: RelationGraph,
    events: EventDispatcher,
    metadata: ProjectMetadata,
}

macro_rules! option_flag {
    ($group:ident, $get:ident, $set:ident, $doc:literal) => {
        #[doc = concat!("Returns true if ", $doc)]
        pub fn $get(&self) -> bool {
            self.options.$group.$get
        }

        #[doc = concat!("Sets whether ", $doc)]
        pub fn $set(&mut self, flag: bool) {
            self.options.$group.$get = flag;
        }
    };
}

impl ProjectFile {
    /// Creates an empty project with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty project with the given options
    pub fn with_options(options: ProjectOptions) -> Self {
        let mut header = ProjectHeader::default();
        header.calendar_name = options.calendar.default_name.clone();
        Self {
            options,
            header,
            ..Self::default()
        }
    }

    /// Returns the registry options
    pub fn options(&self) -> &ProjectOptions {
        &self.options
    }

    /// Returns the registry options for modification
    pub fn options_mut(&mut self) -> &mut ProjectOptions {
        &mut self.options
    }

    option_flag!(structure, auto_wbs, set_auto_wbs, "WBS labels are regenerated");
    option_flag!(
        structure,
        auto_outline_level,
        set_auto_outline_level,
        "new tasks get an outline level"
    );
    option_flag!(
        structure,
        auto_outline_number,
        set_auto_outline_number,
        "outline numbers are regenerated"
    );
    option_flag!(identity, auto_task_id, set_auto_task_id, "new tasks get an ID");
    option_flag!(
        identity,
        auto_task_unique_id,
        set_auto_task_unique_id,
        "new tasks get a unique ID"
    );
    option_flag!(identity, auto_resource_id, set_auto_resource_id, "new resources get an ID");
    option_flag!(
        identity,
        auto_resource_unique_id,
        set_auto_resource_unique_id,
        "new resources get a unique ID"
    );
    option_flag!(
        identity,
        auto_calendar_unique_id,
        set_auto_calendar_unique_id,
        "new calendars get a unique ID"
    );
    option_flag!(
        identity,
        auto_assignment_unique_id,
        set_auto_assignment_unique_id,
        "new assignments get a unique ID"
    );

    /// Returns the project header
    pub fn header(&self) -> &ProjectHeader {
        &self.header
    }

    /// Returns the project header for modification
    pub fn header_mut(&mut self) -> &mut ProjectHeader {
        &mut self.header
    }

    /// Returns the metadata registries
    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    /// Returns the metadata registries for modification
    pub fn metadata_mut(&mut self) -> &mut ProjectMetadata {
        &mut self.metadata
    }

    /// Returns the identity counters
    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Adds a top-level task
    pub fn add_task(&mut self) -> TaskKey {
        let key = self.tasks.insert_with(Task::new);
        self.all_tasks.push(key);
        self.child_tasks.push(key);
        self.init_task(key, None);
        key
    }

    /// Adds a task as the last child of `parent`
    ///
    /// Returns None if the parent is not part of this project.
    pub fn add_child_task(&mut self, parent: TaskKey) -> Option<TaskKey> {
        let parent_level = self.tasks.get(parent)?.outline_level;
        let key = self.tasks.insert_with(Task::new);
        self.all_tasks.push(key);
        if let Some(parent_task) = self.tasks.get_mut(parent) {
            parent_task.children.push(key);
        }
        if let Some(task) = self.tasks.get_mut(key) {
            task.parent = Some(parent);
        }
        self.init_task(key, Some(parent_level.unwrap_or(1)));
        Some(key)
    }

    fn init_task(&mut self, key: TaskKey, parent_level: Option<u32>) {
        if self.options.structure.auto_outline_level {
            if let Some(task) = self.tasks.get_mut(key) {
                task.outline_level = Some(parent_level.map_or(1, |level| level + 1));
            }
        }
        if self.options.identity.auto_task_unique_id {
            let uid = self.next_task_unique_id();
            self.set_task_unique_id(key, Some(uid));
        }
        if self.options.identity.auto_task_id {
            let id = self.next_task_id();
            self.set_task_id(key, Some(id));
        }
    }

    /// Adds a resource
    pub fn add_resource(&mut self) -> ResourceKey {
        let key = self.resources.insert_with(Resource::new);
        self.all_resources.push(key);
        if self.options.identity.auto_resource_unique_id {
            let uid = self.next_resource_unique_id();
            self.set_resource_unique_id(key, Some(uid));
        }
        if self.options.identity.auto_resource_id {
            let id = self.next_resource_id();
            self.set_resource_id(key, Some(id));
        }
        key
    }

    /// Adds a calendar
    pub fn add_calendar(&mut self) -> CalendarKey {
        let key = self.calendars.insert_with(ProjectCalendar::new);
        self.all_calendars.push(key);
        if self.options.identity.auto_calendar_unique_id {
            let uid = self.next_calendar_unique_id();
            self.set_calendar_unique_id(key, Some(uid));
        }
        key
    }

    /// Assigns a resource (or nobody) to a task
    ///
    /// Returns None if the task or the given resource is not part of this
    /// project.
    pub fn add_resource_assignment(
        &mut self,
        task: TaskKey,
        resource: Option<ResourceKey>,
    ) -> Option<AssignmentKey> {
        if !self.tasks.contains(task) {
            return None;
        }
        if let Some(resource) = resource {
            if !self.resources.contains(resource) {
                return None;
            }
        }

        let key = self
            .assignments
            .insert_with(|key| ResourceAssignment::new(key, task, resource));
        self.all_assignments.push(key);
        if let Some(task) = self.tasks.get_mut(task) {
            task.assignments.push(key);
        }
        if let Some(resource) = resource.and_then(|r| self.resources.get_mut(r)) {
            resource.assignments.push(key);
        }
        if self.options.identity.auto_assignment_unique_id {
            let uid = self.next_assignment_unique_id();
            self.set_assignment_unique_id(key, Some(uid));
        }
        Some(key)
    }

    /// Gives a resource its own working calendar, or clears it
    pub fn set_resource_calendar(&mut self, resource: ResourceKey, calendar: Option<CalendarKey>) {
        if calendar.is_some_and(|c| !self.calendars.contains(c)) {
            return;
        }
        let Some(previous) = self.resources.get_mut(resource).map(|r| {
            let previous = r.calendar;
            r.calendar = calendar;
            previous
        }) else {
            return;
        };

        if let Some(previous) = previous.and_then(|c| self.calendars.get_mut(c)) {
            previous.resource = None;
        }
        if let Some(calendar) = calendar.and_then(|c| self.calendars.get_mut(c)) {
            calendar.resource = Some(resource);
        }
    }

    /// Derives a calendar from a base calendar, or detaches it
    ///
    /// Links that would make a calendar its own ancestor are ignored.
    pub fn set_calendar_parent(&mut self, calendar: CalendarKey, parent: Option<CalendarKey>) {
        if let Some(parent) = parent {
            if !self.calendars.contains(parent) || self.calendar_ancestry(parent).contains(&calendar)
            {
                return;
            }
        }
        if let Some(calendar) = self.calendars.get_mut(calendar) {
            calendar.parent = parent;
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Returns a task by handle
    pub fn task(&self, key: TaskKey) -> Option<&Task> {
        self.tasks.get(key)
    }

    /// Returns a task by handle for modification
    pub fn task_mut(&mut self, key: TaskKey) -> Option<&mut Task> {
        self.tasks.get_mut(key)
    }

    /// Returns a resource by handle
    pub fn resource(&self, key: ResourceKey) -> Option<&Resource> {
        self.resources.get(key)
    }

    /// Returns a resource by handle for modification
    pub fn resource_mut(&mut self, key: ResourceKey) -> Option<&mut Resource> {
        self.resources.get_mut(key)
    }

    /// Returns an assignment by handle
    pub fn assignment(&self, key: AssignmentKey) -> Option<&ResourceAssignment> {
        self.assignments.get(key)
    }

    /// Returns an assignment by handle for modification
    pub fn assignment_mut(&mut self, key: AssignmentKey) -> Option<&mut ResourceAssignment> {
        self.assignments.get_mut(key)
    }

    /// Returns a calendar by handle
    pub fn calendar_ref(&self, key: CalendarKey) -> Option<&ProjectCalendar> {
        self.calendars.get(key)
    }

    /// Returns a calendar by handle for modification
    pub fn calendar_mut(&mut self, key: CalendarKey) -> Option<&mut ProjectCalendar> {
        self.calendars.get_mut(key)
    }

    /// Looks up a task by presentation ID
    pub fn task_by_id(&self, id: u32) -> Option<&Task> {
        self.task_ids.get(id).and_then(|key| self.tasks.get(key))
    }

    /// Looks up a task by unique ID
    pub fn task_by_unique_id(&self, unique_id: u32) -> Option<&Task> {
        self.task_unique_ids
            .get(unique_id)
            .and_then(|key| self.tasks.get(key))
    }

    /// Looks up a resource by presentation ID
    pub fn resource_by_id(&self, id: u32) -> Option<&Resource> {
        self.resource_ids.get(id).and_then(|key| self.resources.get(key))
    }

    /// Looks up a resource by unique ID
    pub fn resource_by_unique_id(&self, unique_id: u32) -> Option<&Resource> {
        self.resource_unique_ids
            .get(unique_id)
            .and_then(|key| self.resources.get(key))
    }

    /// Looks up an assignment by unique ID
    pub fn assignment_by_unique_id(&self, unique_id: u32) -> Option<&ResourceAssignment> {
        self.assignment_unique_ids
            .get(unique_id)
            .and_then(|key| self.assignments.get(key))
    }

    /// Looks up a calendar by unique ID
    pub fn calendar_by_unique_id(&self, unique_id: u32) -> Option<&ProjectCalendar> {
        self.calendar_unique_ids
            .get(unique_id)
            .and_then(|key| self.calendars.get(key))
    }

    /// Returns every task in flat order
    pub fn all_tasks(&self) -> &[TaskKey] {
        &self.all_tasks
    }

    /// Iterates over every task in flat order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.all_tasks.iter().filter_map(|key| self.tasks.get(*key))
    }

    /// Returns the top-level tasks
    pub fn child_tasks(&self) -> &[TaskKey] {
        &self.child_tasks
    }

    /// Returns every resource in flat order
    pub fn all_resources(&self) -> &[ResourceKey] {
        &self.all_resources
    }

    /// Iterates over every resource in flat order
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.all_resources
            .iter()
            .filter_map(|key| self.resources.get(*key))
    }

    /// Returns every assignment in flat order
    pub fn all_resource_assignments(&self) -> &[AssignmentKey] {
        &self.all_assignments
    }

    /// Iterates over every assignment in flat order
    pub fn resource_assignments(&self) -> impl Iterator<Item = &ResourceAssignment> {
        self.all_assignments
            .iter()
            .filter_map(|key| self.assignments.get(*key))
    }

    /// Returns every calendar in flat order
    pub fn calendars(&self) -> &[CalendarKey] {
        &self.all_calendars
    }

    /// Iterates over every calendar in flat order
    pub fn calendar_entries(&self) -> impl Iterator<Item = &ProjectCalendar> {
        self.all_calendars
            .iter()
            .filter_map(|key| self.calendars.get(*key))
    }

    /// Returns the unique ID of the task an assignment belongs to
    pub fn assignment_task_unique_id(&self, key: AssignmentKey) -> Option<u32> {
        let assignment = self.assignments.get(key)?;
        self.tasks.get(assignment.task)?.unique_id
    }

    /// Returns the unique ID of the resource an assignment refers to
    pub fn assignment_resource_unique_id(&self, key: AssignmentKey) -> Option<u32> {
        let assignment = self.assignments.get(key)?;
        self.resources.get(assignment.resource?)?.unique_id
    }
}
