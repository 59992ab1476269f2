//! Identity maintenance: setters, counters and renumbering
//!
//! Changing an ID goes through unmap-then-map so the indexes never hold a
//! stale entry. The low-level `map_*`/`unmap_*` calls are public for format
//! readers that manage identity themselves.

use tracing::{debug, warn};

use super::{IdIndex, ProjectFile};
use crate::domain::{AssignmentKey, CalendarKey, EntityKind, ResourceKey, TaskKey};

macro_rules! index_access {
    ($index:ident, $key:ty, $map:ident, $unmap:ident, $what:literal) => {
        #[doc = concat!("Returns the ", $what, " index")]
        pub fn $index(&self) -> &IdIndex<$key> {
            &self.$index
        }

        #[doc = concat!("Indexes `key` under ", $what, " `id`")]
        pub fn $map(&mut self, id: u32, key: $key) {
            self.$index.map(id, key);
        }

        #[doc = concat!("Drops the ", $what, " entry for `id` if it belongs to `key`")]
        pub fn $unmap(&mut self, id: u32, key: $key) {
            self.$index.unmap(id, key);
        }
    };
}

macro_rules! identity_setter {
    ($arena:ident, $field:ident, $index:ident, $key:ty, $set:ident, $what:literal) => {
        #[doc = concat!("Sets the ", $what, ", keeping the index in step")]
        pub fn $set(&mut self, key: $key, value: Option<u32>) {
            let Some(entity) = self.$arena.get_mut(key) else {
                return;
            };
            let old = std::mem::replace(&mut entity.$field, value);
            if let Some(old) = old {
                self.$index.unmap(old, key);
            }
            if let Some(new) = value {
                self.$index.map(new, key);
            }
        }
    };
}

/// Mints from a unique-ID counter, renumbering the kind once the counter
/// is exhausted (renumbering resets the counter to the last value assigned)
macro_rules! mint_unique {
    ($project:ident, $counter:ident, $renumber:ident, $kind:expr) => {{
        match $project.counters.$counter.next() {
            Some(value) => value,
            None => {
                warn!(kind = %$kind, "unique id counter exhausted, renumbering");
                $project.$renumber();
                match $project.counters.$counter.next() {
                    Some(value) => value,
                    // nothing left to renumber: no value is in use
                    None => {
                        $project.counters.$counter.reset_to(1);
                        1
                    }
                }
            }
        }
    }};
}

/// First value of a renumbered sequence: 0 keeps a hidden root in place
fn sequence_start(has_zero: bool) -> u32 {
    if has_zero {
        0
    } else {
        1
    }
}

impl ProjectFile {
    index_access!(task_ids, TaskKey, map_task_id, unmap_task_id, "task ID");
    index_access!(
        task_unique_ids,
        TaskKey,
        map_task_unique_id,
        unmap_task_unique_id,
        "task unique ID"
    );
    index_access!(resource_ids, ResourceKey, map_resource_id, unmap_resource_id, "resource ID");
    index_access!(
        resource_unique_ids,
        ResourceKey,
        map_resource_unique_id,
        unmap_resource_unique_id,
        "resource unique ID"
    );
    index_access!(
        calendar_unique_ids,
        CalendarKey,
        map_calendar_unique_id,
        unmap_calendar_unique_id,
        "calendar unique ID"
    );
    index_access!(
        assignment_unique_ids,
        AssignmentKey,
        map_assignment_unique_id,
        unmap_assignment_unique_id,
        "assignment unique ID"
    );

    identity_setter!(tasks, id, task_ids, TaskKey, set_task_id, "task ID");
    identity_setter!(
        tasks,
        unique_id,
        task_unique_ids,
        TaskKey,
        set_task_unique_id,
        "task unique ID"
    );
    identity_setter!(resources, id, resource_ids, ResourceKey, set_resource_id, "resource ID");
    identity_setter!(
        resources,
        unique_id,
        resource_unique_ids,
        ResourceKey,
        set_resource_unique_id,
        "resource unique ID"
    );
    identity_setter!(
        calendars,
        unique_id,
        calendar_unique_ids,
        CalendarKey,
        set_calendar_unique_id,
        "calendar unique ID"
    );
    identity_setter!(
        assignments,
        unique_id,
        assignment_unique_ids,
        AssignmentKey,
        set_assignment_unique_id,
        "assignment unique ID"
    );

    // =========================================================================
    // Counters
    // =========================================================================

    /// Mints the next task ID
    ///
    /// An exhausted counter makes task IDs dense first.
    pub fn next_task_id(&mut self) -> u32 {
        if let Some(id) = self.counters.task_id.next() {
            return id;
        }
        warn!(kind = %EntityKind::Task, "id counter exhausted, renumbering");
        self.renumber_task_ids();
        let highest = self.tasks().filter_map(|t| t.id).max().unwrap_or(0);
        self.counters.task_id.reset_to(highest);
        self.counters.task_id.next().unwrap_or(highest)
    }

    /// Mints the next task unique ID
    pub fn next_task_unique_id(&mut self) -> u32 {
        mint_unique!(self, task_unique_id, renumber_task_unique_ids, EntityKind::Task)
    }

    /// Mints the next resource ID
    ///
    /// An exhausted counter makes resource IDs dense first.
    pub fn next_resource_id(&mut self) -> u32 {
        if let Some(id) = self.counters.resource_id.next() {
            return id;
        }
        warn!(kind = %EntityKind::Resource, "id counter exhausted, renumbering");
        self.renumber_resource_ids();
        let highest = self.resources().filter_map(|r| r.id).max().unwrap_or(0);
        self.counters.resource_id.reset_to(highest);
        self.counters.resource_id.next().unwrap_or(highest)
    }

    /// Mints the next resource unique ID
    pub fn next_resource_unique_id(&mut self) -> u32 {
        mint_unique!(
            self,
            resource_unique_id,
            renumber_resource_unique_ids,
            EntityKind::Resource
        )
    }

    /// Mints the next calendar unique ID
    pub fn next_calendar_unique_id(&mut self) -> u32 {
        mint_unique!(
            self,
            calendar_unique_id,
            renumber_calendar_unique_ids,
            EntityKind::Calendar
        )
    }

    /// Mints the next assignment unique ID
    pub fn next_assignment_unique_id(&mut self) -> u32 {
        mint_unique!(
            self,
            assignment_unique_id,
            renumber_assignment_unique_ids,
            EntityKind::Assignment
        )
    }

    /// Raises every counter to at least the largest value in use
    ///
    /// Call once after a bulk load so freshly minted values never collide
    /// with loaded ones.
    pub fn update_unique_counters(&mut self) {
        let tasks: Vec<_> = self.tasks().map(|t| (t.id, t.unique_id)).collect();
        for (id, uid) in tasks {
            self.counters.task_id.raise_to(id.unwrap_or(0));
            self.counters.task_unique_id.raise_to(uid.unwrap_or(0));
        }

        let resources: Vec<_> = self.resources().map(|r| (r.id, r.unique_id)).collect();
        for (id, uid) in resources {
            self.counters.resource_id.raise_to(id.unwrap_or(0));
            self.counters.resource_unique_id.raise_to(uid.unwrap_or(0));
        }

        let calendar_max = self
            .calendar_entries()
            .filter_map(|c| c.unique_id)
            .max()
            .unwrap_or(0);
        self.counters.calendar_unique_id.raise_to(calendar_max);

        let assignment_max = self
            .resource_assignments()
            .filter_map(|a| a.unique_id)
            .max()
            .unwrap_or(0);
        self.counters.assignment_unique_id.raise_to(assignment_max);

        debug!(
            task_unique_id = self.counters.task_unique_id.current(),
            resource_unique_id = self.counters.resource_unique_id.current(),
            calendar_unique_id = self.counters.calendar_unique_id.current(),
            assignment_unique_id = self.counters.assignment_unique_id.current(),
            "updated unique id counters"
        );
    }

    // =========================================================================
    // Renumbering
    // =========================================================================

    pub(crate) fn sort_tasks_by_id(&mut self) {
        let tasks = &self.tasks;
        self.all_tasks
            .sort_by_key(|key| tasks.get(*key).and_then(|t| t.id).unwrap_or(0));
    }

    fn sort_resources_by_id(&mut self) {
        let resources = &self.resources;
        self.all_resources
            .sort_by_key(|key| resources.get(*key).and_then(|r| r.id).unwrap_or(0));
    }

    /// Makes task IDs dense, preserving their current order
    ///
    /// Numbering starts at 0 when the lowest ID is 0 (hidden root), else 1.
    pub fn renumber_task_ids(&mut self) {
        if self.all_tasks.is_empty() {
            return;
        }

        self.sort_tasks_by_id();
        let first = self.all_tasks.first().and_then(|k| self.tasks.get(*k)).and_then(|t| t.id);
        let mut next = sequence_start(first == Some(0));

        for key in self.all_tasks.clone() {
            self.set_task_id(key, Some(next));
            next += 1;
        }
        self.counters.task_id.raise_to(next - 1);
        debug!(count = self.all_tasks.len(), "renumbered task ids");
    }

    /// Makes resource IDs dense, preserving their current order
    pub fn renumber_resource_ids(&mut self) {
        if self.all_resources.is_empty() {
            return;
        }

        self.sort_resources_by_id();
        let first = self
            .all_resources
            .first()
            .and_then(|k| self.resources.get(*k))
            .and_then(|r| r.id);
        let mut next = sequence_start(first == Some(0));

        for key in self.all_resources.clone() {
            self.set_resource_id(key, Some(next));
            next += 1;
        }
        self.counters.resource_id.raise_to(next - 1);
        debug!(count = self.all_resources.len(), "renumbered resource ids");
    }

    /// Reassigns task unique IDs in flat-list order
    ///
    /// Starts at 0 when a task with ID 0 exists, else 1.
    pub fn renumber_task_unique_ids(&mut self) {
        if self.all_tasks.is_empty() {
            return;
        }

        let mut next = sequence_start(self.task_ids.get(0).is_some());
        for key in self.all_tasks.clone() {
            self.set_task_unique_id(key, Some(next));
            next += 1;
        }
        self.counters.task_unique_id.reset_to(next - 1);
    }

    /// Reassigns resource unique IDs in flat-list order
    pub fn renumber_resource_unique_ids(&mut self) {
        if self.all_resources.is_empty() {
            return;
        }

        let has_zero = self.resources().any(|r| r.unique_id == Some(0));
        let mut next = sequence_start(has_zero);
        for key in self.all_resources.clone() {
            self.set_resource_unique_id(key, Some(next));
            next += 1;
        }
        self.counters.resource_unique_id.reset_to(next - 1);
    }

    /// Reassigns assignment unique IDs in flat-list order
    pub fn renumber_assignment_unique_ids(&mut self) {
        if self.all_assignments.is_empty() {
            return;
        }

        let has_zero = self.resource_assignments().any(|a| a.unique_id == Some(0));
        let mut next = sequence_start(has_zero);
        for key in self.all_assignments.clone() {
            self.set_assignment_unique_id(key, Some(next));
            next += 1;
        }
        self.counters.assignment_unique_id.reset_to(next - 1);
    }

    /// Reassigns calendar unique IDs in flat-list order
    pub fn renumber_calendar_unique_ids(&mut self) {
        if self.all_calendars.is_empty() {
            return;
        }

        let has_zero = self.calendar_entries().any(|c| c.unique_id == Some(0));
        let mut next = sequence_start(has_zero);
        for key in self.all_calendars.clone() {
            self.set_calendar_unique_id(key, Some(next));
            next += 1;
        }
        self.counters.calendar_unique_id.reset_to(next - 1);
    }

    /// Renumbers every kind holding a unique ID above the ceiling
    ///
    /// Each kind is scanned independently and renumbered at most once.
    /// Returns the kinds that were renumbered.
    pub fn validate_unique_ids(&mut self) -> Vec<EntityKind> {
        let ceiling = self.options.identity.unique_id_ceiling;
        let over = |uid: Option<u32>| uid.unwrap_or(0) > ceiling;
        let mut renumbered = Vec::new();

        if self.tasks().any(|t| over(t.unique_id)) {
            self.renumber_task_unique_ids();
            renumbered.push(EntityKind::Task);
        }
        if self.resources().any(|r| over(r.unique_id)) {
            self.renumber_resource_unique_ids();
            renumbered.push(EntityKind::Resource);
        }
        if self.resource_assignments().any(|a| over(a.unique_id)) {
            self.renumber_assignment_unique_ids();
            renumbered.push(EntityKind::Assignment);
        }
        if self.calendar_entries().any(|c| over(c.unique_id)) {
            self.renumber_calendar_unique_ids();
            renumbered.push(EntityKind::Calendar);
        }

        for kind in &renumbered {
            warn!(%kind, ceiling, "unique id above ceiling, renumbered kind");
        }
        renumbered
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::{EntityKind, Task};
    use crate::project::{IdentityOptions, ProjectFile, ProjectOptions};

    fn manual_project() -> ProjectFile {
        ProjectFile::with_options(ProjectOptions {
            identity: IdentityOptions::manual(),
            ..ProjectOptions::default()
        })
    }

    #[test]
    fn set_task_id_moves_index_entry() {
        let mut project = ProjectFile::new();
        let task = project.add_task();

        project.set_task_id(task, Some(10));

        assert!(project.task_by_id(1).is_none());
        assert_eq!(project.task_by_id(10).map(Task::key), Some(task));
    }

    #[test]
    fn clearing_an_id_unmaps_it() {
        let mut project = ProjectFile::new();
        let task = project.add_task();

        project.set_task_unique_id(task, None);

        assert!(project.task_by_unique_id(1).is_none());
        assert!(project.task(task).unwrap().unique_id().is_none());
    }

    #[test]
    fn unmap_ignores_foreign_entry() {
        let mut project = ProjectFile::new();
        let a = project.add_task();
        let b = project.add_task();

        project.unmap_task_id(1, b);
        assert_eq!(project.task_by_id(1).map(Task::key), Some(a));
    }

    #[test]
    fn renumber_task_ids_closes_gaps() {
        let mut project = manual_project();
        let keys: Vec<_> = [5, 2, 9]
            .into_iter()
            .map(|id| {
                let key = project.add_task();
                project.set_task_id(key, Some(id));
                key
            })
            .collect();

        project.renumber_task_ids();

        assert_eq!(project.task(keys[1]).unwrap().id(), Some(1));
        assert_eq!(project.task(keys[0]).unwrap().id(), Some(2));
        assert_eq!(project.task(keys[2]).unwrap().id(), Some(3));
        assert!(project.task_by_id(5).is_none());
        assert!(project.task_by_id(9).is_none());
        assert_eq!(project.task_by_id(3).map(Task::key), Some(keys[2]));
    }

    #[test]
    fn renumber_task_ids_keeps_hidden_root_at_zero() {
        let mut project = manual_project();
        let root = project.add_task();
        project.set_task_id(root, Some(0));
        let other = project.add_task();
        project.set_task_id(other, Some(7));

        project.renumber_task_ids();

        assert_eq!(project.task(root).unwrap().id(), Some(0));
        assert_eq!(project.task(other).unwrap().id(), Some(1));
    }

    #[test]
    fn renumber_resource_ids_closes_gaps() {
        let mut project = manual_project();
        let a = project.add_resource();
        project.set_resource_id(a, Some(4));
        let b = project.add_resource();
        project.set_resource_id(b, Some(2));

        project.renumber_resource_ids();

        assert_eq!(project.resource(b).unwrap().id(), Some(1));
        assert_eq!(project.resource(a).unwrap().id(), Some(2));
        assert_eq!(project.resource_by_id(2).map(|r| r.key()), Some(a));
    }

    #[test]
    fn renumber_with_overlapping_ids_keeps_index_consistent() {
        let mut project = manual_project();
        let a = project.add_task();
        project.set_task_id(a, Some(2));
        let b = project.add_task();
        project.set_task_id(b, Some(3));

        project.renumber_task_ids();

        assert_eq!(project.task_by_id(1).map(Task::key), Some(a));
        assert_eq!(project.task_by_id(2).map(Task::key), Some(b));
        assert!(project.task_by_id(3).is_none());
    }

    #[test]
    fn counters_mint_increasing_values() {
        let mut project = ProjectFile::new();
        assert_eq!(project.next_task_unique_id(), 1);
        assert_eq!(project.next_task_unique_id(), 2);
        assert_eq!(project.next_calendar_unique_id(), 1);
    }

    #[test]
    fn update_unique_counters_raises_to_max() {
        let mut project = manual_project();
        let task = project.add_task();
        project.set_task_unique_id(task, Some(40));
        let calendar = project.add_calendar();
        project.set_calendar_unique_id(calendar, Some(12));

        project.update_unique_counters();

        assert_eq!(project.next_task_unique_id(), 41);
        assert_eq!(project.next_calendar_unique_id(), 13);
        assert_eq!(project.next_resource_unique_id(), 1);
    }

    #[test]
    fn validate_renumbers_only_offending_kind() {
        let mut project = ProjectFile::new();
        let task = project.add_task();
        project.add_task();
        let resource = project.add_resource();
        project.set_task_unique_id(task, Some(0x20_0000));

        let renumbered = project.validate_unique_ids();

        assert_eq!(renumbered, vec![EntityKind::Task]);
        assert_eq!(project.task(task).unwrap().unique_id(), Some(1));
        assert!(project.task_by_unique_id(0x20_0000).is_none());
        assert_eq!(project.resource(resource).unwrap().unique_id(), Some(1));
    }

    #[test]
    fn validate_is_noop_within_ceiling() {
        let mut project = ProjectFile::new();
        project.add_task();
        project.add_calendar();

        assert!(project.validate_unique_ids().is_empty());
    }

    #[test]
    fn renumbered_counter_stays_below_ceiling() {
        let mut project = ProjectFile::new();
        let task = project.add_task();
        project.set_task_unique_id(task, Some(0x30_0000));
        project.update_unique_counters();

        project.validate_unique_ids();

        let fresh = project.add_task();
        assert_eq!(project.task(fresh).unwrap().unique_id(), Some(2));
    }

    #[test]
    fn exhausted_unique_id_counter_renumbers_instead_of_wrapping() {
        let mut project = manual_project();
        let first = project.add_task();
        project.set_task_unique_id(first, Some(u32::MAX));
        project.update_unique_counters();
        project.set_auto_task_unique_id(true);

        let fresh = project.add_task();

        let first_uid = project.task(first).unwrap().unique_id().unwrap();
        let fresh_uid = project.task(fresh).unwrap().unique_id().unwrap();
        assert_ne!(first_uid, fresh_uid);
        assert_ne!(fresh_uid, 0);
        assert!(fresh_uid < u32::MAX);
        assert_eq!(project.task_by_unique_id(first_uid).unwrap().key(), first);
        assert_eq!(project.task_by_unique_id(fresh_uid).unwrap().key(), fresh);
        assert!(project.task_by_unique_id(u32::MAX).is_none());
    }

    #[test]
    fn exhausted_id_counter_makes_ids_dense() {
        let mut project = manual_project();
        let first = project.add_resource();
        project.set_resource_unique_id(first, Some(1));
        project.set_resource_id(first, Some(u32::MAX));
        project.update_unique_counters();
        project.set_auto_resource_id(true);
        project.set_auto_resource_unique_id(true);

        let fresh = project.add_resource();

        // the fresh resource has no ID yet while renumbering, so it sorts first
        assert_eq!(project.resource(first).unwrap().id(), Some(2));
        assert_eq!(project.resource(fresh).unwrap().id(), Some(3));
        assert_eq!(project.resource_by_id(2).unwrap().key(), first);
        assert_eq!(project.resource_by_id(3).unwrap().key(), fresh);
        assert!(project.resource_by_id(1).is_none());
        assert!(project.resource_by_id(u32::MAX).is_none());
    }

    #[test]
    fn exhausted_counter_with_nothing_to_renumber_restarts() {
        let mut project = manual_project();
        let calendar = project.add_calendar();
        project.set_calendar_unique_id(calendar, Some(u32::MAX));
        project.update_unique_counters();
        project.remove_calendar(calendar);

        assert_eq!(project.next_calendar_unique_id(), 1);
        assert_eq!(project.next_calendar_unique_id(), 2);
    }

    #[test]
    fn ceiling_is_configurable() {
        let mut options = ProjectOptions::default();
        options.identity.unique_id_ceiling = 10;
        let mut project = ProjectFile::with_options(options);
        let calendar = project.add_calendar();
        project.set_calendar_unique_id(calendar, Some(11));

        assert_eq!(project.validate_unique_ids(), vec![EntityKind::Calendar]);
        assert_eq!(project.calendar_ref(calendar).unwrap().unique_id(), Some(1));
    }
}
