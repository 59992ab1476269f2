//! Removal with transitive cleanup
//!
//! Every `remove_*` leaves the indexes, the forest and both sides of each
//! assignment consistent. Removing something that is already gone is a no-op.

use tracing::debug;

use super::ProjectFile;
use crate::domain::{AssignmentKey, CalendarKey, ResourceKey, TaskKey};

impl ProjectFile {
    /// Removes a task, its assignments, its relations and its whole subtree
    pub fn remove_task(&mut self, key: TaskKey) {
        let Some((id, unique_id)) = self.tasks.get(key).map(|t| (t.id, t.unique_id)) else {
            return;
        };

        self.all_tasks.retain(|k| *k != key);
        if let Some(id) = id {
            self.task_ids.unmap(id, key);
        }
        if let Some(uid) = unique_id {
            self.task_unique_ids.unmap(uid, key);
        }

        self.detach(key);

        let owned: Vec<AssignmentKey> = self
            .all_assignments
            .iter()
            .copied()
            .filter(|a| self.assignments.get(*a).is_some_and(|a| a.task == key))
            .collect();
        for assignment in owned {
            self.remove_resource_assignment(assignment);
        }

        self.relations.remove_task(key);

        // each removed child detaches itself from this task's child list
        while let Some(child) = self.tasks.get(key).and_then(|t| t.children.first().copied()) {
            self.remove_task(child);
        }

        self.tasks.remove(key);
        debug!(task = %key, "removed task");
    }

    /// Removes a resource, its assignments and any calendar it owns
    pub fn remove_resource(&mut self, key: ResourceKey) {
        let Some((id, unique_id, calendar)) = self
            .resources
            .get(key)
            .map(|r| (r.id, r.unique_id, r.calendar))
        else {
            return;
        };

        self.all_resources.retain(|k| *k != key);
        if let Some(id) = id {
            self.resource_ids.unmap(id, key);
        }
        if let Some(uid) = unique_id {
            self.resource_unique_ids.unmap(uid, key);
        }

        let owned: Vec<AssignmentKey> = self
            .all_assignments
            .iter()
            .copied()
            .filter(|a| {
                self.assignments
                    .get(*a)
                    .is_some_and(|a| a.resource == Some(key))
            })
            .collect();
        for assignment in owned {
            self.remove_resource_assignment(assignment);
        }

        self.resources.remove(key);
        if let Some(calendar) = calendar {
            self.remove_calendar(calendar);
        }
        debug!(resource = %key, "removed resource");
    }

    /// Removes a calendar and every reference to it
    ///
    /// Calendars derived from it lose their base and stand alone.
    pub fn remove_calendar(&mut self, key: CalendarKey) {
        let Some(calendar) = self.calendars.remove(key) else {
            return;
        };

        self.all_calendars.retain(|k| *k != key);
        if let Some(uid) = calendar.unique_id {
            self.calendar_unique_ids.unmap(uid, key);
        }

        for resource in &self.all_resources {
            if let Some(resource) = self.resources.get_mut(*resource) {
                if resource.calendar == Some(key) {
                    resource.calendar = None;
                }
            }
        }
        for derived in &self.all_calendars {
            if let Some(derived) = self.calendars.get_mut(*derived) {
                if derived.parent == Some(key) {
                    derived.parent = None;
                }
            }
        }
        debug!(calendar = %key, "removed calendar");
    }

    /// Removes an assignment from the central list and from both owners
    pub fn remove_resource_assignment(&mut self, key: AssignmentKey) {
        let Some(assignment) = self.assignments.remove(key) else {
            return;
        };

        self.all_assignments.retain(|k| *k != key);
        if let Some(uid) = assignment.unique_id {
            self.assignment_unique_ids.unmap(uid, key);
        }
        if let Some(task) = self.tasks.get_mut(assignment.task) {
            task.assignments.retain(|k| *k != key);
        }
        if let Some(resource) = assignment.resource.and_then(|r| self.resources.get_mut(r)) {
            resource.assignments.retain(|k| *k != key);
        }
    }
}
