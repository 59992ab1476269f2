//! Plan snapshot records
//!
//! A snapshot is a flat, unique-ID keyed picture of a plan: the shape a
//! format reader sees before the registry builds the hierarchy. Loading goes
//! through the registry's inbound interface (manual identity, read events,
//! `update_structure`, `update_unique_counters`); saving fires the written
//! events in emission order.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::{
    CalendarKey, Day, DayType, Duration, EntityKind, Relation, RelationError, RelationType,
    ResourceKey, TaskKey, WorkingRange, DEFAULT_UNITS,
};
use crate::project::{IdentityOptions, Listener, ProjectFile, ProjectHeader, ProjectOptions};

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("Duplicate {kind} unique ID: {unique_id}")]
    DuplicateUniqueId { kind: EntityKind, unique_id: u32 },

    #[error("Duplicate {kind} ID: {id}")]
    DuplicateId { kind: EntityKind, id: u32 },

    #[error("Unknown task unique ID {0} referenced")]
    UnknownTask(u32),

    #[error("Unknown resource unique ID {0} referenced")]
    UnknownResource(u32),

    #[error(transparent)]
    Relation(#[from] RelationError),
}

/// A weekday setting that differs from "inherit"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    pub day: Day,
    #[serde(rename = "type")]
    pub day_type: DayType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRecord {
    pub unique_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unique ID of the base calendar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days: Vec<DayRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hours: Vec<WorkingRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub unique_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initials: Option<String>,
    /// Unique ID of the resource's own calendar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    pub unique_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_number: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub null: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub milestone: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_finish: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<u32>,
    /// Unique ID of the task
    pub task: u32,
    /// Unique ID of the resource, absent for an unassigned slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<u32>,
    #[serde(default = "default_units")]
    pub units: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub predecessor: u32,
    pub successor: u32,
    #[serde(default)]
    pub kind: RelationType,
    #[serde(default)]
    pub lag_minutes: i64,
}

/// A whole plan, ready to serialize
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanSnapshot {
    pub header: ProjectHeader,
    pub calendars: Vec<CalendarRecord>,
    pub resources: Vec<ResourceRecord>,
    pub tasks: Vec<TaskRecord>,
    pub assignments: Vec<AssignmentRecord>,
    pub relations: Vec<RelationRecord>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_units() -> f64 {
    DEFAULT_UNITS
}

impl PlanSnapshot {
    /// Builds a registry from this snapshot
    ///
    /// Identity comes from the records; `options` governs everything done to
    /// the project afterwards.
    pub fn into_project(self, options: ProjectOptions) -> Result<ProjectFile, SnapshotError> {
        self.into_project_with_listeners(options, Vec::new())
    }

    /// Like [`PlanSnapshot::into_project`], with listeners registered before
    /// the first read event fires
    pub fn into_project_with_listeners(
        self,
        options: ProjectOptions,
        listeners: Vec<Listener>,
    ) -> Result<ProjectFile, SnapshotError> {
        let mut loading = options.clone();
        loading.identity = IdentityOptions {
            unique_id_ceiling: options.identity.unique_id_ceiling,
            ..IdentityOptions::manual()
        };
        let mut project = ProjectFile::with_options(loading);
        project.add_project_listeners(listeners);
        *project.header_mut() = self.header;

        let calendars = load_calendars(&mut project, self.calendars)?;
        let resources = load_resources(&mut project, self.resources, &calendars)?;
        let tasks = load_tasks(&mut project, self.tasks)?;
        project.update_structure();

        for record in self.assignments {
            let task = *tasks
                .get(&record.task)
                .ok_or(SnapshotError::UnknownTask(record.task))?;
            let resource = match record.resource {
                Some(uid) => Some(
                    *resources
                        .get(&uid)
                        .ok_or(SnapshotError::UnknownResource(uid))?,
                ),
                None => None,
            };
            let Some(key) = project.add_resource_assignment(task, resource) else {
                continue;
            };
            project.set_assignment_unique_id(key, record.unique_id);
            if let Some(assignment) = project.assignment_mut(key) {
                assignment.units = record.units;
                assignment.work = record.work;
            }
            project.fire_assignment_read_event(key);
        }

        for record in self.relations {
            let predecessor = *tasks
                .get(&record.predecessor)
                .ok_or(SnapshotError::UnknownTask(record.predecessor))?;
            let successor = *tasks
                .get(&record.successor)
                .ok_or(SnapshotError::UnknownTask(record.successor))?;
            let relation = Relation {
                predecessor,
                successor,
                kind: record.kind,
                lag_minutes: record.lag_minutes,
            };
            project.add_relation(relation)?;
            project.fire_relation_read_event(&relation);
        }

        *project.options_mut() = options;
        project.update_unique_counters();
        Ok(project)
    }

    /// Captures a registry, firing a written event per emitted entity
    pub fn from_project(project: &mut ProjectFile) -> Self {
        let mut snapshot = Self {
            header: project.header().clone(),
            ..Self::default()
        };

        for key in project.calendars().to_vec() {
            if let Some(record) = calendar_record(project, key) {
                snapshot.calendars.push(record);
                project.fire_calendar_written_event(key);
            }
        }

        for key in project.all_resources().to_vec() {
            let Some(resource) = project.resource(key) else {
                continue;
            };
            let Some(unique_id) = resource.unique_id() else {
                warn!(resource = %key, "skipping resource without unique ID");
                continue;
            };
            snapshot.resources.push(ResourceRecord {
                id: resource.id(),
                unique_id,
                name: resource.name.clone(),
                initials: resource.initials.clone(),
                calendar: resource
                    .calendar()
                    .and_then(|c| project.calendar_ref(c))
                    .and_then(|c| c.unique_id()),
            });
            project.fire_resource_written_event(key);
        }

        for key in project.all_tasks().to_vec() {
            let Some(task) = project.task(key) else {
                continue;
            };
            let Some(unique_id) = task.unique_id() else {
                warn!(task = %key, "skipping task without unique ID");
                continue;
            };
            snapshot.tasks.push(TaskRecord {
                id: task.id(),
                unique_id,
                name: task.name.clone(),
                outline_level: task.outline_level,
                wbs: task.wbs.clone(),
                outline_number: task.outline_number.clone(),
                null: task.null,
                milestone: task.milestone,
                start: task.start,
                finish: task.finish,
                actual_start: task.actual_start,
                actual_finish: task.actual_finish,
            });
            project.fire_task_written_event(key);
        }

        for key in project.all_resource_assignments().to_vec() {
            let (Some(assignment), Some(task)) =
                (project.assignment(key), project.assignment_task_unique_id(key))
            else {
                continue;
            };
            snapshot.assignments.push(AssignmentRecord {
                unique_id: assignment.unique_id(),
                task,
                resource: project.assignment_resource_unique_id(key),
                units: assignment.units,
                work: assignment.work,
            });
            project.fire_assignment_written_event(key);
        }

        for relation in project.relations() {
            let unique_id = |key: TaskKey| project.task(key).and_then(|t| t.unique_id());
            let (Some(predecessor), Some(successor)) =
                (unique_id(relation.predecessor), unique_id(relation.successor))
            else {
                continue;
            };
            snapshot.relations.push(RelationRecord {
                predecessor,
                successor,
                kind: relation.kind,
                lag_minutes: relation.lag_minutes,
            });
            project.fire_relation_written_event(&relation);
        }

        snapshot
    }
}

fn calendar_record(project: &ProjectFile, key: CalendarKey) -> Option<CalendarRecord> {
    let calendar = project.calendar_ref(key)?;
    let Some(unique_id) = calendar.unique_id() else {
        warn!(calendar = %key, "skipping calendar without unique ID");
        return None;
    };
    Some(CalendarRecord {
        unique_id,
        name: calendar.name.clone(),
        parent: calendar
            .parent()
            .and_then(|p| project.calendar_ref(p))
            .and_then(|p| p.unique_id()),
        days: Day::ALL
            .into_iter()
            .filter(|day| calendar.day_type(*day) != DayType::Default)
            .map(|day| DayRecord {
                day,
                day_type: calendar.day_type(day),
            })
            .collect(),
        hours: calendar.hours.clone(),
    })
}

fn claim(seen: &mut HashSet<u32>, kind: EntityKind, unique_id: u32) -> Result<(), SnapshotError> {
    if !seen.insert(unique_id) {
        return Err(SnapshotError::DuplicateUniqueId { kind, unique_id });
    }
    Ok(())
}

fn claim_id(seen: &mut HashSet<u32>, kind: EntityKind, id: Option<u32>) -> Result<(), SnapshotError> {
    match id {
        Some(id) if !seen.insert(id) => Err(SnapshotError::DuplicateId { kind, id }),
        _ => Ok(()),
    }
}

fn load_calendars(
    project: &mut ProjectFile,
    records: Vec<CalendarRecord>,
) -> Result<HashMap<u32, CalendarKey>, SnapshotError> {
    let mut seen = HashSet::new();
    let mut keys = HashMap::new();
    let mut parents = Vec::new();

    for record in records {
        claim(&mut seen, EntityKind::Calendar, record.unique_id)?;
        let key = project.add_calendar();
        project.set_calendar_unique_id(key, Some(record.unique_id));
        if let Some(calendar) = project.calendar_mut(key) {
            calendar.name = record.name;
            calendar.hours = record.hours;
            for day in record.days {
                calendar.set_day_type(day.day, day.day_type);
            }
        }
        if let Some(parent) = record.parent {
            parents.push((key, parent));
        }
        keys.insert(record.unique_id, key);
        project.fire_calendar_read_event(key);
    }

    for (key, parent) in parents {
        match keys.get(&parent) {
            Some(parent) => project.set_calendar_parent(key, Some(*parent)),
            None => warn!(calendar = %key, parent, "base calendar not found, left standalone"),
        }
    }

    Ok(keys)
}

fn load_resources(
    project: &mut ProjectFile,
    records: Vec<ResourceRecord>,
    calendars: &HashMap<u32, CalendarKey>,
) -> Result<HashMap<u32, ResourceKey>, SnapshotError> {
    let mut seen = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut keys = HashMap::new();

    for record in records {
        claim(&mut seen, EntityKind::Resource, record.unique_id)?;
        claim_id(&mut seen_ids, EntityKind::Resource, record.id)?;
        let key = project.add_resource();
        project.set_resource_unique_id(key, Some(record.unique_id));
        project.set_resource_id(key, record.id);
        if let Some(resource) = project.resource_mut(key) {
            resource.name = record.name;
            resource.initials = record.initials;
        }
        if let Some(uid) = record.calendar {
            match calendars.get(&uid) {
                Some(calendar) => project.set_resource_calendar(key, Some(*calendar)),
                None => warn!(resource = record.unique_id, calendar = uid, "resource calendar not found"),
            }
        }
        keys.insert(record.unique_id, key);
        project.fire_resource_read_event(key);
    }

    Ok(keys)
}

fn load_tasks(
    project: &mut ProjectFile,
    records: Vec<TaskRecord>,
) -> Result<HashMap<u32, TaskKey>, SnapshotError> {
    let mut seen = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut keys = HashMap::new();

    for record in records {
        claim(&mut seen, EntityKind::Task, record.unique_id)?;
        claim_id(&mut seen_ids, EntityKind::Task, record.id)?;
        let key = project.add_task();
        project.set_task_unique_id(key, Some(record.unique_id));
        project.set_task_id(key, record.id);
        if let Some(task) = project.task_mut(key) {
            task.name = record.name;
            task.outline_level = record.outline_level;
            task.wbs = record.wbs;
            task.outline_number = record.outline_number;
            task.null = record.null;
            task.milestone = record.milestone;
            task.start = record.start;
            task.finish = record.finish;
            task.actual_start = record.actual_start;
            task.actual_finish = record.actual_finish;
        }
        keys.insert(record.unique_id, key);
        project.fire_task_read_event(key);
    }

    Ok(keys)
}
