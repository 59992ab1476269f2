//! Calendars, working-time durations, project span and task relations

use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::debug;

use super::{ProjectError, ProjectFile};
use crate::domain::{
    working_minutes_between, CalendarKey, Day, DayType, Duration, ProjectCalendar, Relation,
    RelationError, Task, TaskKey, WorkingRange, BASELINE_CALENDAR_NAME, DEFAULT_BASE_CALENDAR_NAME,
};

impl ProjectFile {
    // =========================================================================
    // Calendars
    // =========================================================================

    /// Returns a calendar followed by its chain of base calendars
    pub fn calendar_ancestry(&self, key: CalendarKey) -> Vec<CalendarKey> {
        let mut chain = Vec::new();
        let mut current = Some(key);
        while let Some(k) = current {
            if chain.contains(&k) || !self.calendars.contains(k) {
                break;
            }
            chain.push(k);
            current = self.calendars.get(k).and_then(|c| c.parent);
        }
        chain
    }

    /// Finds a calendar by name, ignoring case
    pub fn calendar_by_name(&self, name: &str) -> Option<&ProjectCalendar> {
        if name.is_empty() {
            return None;
        }
        self.calendar_entries().find(|c| {
            c.name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
    }

    /// Returns the project calendar
    ///
    /// That is the calendar named in the header, else the first calendar,
    /// else a freshly added default base calendar.
    pub fn calendar(&mut self) -> CalendarKey {
        if let Some(calendar) = self.calendar_by_name(&self.header.calendar_name) {
            return calendar.key();
        }
        if let Some(first) = self.all_calendars.first() {
            return *first;
        }
        self.add_default_base_calendar()
    }

    /// Makes `key` the project calendar by naming it in the header
    ///
    /// An unnamed calendar takes the default base calendar name.
    pub fn set_calendar(&mut self, key: CalendarKey) {
        let Some(calendar) = self.calendars.get_mut(key) else {
            return;
        };
        let name = calendar
            .name
            .get_or_insert_with(|| DEFAULT_BASE_CALENDAR_NAME.to_string())
            .clone();
        self.header.calendar_name = name;
    }

    /// Returns the baseline calendar, falling back to the project calendar
    pub fn baseline_calendar(&mut self) -> CalendarKey {
        match self.calendar_by_name(BASELINE_CALENDAR_NAME) {
            Some(calendar) => calendar.key(),
            None => self.calendar(),
        }
    }

    /// Adds a "Standard" calendar working Monday to Friday, 08:00-17:00
    pub fn add_default_base_calendar(&mut self) -> CalendarKey {
        let key = self.add_calendar();
        if let Some(calendar) = self.calendars.get_mut(key) {
            calendar.set_name(DEFAULT_BASE_CALENDAR_NAME);
            for day in Day::ALL {
                calendar.set_working_day(day, !matches!(day, Day::Saturday | Day::Sunday));
            }
            calendar.add_default_calendar_hours();
        }
        key
    }

    /// Adds a calendar that inherits every day from its base
    pub fn add_default_derived_calendar(&mut self) -> CalendarKey {
        let key = self.add_calendar();
        if let Some(calendar) = self.calendars.get_mut(key) {
            for day in Day::ALL {
                calendar.set_day_type(day, DayType::Default);
            }
        }
        key
    }

    /// Returns true if `day` is worked, resolving inherited days through the
    /// base calendars
    pub fn is_working_day(&self, key: CalendarKey, day: Day) -> bool {
        self.calendar_ancestry(key)
            .into_iter()
            .filter_map(|k| self.calendars.get(k))
            .map(|c| c.day_type(day))
            .find(|t| *t != DayType::Default)
            == Some(DayType::Working)
    }

    /// Returns the working hour ranges, resolved through the base calendars
    pub fn working_hours(&self, key: CalendarKey) -> Vec<WorkingRange> {
        self.calendar_ancestry(key)
            .into_iter()
            .filter_map(|k| self.calendars.get(k))
            .find(|c| !c.hours.is_empty())
            .map(|c| c.hours.clone())
            .unwrap_or_else(WorkingRange::default_hours)
    }

    /// Working time between two instants on a given calendar, in days
    pub fn calendar_duration(
        &self,
        key: CalendarKey,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Duration {
        let hours = self.working_hours(key);
        let minutes = working_minutes_between(start, end, |day| self.is_working_day(key, day), &hours);
        Duration::from_minutes_as_days(minutes)
    }

    /// Working time between two instants on the default calendar
    pub fn duration(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Duration, ProjectError> {
        self.duration_for(&self.options.calendar.default_name, start, end)
    }

    /// Working time between two instants on the named calendar
    pub fn duration_for(
        &self,
        calendar_name: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Duration, ProjectError> {
        let calendar = self
            .calendar_by_name(calendar_name)
            .ok_or_else(|| ProjectError::Configuration(calendar_name.to_string()))?;
        Ok(self.calendar_duration(calendar.key(), start, end))
    }

    // =========================================================================
    // Project span
    // =========================================================================

    fn spanned_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks()
            .filter(|t| !t.is_null() && !t.is_hidden_root())
    }

    /// Earliest effective start over all real tasks
    pub fn start_date(&self) -> Option<NaiveDateTime> {
        self.spanned_tasks().filter_map(|t| t.effective_start()).min()
    }

    /// Latest effective finish over all real tasks
    pub fn finish_date(&self) -> Option<NaiveDateTime> {
        self.spanned_tasks().filter_map(|t| t.effective_finish()).max()
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Links two tasks
    ///
    /// Re-adding a link between the same pair replaces its type and lag.
    pub fn add_relation(&mut self, relation: Relation) -> Result<(), RelationError> {
        for task in [relation.predecessor, relation.successor] {
            if !self.tasks.contains(task) {
                return Err(RelationError::TaskNotFound(task));
            }
        }
        self.relations.add_task(relation.predecessor);
        self.relations.add_task(relation.successor);
        self.relations.add_relation(relation)?;
        debug!(
            predecessor = %relation.predecessor,
            successor = %relation.successor,
            kind = relation.kind.code(),
            "added relation"
        );
        Ok(())
    }

    /// Removes the link between two tasks
    pub fn remove_relation(&mut self, predecessor: TaskKey, successor: TaskKey) -> bool {
        self.relations.remove_relation(predecessor, successor)
    }

    /// Relations where the task is the successor
    pub fn predecessors(&self, task: TaskKey) -> Vec<Relation> {
        self.relations.predecessors(task)
    }

    /// Relations where the task is the predecessor
    pub fn successors(&self, task: TaskKey) -> Vec<Relation> {
        self.relations.successors(task)
    }

    /// Every relation in the project
    pub fn relations(&self) -> Vec<Relation> {
        self.relations.relations()
    }

    /// Every task ordered so predecessors come before successors
    ///
    /// Tasks without relations follow in flat-list order.
    pub fn topological_order(&self) -> Result<Vec<TaskKey>, RelationError> {
        let mut order = self.relations.topological_order()?;
        let linked: HashSet<TaskKey> = order.iter().copied().collect();
        order.extend(self.all_tasks.iter().copied().filter(|k| !linked.contains(k)));
        Ok(order)
    }
}
