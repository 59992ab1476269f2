//! Read/written notifications
//!
//! Format readers fire a `*_read` event per entity as it is loaded; writers
//! fire `*_written` as each entity is emitted. Listeners are plain closures
//! receiving a borrowed entity, invoked synchronously in registration order.

use std::fmt;

use super::ProjectFile;
use crate::domain::{
    AssignmentKey, CalendarKey, ProjectCalendar, Relation, Resource, ResourceAssignment,
    ResourceKey, Task, TaskKey,
};

/// A lifecycle notification carrying the entity it concerns
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectEvent<'a> {
    TaskRead(&'a Task),
    TaskWritten(&'a Task),
    ResourceRead(&'a Resource),
    ResourceWritten(&'a Resource),
    CalendarRead(&'a ProjectCalendar),
    CalendarWritten(&'a ProjectCalendar),
    AssignmentRead(&'a ResourceAssignment),
    AssignmentWritten(&'a ResourceAssignment),
    RelationRead(&'a Relation),
    RelationWritten(&'a Relation),
}

impl ProjectEvent<'_> {
    /// Short name for logs, e.g. `task_read`
    pub fn name(&self) -> &'static str {
        match self {
            ProjectEvent::TaskRead(_) => "task_read",
            ProjectEvent::TaskWritten(_) => "task_written",
            ProjectEvent::ResourceRead(_) => "resource_read",
            ProjectEvent::ResourceWritten(_) => "resource_written",
            ProjectEvent::CalendarRead(_) => "calendar_read",
            ProjectEvent::CalendarWritten(_) => "calendar_written",
            ProjectEvent::AssignmentRead(_) => "assignment_read",
            ProjectEvent::AssignmentWritten(_) => "assignment_written",
            ProjectEvent::RelationRead(_) => "relation_read",
            ProjectEvent::RelationWritten(_) => "relation_written",
        }
    }

    /// Returns true for events fired while loading
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            ProjectEvent::TaskRead(_)
                | ProjectEvent::ResourceRead(_)
                | ProjectEvent::CalendarRead(_)
                | ProjectEvent::AssignmentRead(_)
                | ProjectEvent::RelationRead(_)
        )
    }
}

/// Handle returned on registration, used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A registered event callback
pub type Listener = Box<dyn FnMut(&ProjectEvent<'_>)>;

/// Ordered set of listeners
///
/// Storage is only allocated once the first listener registers.
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Option<Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.len())
            .finish()
    }
}

impl EventDispatcher {
    /// Registers a listener at the end of the delivery order
    pub fn add(&mut self, listener: Listener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners
            .get_or_insert_with(Vec::new)
            .push((id, listener));
        id
    }

    /// Registers several listeners in order
    pub fn add_many(&mut self, listeners: impl IntoIterator<Item = Listener>) -> Vec<ListenerId> {
        listeners.into_iter().map(|l| self.add(l)).collect()
    }

    /// Unregisters a listener, returning false if it was not registered
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.as_mut() else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Delivers an event to every listener
    pub fn dispatch(&mut self, event: &ProjectEvent<'_>) {
        if let Some(listeners) = self.listeners.as_mut() {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    /// Returns the number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.as_ref().map_or(0, Vec::len)
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

macro_rules! fire_entity {
    ($fire:ident, $arena:ident, $key:ty, $variant:ident) => {
        #[doc = concat!("Notifies listeners with `ProjectEvent::", stringify!($variant), "`")]
        pub fn $fire(&mut self, key: $key) {
            if let Some(entity) = self.$arena.get(key) {
                self.events.dispatch(&ProjectEvent::$variant(entity));
            }
        }
    };
}

impl ProjectFile {
    /// Registers a project listener
    pub fn add_project_listener(
        &mut self,
        listener: impl FnMut(&ProjectEvent<'_>) + 'static,
    ) -> ListenerId {
        self.events.add(Box::new(listener))
    }

    /// Registers several project listeners in order
    pub fn add_project_listeners(
        &mut self,
        listeners: impl IntoIterator<Item = Listener>,
    ) -> Vec<ListenerId> {
        self.events.add_many(listeners)
    }

    /// Unregisters a project listener
    pub fn remove_project_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove(id)
    }

    fire_entity!(fire_task_read_event, tasks, TaskKey, TaskRead);
    fire_entity!(fire_task_written_event, tasks, TaskKey, TaskWritten);
    fire_entity!(fire_resource_read_event, resources, ResourceKey, ResourceRead);
    fire_entity!(fire_resource_written_event, resources, ResourceKey, ResourceWritten);
    fire_entity!(fire_calendar_read_event, calendars, CalendarKey, CalendarRead);
    fire_entity!(fire_calendar_written_event, calendars, CalendarKey, CalendarWritten);
    fire_entity!(fire_assignment_read_event, assignments, AssignmentKey, AssignmentRead);
    fire_entity!(
        fire_assignment_written_event,
        assignments,
        AssignmentKey,
        AssignmentWritten
    );

    /// Notifies listeners that a relation was loaded
    pub fn fire_relation_read_event(&mut self, relation: &Relation) {
        self.events.dispatch(&ProjectEvent::RelationRead(relation));
    }

    /// Notifies listeners that a relation was emitted
    pub fn fire_relation_written_event(&mut self, relation: &Relation) {
        self.events.dispatch(&ProjectEvent::RelationWritten(relation));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::Relation;

    fn recorder(project: &mut ProjectFile) -> (ListenerId, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = project.add_project_listener(move |event| {
            sink.borrow_mut().push(event.name().to_string());
        });
        (id, seen)
    }

    #[test]
    fn firing_without_listeners_is_noop() {
        let mut project = ProjectFile::new();
        let task = project.add_task();

        project.fire_task_read_event(task);

        assert!(project.events.is_empty());
        assert!(project.events.listeners.is_none());
    }

    #[test]
    fn listener_receives_entity() {
        let mut project = ProjectFile::new();
        let task = project.add_task();
        project.task_mut(task).unwrap().set_name("Design");

        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        project.add_project_listener(move |event| {
            if let ProjectEvent::TaskWritten(task) = event {
                sink.borrow_mut().push(task.name.clone());
            }
        });

        project.fire_task_written_event(task);

        assert_eq!(*names.borrow(), vec![Some("Design".to_string())]);
    }

    #[test]
    fn delivery_follows_registration_order() {
        let mut project = ProjectFile::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let listeners: Vec<Listener> = (0..3)
            .map(|n| {
                let sink = Rc::clone(&order);
                Box::new(move |_: &ProjectEvent<'_>| sink.borrow_mut().push(n)) as Listener
            })
            .collect();
        project.add_project_listeners(listeners);

        let relation = Relation::finish_start(project.add_task(), project.add_task());
        project.fire_relation_read_event(&relation);

        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn removed_listener_is_silent() {
        let mut project = ProjectFile::new();
        let resource = project.add_resource();
        let (id, seen) = recorder(&mut project);

        project.fire_resource_read_event(resource);
        assert!(project.remove_project_listener(id));
        assert!(!project.remove_project_listener(id));
        project.fire_resource_written_event(resource);

        assert_eq!(*seen.borrow(), vec!["resource_read"]);
    }

    #[test]
    fn every_kind_is_delivered() {
        let mut project = ProjectFile::new();
        let task = project.add_task();
        let resource = project.add_resource();
        let calendar = project.add_calendar();
        let assignment = project.add_resource_assignment(task, Some(resource)).unwrap();
        let (_, seen) = recorder(&mut project);

        project.fire_calendar_read_event(calendar);
        project.fire_calendar_written_event(calendar);
        project.fire_assignment_read_event(assignment);
        project.fire_assignment_written_event(assignment);
        project.fire_relation_written_event(&Relation::finish_start(task, task));

        assert_eq!(
            *seen.borrow(),
            vec![
                "calendar_read",
                "calendar_written",
                "assignment_read",
                "assignment_written",
                "relation_written",
            ]
        );
    }

    #[test]
    fn unknown_entity_fires_nothing() {
        let mut project = ProjectFile::new();
        let task = project.add_task();
        project.remove_task(task);
        let (_, seen) = recorder(&mut project);

        project.fire_task_read_event(task);

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn read_and_written_are_distinguished() {
        let mut project = ProjectFile::new();
        let task = project.add_task();
        let entity = project.task(task).unwrap();

        assert!(ProjectEvent::TaskRead(entity).is_read());
        assert!(!ProjectEvent::TaskWritten(entity).is_read());
    }
}
