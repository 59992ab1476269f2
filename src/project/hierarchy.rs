//! Task hierarchy: flat list ⇄ forest
//!
//! Format readers deliver tasks as a flat list ordered by ID with an outline
//! level on each row. [`ProjectFile::update_structure`] turns that into the
//! parent/child forest and derives WBS and outline-number labels.
//! [`ProjectFile::synchronize_task_id_to_hierarchy`] goes the other way,
//! numbering tasks in pre-order so a writer can emit them sequentially.

use tracing::debug;

use super::ProjectFile;
use crate::domain::{derive_label, TaskKey};

impl ProjectFile {
    /// Rebuilds the task forest from the flat list and outline levels
    ///
    /// Equal outline levels are siblings, a deeper level nests under the
    /// previous task, and a shallower level climbs to the nearest ancestor
    /// with a strictly lower level. A row with no such ancestor becomes a
    /// top-level task. Placeholder tasks join the parent of the previous real
    /// task and take no part in level comparison or labelling.
    pub fn update_structure(&mut self) {
        if self.all_tasks.is_empty() {
            return;
        }

        self.sort_tasks_by_id();
        self.child_tasks.clear();
        for key in &self.all_tasks {
            if let Some(task) = self.tasks.get_mut(*key) {
                task.parent = None;
                task.children.clear();
            }
        }

        let mut previous: Option<TaskKey> = None;
        for key in self.all_tasks.clone() {
            let Some(task) = self.tasks.get(key) else {
                continue;
            };

            if task.null {
                let parent = previous.and_then(|p| self.task_parent(p));
                self.attach(key, parent);
                continue;
            }

            let level = task.outline_level.unwrap_or(1);
            let parent = previous.and_then(|prev| self.placement_parent(prev, level));
            let position = self.attach(key, parent);
            self.derive_labels(key, parent, position);
            previous = Some(key);
        }

        debug!(
            tasks = self.all_tasks.len(),
            top_level = self.child_tasks.len(),
            "rebuilt task structure"
        );
    }

    fn outline_level_of(&self, key: TaskKey) -> u32 {
        self.tasks
            .get(key)
            .and_then(|t| t.outline_level)
            .unwrap_or(1)
    }

    /// Parent for a task at `level` that follows `previous` in the flat list
    fn placement_parent(&self, previous: TaskKey, level: u32) -> Option<TaskKey> {
        let previous_level = self.outline_level_of(previous);
        if level == previous_level {
            return self.task_parent(previous);
        }
        if level > previous_level {
            return Some(previous);
        }

        let mut ancestor = self.task_parent(previous);
        while let Some(candidate) = ancestor {
            if self.outline_level_of(candidate) < level {
                break;
            }
            ancestor = self.task_parent(candidate);
        }
        ancestor
    }

    /// Appends `key` to its parent's children (or the top level) and returns
    /// its 1-based position there
    fn attach(&mut self, key: TaskKey, parent: Option<TaskKey>) -> usize {
        if let Some(task) = self.tasks.get_mut(key) {
            task.parent = parent;
        }
        match parent.and_then(|p| self.tasks.get_mut(p)) {
            Some(parent) => {
                parent.children.push(key);
                parent.children.len()
            }
            None => {
                self.child_tasks.push(key);
                self.child_tasks.len()
            }
        }
    }

    fn derive_labels(&mut self, key: TaskKey, parent: Option<TaskKey>, position: usize) {
        let (parent_wbs, parent_outline) = match parent.and_then(|p| self.tasks.get(p)) {
            Some(p) => (Some(p.wbs.clone()), Some(p.outline_number.clone())),
            None => (None, None),
        };
        let auto_wbs = self.options.structure.auto_wbs;
        let auto_outline_number = self.options.structure.auto_outline_number;

        let Some(task) = self.tasks.get_mut(key) else {
            return;
        };
        let hidden_root = task.is_hidden_root();

        if auto_wbs || task.wbs.is_none() {
            let label = parent_wbs.as_ref().map(|l| l.as_deref());
            task.wbs = Some(derive_label(label, position, hidden_root));
        }
        if auto_outline_number {
            let label = parent_outline.as_ref().map(|l| l.as_deref());
            task.outline_number = Some(derive_label(label, position, hidden_root));
        }
    }

    /// Renumbers task IDs in pre-order and rebuilds the flat list to match
    ///
    /// Numbering starts at 0 when a task with ID 0 exists, else 1.
    pub fn synchronize_task_id_to_hierarchy(&mut self) {
        let order = self.tasks_depth_first();
        let mut next = if self.task_ids.get(0).is_some() { 0 } else { 1 };

        self.all_tasks.clear();
        for key in order {
            self.set_task_id(key, Some(next));
            self.all_tasks.push(key);
            next += 1;
        }

        if next > 0 {
            self.counters.task_id.raise_to(next - 1);
        }
        debug!(tasks = self.all_tasks.len(), "synchronized task ids to hierarchy");
    }

    /// Returns every task in the forest in pre-order
    pub fn tasks_depth_first(&self) -> Vec<TaskKey> {
        let mut order = Vec::with_capacity(self.all_tasks.len());
        let mut stack: Vec<TaskKey> = self.child_tasks.iter().rev().copied().collect();

        while let Some(key) = stack.pop() {
            order.push(key);
            if let Some(task) = self.tasks.get(key) {
                stack.extend(task.children.iter().rev().copied());
            }
        }

        order
    }

    /// Returns the children of a task
    pub fn task_children(&self, key: TaskKey) -> &[TaskKey] {
        match self.tasks.get(key) {
            Some(task) => &task.children,
            None => &[],
        }
    }

    /// Returns the parent of a task, None for top-level or unknown tasks
    pub fn task_parent(&self, key: TaskKey) -> Option<TaskKey> {
        self.tasks.get(key)?.parent
    }

    /// Returns the depth of a task in the forest, 1 for top level
    pub fn task_depth(&self, key: TaskKey) -> Option<u32> {
        let mut task = self.tasks.get(key)?;
        let mut depth = 1;
        while let Some(parent) = task.parent.and_then(|p| self.tasks.get(p)) {
            depth += 1;
            task = parent;
        }
        Some(depth)
    }

    /// Returns true if `ancestor` is `key` or one of its ancestors
    fn is_ancestor_or_self(&self, ancestor: TaskKey, key: TaskKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.task_parent(k);
        }
        false
    }

    /// Moves a task (with its subtree) under a new parent, or to the top level
    ///
    /// Returns false if either task is unknown or the move would put a task
    /// inside its own subtree. Outline levels of the moved subtree follow
    /// the new depth when `auto_outline_level` is on.
    pub fn reparent_task(&mut self, key: TaskKey, new_parent: Option<TaskKey>) -> bool {
        if !self.tasks.contains(key) {
            return false;
        }
        if let Some(parent) = new_parent {
            if !self.tasks.contains(parent) || self.is_ancestor_or_self(key, parent) {
                return false;
            }
        }

        self.detach(key);
        self.attach(key, new_parent);

        if self.options.structure.auto_outline_level {
            let base = new_parent.and_then(|p| self.task_depth(p)).unwrap_or(0);
            self.relevel_subtree(key, base + 1);
        }
        true
    }

    /// Removes a task from its parent's child list or the top level
    pub(crate) fn detach(&mut self, key: TaskKey) {
        match self.task_parent(key) {
            Some(parent) => {
                if let Some(parent) = self.tasks.get_mut(parent) {
                    parent.children.retain(|c| *c != key);
                }
            }
            None => self.child_tasks.retain(|c| *c != key),
        }
        if let Some(task) = self.tasks.get_mut(key) {
            task.parent = None;
        }
    }

    fn relevel_subtree(&mut self, key: TaskKey, level: u32) {
        let mut stack = vec![(key, level)];
        while let Some((key, level)) = stack.pop() {
            if let Some(task) = self.tasks.get_mut(key) {
                task.outline_level = Some(level);
                stack.extend(task.children.iter().map(|c| (*c, level + 1)));
            }
        }
    }
}
