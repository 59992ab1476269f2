//! Presentation metadata carried alongside the plan
//!
//! Filters, groups, tables, views, field aliases and the like. None of this
//! affects identity or structure; the registry only stores and indexes it
//! for the format collaborators that read and write it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{FieldType, ResourceField, TaskField};

/// A saved filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: u32,
    pub name: String,
    pub task_filter: bool,
    pub resource_filter: bool,
    #[serde(default)]
    pub criteria: Option<String>,
}

/// A saved grouping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub show_summary_tasks: bool,
    #[serde(default)]
    pub fields: Vec<FieldType>,
}

/// A column layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: u32,
    pub name: String,
    /// True for a resource table, false for a task table
    pub resource_flag: bool,
}

/// A saved view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub table_name: Option<String>,
}

/// One rule of a graphical indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorCriterion {
    pub operator: String,
    pub value: serde_json::Value,
    pub indicator: u32,
}

/// Icon rules bound to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphicalIndicator {
    pub field: FieldType,
    #[serde(default)]
    pub display_in_summary_rows: bool,
    #[serde(default)]
    pub criteria: Vec<IndicatorCriterion>,
}

/// An inserted sub-project reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubProject {
    pub file_name: String,
    #[serde(default)]
    pub task_unique_id: Option<u32>,
    #[serde(default)]
    pub unique_id_offset: Option<u32>,
}

/// The view and filter active when the plan was saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub view_name: String,
    #[serde(default)]
    pub filter_id: Option<u32>,
}

/// All metadata registries of a project
#[derive(Debug, Clone, Default)]
pub struct ProjectMetadata {
    task_aliases: HashMap<TaskField, String>,
    task_fields_by_alias: HashMap<String, TaskField>,
    resource_aliases: HashMap<ResourceField, String>,
    resource_fields_by_alias: HashMap<String, ResourceField>,
    task_value_lists: HashMap<TaskField, Vec<serde_json::Value>>,
    task_description_lists: HashMap<TaskField, Vec<String>>,

    task_filters: Vec<Filter>,
    resource_filters: Vec<Filter>,
    filters_by_name: HashMap<String, Filter>,
    filters_by_id: HashMap<u32, Filter>,

    groups: Vec<Group>,
    tables: Vec<Table>,
    views: Vec<View>,
    graphical_indicators: HashMap<FieldType, GraphicalIndicator>,

    sub_projects: Vec<SubProject>,
    resource_sub_project: Option<SubProject>,

    pub auto_filter: bool,
    pub view_state: Option<ViewState>,
}

impl ProjectMetadata {
    // -------------------------------------------------------------------------
    // Field aliases
    // -------------------------------------------------------------------------

    /// Sets a display alias for a task field, replacing any previous alias
    pub fn set_task_field_alias(&mut self, field: TaskField, alias: impl Into<String>) {
        let alias = alias.into();
        if alias.is_empty() {
            return;
        }
        if let Some(old) = self.task_aliases.insert(field, alias.clone()) {
            self.task_fields_by_alias.remove(&old);
        }
        self.task_fields_by_alias.insert(alias, field);
    }

    pub fn task_field_alias(&self, field: TaskField) -> Option<&str> {
        self.task_aliases.get(&field).map(String::as_str)
    }

    pub fn task_field_by_alias(&self, alias: &str) -> Option<TaskField> {
        self.task_fields_by_alias.get(alias).copied()
    }

    /// Sets a display alias for a resource field, replacing any previous alias
    pub fn set_resource_field_alias(&mut self, field: ResourceField, alias: impl Into<String>) {
        let alias = alias.into();
        if alias.is_empty() {
            return;
        }
        if let Some(old) = self.resource_aliases.insert(field, alias.clone()) {
            self.resource_fields_by_alias.remove(&old);
        }
        self.resource_fields_by_alias.insert(alias, field);
    }

    pub fn resource_field_alias(&self, field: ResourceField) -> Option<&str> {
        self.resource_aliases.get(&field).map(String::as_str)
    }

    pub fn resource_field_by_alias(&self, alias: &str) -> Option<ResourceField> {
        self.resource_fields_by_alias.get(alias).copied()
    }

    /// Returns every task field alias
    pub fn task_field_aliases(&self) -> &HashMap<TaskField, String> {
        &self.task_aliases
    }

    /// Returns every resource field alias
    pub fn resource_field_aliases(&self) -> &HashMap<ResourceField, String> {
        &self.resource_aliases
    }

    pub fn set_task_field_value_list(&mut self, field: TaskField, values: Vec<serde_json::Value>) {
        self.task_value_lists.insert(field, values);
    }

    pub fn task_field_value_list(&self, field: TaskField) -> Option<&[serde_json::Value]> {
        self.task_value_lists.get(&field).map(Vec::as_slice)
    }

    pub fn set_task_field_description_list(&mut self, field: TaskField, descriptions: Vec<String>) {
        self.task_description_lists.insert(field, descriptions);
    }

    pub fn task_field_description_list(&self, field: TaskField) -> Option<&[String]> {
        self.task_description_lists.get(&field).map(Vec::as_slice)
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Registers a filter in the task and/or resource lists
    ///
    /// A filter already registered under the same id or name is replaced.
    pub fn add_filter(&mut self, filter: Filter) {
        if let Some(previous) = self.filters_by_id.remove(&filter.id) {
            self.forget_filter(&previous);
        }
        if let Some(previous) = self.filters_by_name.remove(&filter.name) {
            self.forget_filter(&previous);
        }

        if filter.task_filter {
            self.task_filters.push(filter.clone());
        }
        if filter.resource_filter {
            self.resource_filters.push(filter.clone());
        }
        self.filters_by_id.insert(filter.id, filter.clone());
        self.filters_by_name.insert(filter.name.clone(), filter);
    }

    /// Removes a filter by name from every list
    pub fn remove_filter(&mut self, name: &str) -> Option<Filter> {
        let filter = self.filters_by_name.remove(name)?;
        self.forget_filter(&filter);
        Some(filter)
    }

    fn forget_filter(&mut self, filter: &Filter) {
        self.task_filters.retain(|f| f != filter);
        self.resource_filters.retain(|f| f != filter);
        if self.filters_by_id.get(&filter.id) == Some(filter) {
            self.filters_by_id.remove(&filter.id);
        }
        if self.filters_by_name.get(&filter.name) == Some(filter) {
            self.filters_by_name.remove(&filter.name);
        }
    }

    pub fn task_filters(&self) -> &[Filter] {
        &self.task_filters
    }

    pub fn resource_filters(&self) -> &[Filter] {
        &self.resource_filters
    }

    pub fn filter_by_name(&self, name: &str) -> Option<&Filter> {
        self.filters_by_name.get(name)
    }

    pub fn filter_by_id(&self, id: u32) -> Option<&Filter> {
        self.filters_by_id.get(&id)
    }

    // -------------------------------------------------------------------------
    // Groups, tables, views
    // -------------------------------------------------------------------------

    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn task_table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| !t.resource_flag && t.name == name)
    }

    pub fn resource_table_by_name(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.resource_flag && t.name == name)
    }

    pub fn add_view(&mut self, view: View) {
        self.views.push(view);
    }

    pub fn views(&self) -> &[View] {
        &self.views
    }

    // -------------------------------------------------------------------------
    // Indicators and sub-projects
    // -------------------------------------------------------------------------

    /// Binds a graphical indicator to its field, replacing any existing one
    pub fn add_graphical_indicator(&mut self, indicator: GraphicalIndicator) {
        self.graphical_indicators.insert(indicator.field, indicator);
    }

    pub fn graphical_indicator(&self, field: FieldType) -> Option<&GraphicalIndicator> {
        self.graphical_indicators.get(&field)
    }

    pub fn add_sub_project(&mut self, project: SubProject) {
        self.sub_projects.push(project);
    }

    pub fn sub_projects(&self) -> &[SubProject] {
        &self.sub_projects
    }

    pub fn set_resource_sub_project(&mut self, project: Option<SubProject>) {
        self.resource_sub_project = project;
    }

    pub fn resource_sub_project(&self) -> Option<&SubProject> {
        self.resource_sub_project.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(id: u32, name: &str, task: bool, resource: bool) -> Filter {
        Filter {
            id,
            name: name.to_string(),
            task_filter: task,
            resource_filter: resource,
            criteria: None,
        }
    }

    #[test]
    fn task_alias_is_bidirectional() {
        let mut metadata = ProjectMetadata::default();
        metadata.set_task_field_alias(TaskField::Text(1), "Owner");

        assert_eq!(metadata.task_field_alias(TaskField::Text(1)), Some("Owner"));
        assert_eq!(metadata.task_field_by_alias("Owner"), Some(TaskField::Text(1)));
    }

    #[test]
    fn replacing_alias_drops_old_reverse_entry() {
        let mut metadata = ProjectMetadata::default();
        metadata.set_resource_field_alias(ResourceField::Text(2), "Team");
        metadata.set_resource_field_alias(ResourceField::Text(2), "Squad");

        assert!(metadata.resource_field_by_alias("Team").is_none());
        assert_eq!(
            metadata.resource_field_by_alias("Squad"),
            Some(ResourceField::Text(2))
        );
        assert_eq!(metadata.resource_field_aliases().len(), 1);
    }

    #[test]
    fn empty_alias_is_ignored() {
        let mut metadata = ProjectMetadata::default();
        metadata.set_task_field_alias(TaskField::Number(3), "");
        assert!(metadata.task_field_alias(TaskField::Number(3)).is_none());
    }

    #[test]
    fn re_adding_a_filter_id_drops_the_old_name() {
        let mut metadata = ProjectMetadata::default();
        metadata.add_filter(filter(1, "Critical", true, false));
        metadata.add_filter(filter(1, "Late", true, true));

        assert!(metadata.filter_by_name("Critical").is_none());
        assert_eq!(metadata.filter_by_name("Late").unwrap().id, 1);
        assert_eq!(metadata.filter_by_id(1).unwrap().name, "Late");
        assert_eq!(metadata.task_filters().len(), 1);
        assert_eq!(metadata.resource_filters().len(), 1);
    }

    #[test]
    fn re_adding_a_filter_name_drops_the_old_id() {
        let mut metadata = ProjectMetadata::default();
        metadata.add_filter(filter(1, "Critical", true, false));
        metadata.add_filter(filter(2, "Critical", true, false));

        assert!(metadata.filter_by_id(1).is_none());
        assert_eq!(metadata.filter_by_name("Critical").unwrap().id, 2);
        assert_eq!(metadata.task_filters().len(), 1);
    }

    #[test]
    fn filters_land_in_matching_lists() {
        let mut metadata = ProjectMetadata::default();
        metadata.add_filter(filter(1, "Critical", true, false));
        metadata.add_filter(filter(2, "Overallocated", false, true));
        metadata.add_filter(filter(3, "All", true, true));

        assert_eq!(metadata.task_filters().len(), 2);
        assert_eq!(metadata.resource_filters().len(), 2);
        assert_eq!(metadata.filter_by_id(2).unwrap().name, "Overallocated");
        assert_eq!(metadata.filter_by_name("Critical").unwrap().id, 1);
    }

    #[test]
    fn remove_filter_clears_every_index() {
        let mut metadata = ProjectMetadata::default();
        metadata.add_filter(filter(3, "All", true, true));

        assert!(metadata.remove_filter("All").is_some());
        assert!(metadata.remove_filter("All").is_none());
        assert!(metadata.task_filters().is_empty());
        assert!(metadata.resource_filters().is_empty());
        assert!(metadata.filter_by_id(3).is_none());
    }

    #[test]
    fn tables_split_by_kind() {
        let mut metadata = ProjectMetadata::default();
        metadata.add_table(Table {
            id: 1,
            name: "Entry".to_string(),
            resource_flag: false,
        });
        metadata.add_table(Table {
            id: 2,
            name: "Entry".to_string(),
            resource_flag: true,
        });

        assert_eq!(metadata.task_table_by_name("Entry").unwrap().id, 1);
        assert_eq!(metadata.resource_table_by_name("Entry").unwrap().id, 2);
        assert_eq!(metadata.tables().len(), 2);
    }

    #[test]
    fn indicator_keyed_by_field() {
        let mut metadata = ProjectMetadata::default();
        let field = FieldType::Task(TaskField::Number(1));
        metadata.add_graphical_indicator(GraphicalIndicator {
            field,
            display_in_summary_rows: true,
            criteria: vec![IndicatorCriterion {
                operator: "greater_than".to_string(),
                value: serde_json::json!(10),
                indicator: 4,
            }],
        });

        let indicator = metadata.graphical_indicator(field).unwrap();
        assert_eq!(indicator.criteria[0].indicator, 4);
        assert!(metadata
            .graphical_indicator(FieldType::Task(TaskField::Number(2)))
            .is_none());
    }

    #[test]
    fn value_and_description_lists() {
        let mut metadata = ProjectMetadata::default();
        let field = TaskField::Text(5);
        metadata.set_task_field_value_list(field, vec![serde_json::json!("low")]);
        metadata.set_task_field_description_list(field, vec!["Low risk".to_string()]);

        assert_eq!(metadata.task_field_value_list(field).unwrap().len(), 1);
        assert_eq!(
            metadata.task_field_description_list(field),
            Some(&["Low risk".to_string()][..])
        );
    }

    #[test]
    fn groups_views_and_sub_projects() {
        let mut metadata = ProjectMetadata::default();
        metadata.add_group(Group {
            id: 1,
            name: "By phase".to_string(),
            show_summary_tasks: true,
            fields: vec![FieldType::Task(TaskField::Text(1))],
        });
        metadata.add_view(View {
            id: 1,
            name: "Gantt".to_string(),
            table_name: Some("Entry".to_string()),
        });
        metadata.add_sub_project(SubProject {
            file_name: "child.mpp".to_string(),
            task_unique_id: Some(12),
            unique_id_offset: None,
        });
        metadata.set_resource_sub_project(Some(SubProject {
            file_name: "pool.mpp".to_string(),
            task_unique_id: None,
            unique_id_offset: None,
        }));
        metadata.view_state = Some(ViewState {
            view_name: "Gantt".to_string(),
            filter_id: None,
        });

        assert!(metadata.group_by_name("By phase").is_some());
        assert!(metadata.group_by_name("By owner").is_none());
        assert_eq!(metadata.views()[0].name, "Gantt");
        assert_eq!(metadata.sub_projects().len(), 1);
        assert_eq!(metadata.resource_sub_project().unwrap().file_name, "pool.mpp");
        assert!(!metadata.auto_filter);
    }
}
