//! Field identifiers used by aliases, value lists and indicators

use std::fmt;

use serde::{Deserialize, Serialize};

/// A task field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    Name,
    Wbs,
    OutlineNumber,
    Start,
    Finish,
    Duration,
    /// Custom text field, 1-based
    Text(u8),
    /// Custom number field, 1-based
    Number(u8),
    /// Custom flag field, 1-based
    Flag(u8),
    /// Custom date field, 1-based
    Date(u8),
    /// Custom cost field, 1-based
    Cost(u8),
}

/// A resource field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceField {
    Name,
    Initials,
    Group,
    Text(u8),
    Number(u8),
    Flag(u8),
    Cost(u8),
}

/// Any field, tagged by owning entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Task(TaskField),
    Resource(ResourceField),
}

impl From<TaskField> for FieldType {
    fn from(field: TaskField) -> Self {
        FieldType::Task(field)
    }
}

impl From<ResourceField> for FieldType {
    fn from(field: ResourceField) -> Self {
        FieldType::Resource(field)
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskField::Name => f.write_str("Name"),
            TaskField::Wbs => f.write_str("WBS"),
            TaskField::OutlineNumber => f.write_str("Outline Number"),
            TaskField::Start => f.write_str("Start"),
            TaskField::Finish => f.write_str("Finish"),
            TaskField::Duration => f.write_str("Duration"),
            TaskField::Text(n) => write!(f, "Text{}", n),
            TaskField::Number(n) => write!(f, "Number{}", n),
            TaskField::Flag(n) => write!(f, "Flag{}", n),
            TaskField::Date(n) => write!(f, "Date{}", n),
            TaskField::Cost(n) => write!(f, "Cost{}", n),
        }
    }
}

impl fmt::Display for ResourceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceField::Name => f.write_str("Name"),
            ResourceField::Initials => f.write_str("Initials"),
            ResourceField::Group => f.write_str("Group"),
            ResourceField::Text(n) => write!(f, "Text{}", n),
            ResourceField::Number(n) => write!(f, "Number{}", n),
            ResourceField::Flag(n) => write!(f, "Flag{}", n),
            ResourceField::Cost(n) => write!(f, "Cost{}", n),
        }
    }
}
