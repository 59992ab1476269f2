//! Project-wide header properties

use serde::{Deserialize, Serialize};

use crate::domain::DEFAULT_BASE_CALENDAR_NAME;

/// Project-wide properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectHeader {
    pub title: Option<String>,
    pub author: Option<String>,

    /// Name of the calendar returned by `ProjectFile::calendar`
    pub calendar_name: String,
}

impl Default for ProjectHeader {
    fn default() -> Self {
        Self {
            title: None,
            author: None,
            calendar_name: DEFAULT_BASE_CALENDAR_NAME.to_string(),
        }
    }
}
