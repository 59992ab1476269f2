//! Task relations (predecessor links)

use serde::{Deserialize, Serialize};

use super::id::TaskKey;

/// How the successor's dates depend on the predecessor's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Successor starts after predecessor finishes
    #[default]
    FinishStart,
    /// Successor starts after predecessor starts
    StartStart,
    /// Successor finishes after predecessor finishes
    FinishFinish,
    /// Successor finishes after predecessor starts
    StartFinish,
}

impl RelationType {
    /// Returns the conventional two-letter code
    pub fn code(&self) -> &'static str {
        match self {
            RelationType::FinishStart => "FS",
            RelationType::StartStart => "SS",
            RelationType::FinishFinish => "FF",
            RelationType::StartFinish => "SF",
        }
    }
}

/// A link between two tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    pub predecessor: TaskKey,
    pub successor: TaskKey,
    pub kind: RelationType,
    /// Lag in working minutes (negative for lead)
    pub lag_minutes: i64,
}

impl Relation {
    /// Creates a finish-to-start relation with no lag
    pub fn finish_start(predecessor: TaskKey, successor: TaskKey) -> Self {
        Self {
            predecessor,
            successor,
            kind: RelationType::FinishStart,
            lag_minutes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArenaKey;

    #[test]
    fn relation_type_codes() {
        assert_eq!(RelationType::FinishStart.code(), "FS");
        assert_eq!(RelationType::StartStart.code(), "SS");
        assert_eq!(RelationType::FinishFinish.code(), "FF");
        assert_eq!(RelationType::StartFinish.code(), "SF");
    }

    #[test]
    fn default_relation_is_finish_start() {
        let relation = Relation::finish_start(TaskKey::from_index(0), TaskKey::from_index(1));
        assert_eq!(relation.kind, RelationType::default());
        assert_eq!(relation.lag_minutes, 0);
    }
}
