// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Collections held by the remote record store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Folders,
    Videos,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Folders => "folders",
            Table::Videos => "videos",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record store operations, used to tag collaborator calls in logs and test recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Select,
    Count,
    Create,
    Update,
    Delete,
}
