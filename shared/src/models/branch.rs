//! Branch Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Branch type
///
/// Hubs are the warehouses where the actual cleaning happens; branches are
/// the drop-off / pickup counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchType {
    #[default]
    Branch,
    Hub,
}

/// Branch entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    #[serde(rename = "_id")]
    pub id: String,
    /// Business code, e.g. "SMVAL-B-NCR"
    pub branch_id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub branch_type: BranchType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Branch {
    pub fn is_hub(&self) -> bool {
        self.branch_type == BranchType::Hub
    }
}

/// Create branch payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub branch_id: String,
    pub name: String,
    pub location: String,
    pub branch_type: BranchType,
}

/// Update branch payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_type: Option<BranchType>,
}
