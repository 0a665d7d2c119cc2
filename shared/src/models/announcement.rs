//! Announcement Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Announcement shown on the customer-facing site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `None` means every branch
    #[serde(default)]
    pub branch_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Create / replace announcement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementInput {
    pub title: String,
    pub description: String,
    pub branch_id: Option<String>,
}
