//! Analytics aggregates (read-only)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sales for one month, optionally broken down per branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// "YYYY-MM"
    pub month: String,
    pub total: f64,
    #[serde(default)]
    pub branches: BTreeMap<String, f64>,
}

/// How often a service was availed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCount {
    pub service: String,
    pub count: i64,
}

/// Dashboard header figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub total_sales: f64,
    #[serde(default)]
    pub total_transactions: i64,
    #[serde(default)]
    pub total_customers: i64,
    #[serde(default)]
    pub pending_pickups: i64,
    #[serde(default)]
    pub unpaid_balance: f64,
}
