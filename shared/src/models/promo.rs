//! Promo Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Promotional campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Days the promo runs on (not necessarily contiguous)
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub branch_id: Option<String>,
    /// Human readable duration, e.g. "Jan 3 - Jan 7"
    #[serde(default)]
    pub duration: Option<String>,
}

impl Promo {
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Create / replace promo payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoInput {
    pub title: String,
    pub description: String,
    pub dates: Vec<NaiveDate>,
    pub branch_id: Option<String>,
}
