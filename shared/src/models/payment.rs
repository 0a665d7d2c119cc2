//! Payment Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PaymentMode;

/// Payment record - one cash-in against a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub payment_id: String,
    pub transaction_id: String,
    pub payment_amount: f64,
    #[serde(default)]
    pub payment_mode: PaymentMode,
    pub payment_date: DateTime<Utc>,
}

/// Create payment payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub transaction_id: String,
    pub payment_amount: f64,
    pub payment_mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
}
