//! Transaction Model
//!
//! A transaction is one customer drop-off: a receipt grouping one or more
//! line items (pairs of shoes) with a single running payment balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Nothing paid yet
    #[default]
    #[serde(rename = "NP")]
    NotPaid,
    #[serde(rename = "PARTIAL")]
    Partial,
    #[serde(rename = "PAID")]
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPaid => "NP",
            Self::Partial => "PARTIAL",
            Self::Paid => "PAID",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Cash,
    Gcash,
    Bank,
    Other,
}

/// Transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "_id")]
    pub id: String,
    /// Receipt number shown to the customer
    pub transaction_id: String,
    pub branch_id: String,
    pub customer_id: String,
    #[serde(default)]
    pub line_item_ids: Vec<String>,
    /// Amount due for services (after discount, before storage fees)
    pub total_amount: f64,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
    pub date_in: DateTime<Utc>,
    #[serde(default)]
    pub date_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub no_of_pairs: i64,
    #[serde(default)]
    pub no_released: i64,
    #[serde(default)]
    pub received_by: Option<String>,
}

impl Transaction {
    /// Every pair has been handed back to the customer
    pub fn is_fully_released(&self) -> bool {
        self.no_of_pairs > 0 && self.no_released >= self.no_of_pairs
    }
}

/// One service line within a service request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestItem {
    pub shoes: String,
    pub services: Vec<super::ServiceEntry>,
    #[serde(default)]
    pub priority: super::Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Service-request intake payload
///
/// Creates the transaction and all its line items in one call. Either an
/// existing `customer_id` or a new customer must be supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestCreate {
    pub branch_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<super::CustomerCreate>,
    pub items: Vec<ServiceRequestItem>,
    #[serde(default)]
    pub discount_amount: f64,
    #[serde(default)]
    pub amount_paid: f64,
    pub payment_mode: PaymentMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_by: Option<String>,
}

/// Result of a service-request intake
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestCreated {
    pub transaction: Transaction,
    pub line_items: Vec<super::LineItem>,
}

/// Update transaction payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_mode: Option<PaymentMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_out: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_released: Option<i64>,
}
