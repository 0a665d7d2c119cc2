//! Appointment Model

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Canceled,
}

/// Drop-off appointment booked by a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(rename = "_id")]
    pub id: String,
    pub appointment_id: String,
    pub customer_id: String,
    pub branch_id: String,
    pub date_for_inquiry: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
    #[serde(default)]
    pub status: AppointmentStatus,
}

/// Appointment status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStatusUpdate {
    pub status: AppointmentStatus,
}
