//! Unavailability Model (branch closures that block appointments)

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailabilityKind {
    #[default]
    FullDay,
    PartialDay,
}

/// A day (or part of a day) a branch takes no appointments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unavailability {
    #[serde(rename = "_id")]
    pub id: String,
    pub branch_id: String,
    pub date_unavailable: NaiveDate,
    #[serde(default, rename = "type")]
    pub kind: UnavailabilityKind,
    #[serde(default)]
    pub time_start: Option<NaiveTime>,
    #[serde(default)]
    pub time_end: Option<NaiveTime>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Unavailability {
    /// Whether `time` on `date_unavailable` is blocked
    pub fn blocks(&self, time: NaiveTime) -> bool {
        match self.kind {
            UnavailabilityKind::FullDay => true,
            UnavailabilityKind::PartialDay => match (self.time_start, self.time_end) {
                (Some(start), Some(end)) => time >= start && time < end,
                _ => true,
            },
        }
    }
}

/// Create unavailability payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityCreate {
    pub branch_id: String,
    pub date_unavailable: NaiveDate,
    #[serde(rename = "type")]
    pub kind: UnavailabilityKind,
    pub time_start: Option<NaiveTime>,
    pub time_end: Option<NaiveTime>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partial(start: (u32, u32), end: (u32, u32)) -> Unavailability {
        Unavailability {
            id: "u1".into(),
            branch_id: "b1".into(),
            date_unavailable: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            kind: UnavailabilityKind::PartialDay,
            time_start: NaiveTime::from_hms_opt(start.0, start.1, 0),
            time_end: NaiveTime::from_hms_opt(end.0, end.1, 0),
            note: None,
        }
    }

    #[test]
    fn test_partial_day_blocks_window_only() {
        let u = partial((13, 0), (15, 0));
        assert!(!u.blocks(NaiveTime::from_hms_opt(12, 59, 0).unwrap()));
        assert!(u.blocks(NaiveTime::from_hms_opt(13, 0, 0).unwrap()));
        assert!(!u.blocks(NaiveTime::from_hms_opt(15, 0, 0).unwrap()));
    }

    #[test]
    fn test_kind_uses_type_field() {
        let json = serde_json::json!({
            "_id": "u2",
            "branch_id": "b1",
            "date_unavailable": "2025-03-02",
            "type": "full_day"
        });
        let u: Unavailability = serde_json::from_value(json).unwrap();
        assert_eq!(u.kind, UnavailabilityKind::FullDay);
        assert!(u.blocks(NaiveTime::from_hms_opt(9, 0, 0).unwrap()));
    }
}
