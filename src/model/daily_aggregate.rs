use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single entry of a day's punch sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Punch {
    #[schema(example = "09:00:00", value_type = Option<String>, format = "time")]
    pub time: Option<NaiveTime>,
    /// Scan type exactly as the device reported it; empty when missing.
    #[schema(example = "IN")]
    pub scan_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "employee_id": "1042",
    "date": "2026-01-05",
    "punch_count": 2,
    "in_count": 1,
    "out_count": 1,
    "first_in": "09:00:00",
    "last_out": "17:30:00",
    "punch_sequence": [
        {"time": "09:00:00", "scan_type": "IN"},
        {"time": "17:30:00", "scan_type": "OUT"}
    ]
}))]
pub struct DailyAggregate {
    pub employee_id: String,

    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    pub punch_count: u32,
    pub in_count: u32,
    pub out_count: u32,

    /// Earliest IN-classified time, independent of `last_out`.
    #[schema(value_type = Option<String>, format = "time")]
    pub first_in: Option<NaiveTime>,

    /// Latest OUT-classified time, independent of `first_in`.
    #[schema(value_type = Option<String>, format = "time")]
    pub last_out: Option<NaiveTime>,

    pub punch_sequence: Vec<Punch>,
}

impl DailyAggregate {
    /// Raw scan types of the day in punch order.
    pub fn scan_types(&self) -> Vec<&str> {
        self.punch_sequence
            .iter()
            .map(|p| p.scan_type.as_str())
            .collect()
    }

    /// Display label of the punch sequence, e.g. `IN > ? > OUT`.
    pub fn punch_pattern(&self) -> String {
        self.punch_sequence
            .iter()
            .map(|p| match p.scan_type.trim() {
                "" => "?",
                t => t,
            })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
