use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One raw fingerprint/card scan as delivered by the capture pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScanEvent {
    #[schema(example = "1042")]
    pub employee_id: String,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    /// Missing or unreadable times are kept as `None`.
    #[schema(example = "09:00:00", value_type = Option<String>, format = "time")]
    pub time: Option<NaiveTime>,

    #[schema(example = "IN", nullable = true)]
    pub scan_type: Option<String>,

    #[schema(example = "GATE-2", nullable = true)]
    pub device_id: Option<String>,
}

/// Row shape of `attendance_scans` as selected by `build_scan_query`.
#[derive(Debug, FromRow)]
pub struct ScanRow {
    pub employee_id: String,
    pub scan_date: NaiveDate,
    pub scan_time: Option<String>,
    pub scan_type: Option<String>,
    pub device_id: Option<String>,
}

impl From<ScanRow> for ScanEvent {
    fn from(row: ScanRow) -> Self {
        ScanEvent {
            employee_id: row.employee_id,
            date: row.scan_date,
            time: row.scan_time.as_deref().and_then(parse_scan_time),
            scan_type: row.scan_type,
            device_id: row.device_id,
        }
    }
}

/// Lenient time-of-day parser for device supplied values.
pub fn parse_scan_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(raw, fmt).ok())
}
