use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::org_unit::{OrgTotals, RosterMember, Scope};

/// Primary key of the single `dashboard_cache` row.
pub const SNAPSHOT_ROW_ID: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrendPoint {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = 1830)]
    pub present_count: u32,
}

/// Present/absent partition of one scope's roster for a single day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PresenceSnapshot {
    pub scope: Scope,
    pub present: Vec<RosterMember>,
    pub absent: Vec<RosterMember>,
}

/// Organization-wide dashboard state, rebuilt and replaced as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DashboardSnapshot {
    #[schema(example = "0b6c1f9e-6f0e-4f39-9a7e-2f5d3b1f6a10")]
    pub revision: String,

    #[schema(example = "2026-01-05T08:15:00Z", value_type = String, format = "date-time")]
    pub generated_at: DateTime<Utc>,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub as_of: NaiveDate,

    pub totals: OrgTotals,
    pub trend: Vec<TrendPoint>,
    pub presence: PresenceSnapshot,
}
