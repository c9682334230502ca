use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};

use crate::attendance::trend::build_trend;
use crate::model::daily_aggregate::DailyAggregate;
use crate::model::dashboard_snapshot::{DashboardSnapshot, PresenceSnapshot};
use crate::model::org_unit::{OrgTotals, RosterMember, Scope};

/// Splits a roster into employees with at least one counted scan on `day`
/// and the rest. Roster order is kept in both lists.
pub fn partition_presence(
    roster: &[RosterMember],
    aggregates: &[DailyAggregate],
    day: NaiveDate,
    scope: Scope,
) -> PresenceSnapshot {
    let seen: HashSet<&str> = aggregates
        .iter()
        .filter(|a| a.date == day && a.punch_count >= 1)
        .map(|a| a.employee_id.as_str())
        .collect();

    let (present, absent): (Vec<_>, Vec<_>) = roster
        .iter()
        .cloned()
        .partition(|m| seen.contains(m.employee_id.as_str()));

    PresenceSnapshot {
        scope,
        present,
        absent,
    }
}

/// Everything a dashboard rebuild reads from storage.
pub struct SnapshotInputs<'a> {
    pub totals: OrgTotals,
    pub scope: Scope,
    pub roster: &'a [RosterMember],
    /// Organization-wide aggregates covering at least the trend window.
    pub aggregates: &'a [DailyAggregate],
}

pub fn build_snapshot(
    inputs: SnapshotInputs<'_>,
    as_of: NaiveDate,
    window_days: u32,
    revision: String,
    generated_at: DateTime<Utc>,
) -> DashboardSnapshot {
    let trend = build_trend(inputs.aggregates, as_of, window_days, None);
    let presence = partition_presence(inputs.roster, inputs.aggregates, as_of, inputs.scope);

    DashboardSnapshot {
        revision,
        generated_at,
        as_of,
        totals: inputs.totals,
        trend,
        presence,
    }
}
