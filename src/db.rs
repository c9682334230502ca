use anyhow::{Context, Result};
use chrono::Utc;
use futures_util::StreamExt;
use sqlx::MySqlPool;

use crate::model::dashboard_snapshot::{DashboardSnapshot, SNAPSHOT_ROW_ID};
use crate::model::org_unit::{OrgTotals, RosterMember, Scope};
use crate::model::scan_event::{ScanEvent, ScanRow};
use crate::utils::db_utils::{ScanFilter, SqlQuery, bind_values, build_roster_query, build_scan_query};

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    MySqlPool::connect(database_url).await
}

/// Streams the scans selected by `filter`, in capture order per day.
pub async fn fetch_scan_events(
    pool: &MySqlPool,
    filter: &ScanFilter,
) -> Result<Vec<ScanEvent>, sqlx::Error> {
    let SqlQuery { sql, values } = build_scan_query(filter);

    let mut stream = bind_values(sqlx::query_as::<_, ScanRow>(&sql), values).fetch(pool);
    let mut events = Vec::new();

    while let Some(row) = stream.next().await {
        events.push(ScanEvent::from(row?));
    }

    tracing::debug!(
        from = %filter.from,
        to = %filter.to,
        count = events.len(),
        "Fetched scan events"
    );
    Ok(events)
}

pub async fn fetch_roster(pool: &MySqlPool, scope: &Scope) -> Result<Vec<RosterMember>, sqlx::Error> {
    let SqlQuery { sql, values } = build_roster_query(scope);

    bind_values(sqlx::query_as::<_, RosterMember>(&sql), values)
        .fetch_all(pool)
        .await
}

pub async fn fetch_org_totals(pool: &MySqlPool) -> Result<OrgTotals, sqlx::Error> {
    sqlx::query_as::<_, OrgTotals>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM divisions) AS divisions,
            (SELECT COUNT(*) FROM sections) AS sections,
            (SELECT COUNT(*) FROM subsections) AS subsections,
            (SELECT COUNT(*) FROM employees WHERE is_active = 1) AS employees
        "#,
    )
    .fetch_one(pool)
    .await
}

/// Reads the persisted dashboard row, if one was ever written.
pub async fn load_snapshot(pool: &MySqlPool) -> Result<Option<DashboardSnapshot>> {
    let payload = sqlx::query_scalar::<_, String>(
        "SELECT CAST(payload AS CHAR) FROM dashboard_cache WHERE id = ?",
    )
    .bind(SNAPSHOT_ROW_ID)
    .fetch_optional(pool)
    .await
    .context("failed to read dashboard_cache")?;

    payload
        .map(|p| serde_json::from_str(&p).context("dashboard_cache payload is not a snapshot"))
        .transpose()
}

/// Replaces the whole dashboard row.
pub async fn save_snapshot(pool: &MySqlPool, snapshot: &DashboardSnapshot) -> Result<()> {
    let payload = serde_json::to_string(snapshot).context("failed to serialize snapshot")?;

    sqlx::query("REPLACE INTO dashboard_cache (id, payload, updated_at) VALUES (?, ?, ?)")
        .bind(SNAPSHOT_ROW_ID)
        .bind(payload)
        .bind(Utc::now().naive_utc())
        .execute(pool)
        .await
        .context("failed to write dashboard_cache")?;

    Ok(())
}
