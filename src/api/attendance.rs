use std::sync::Arc;

use actix_web::{HttpResponse, web};
use chrono::{Days, Local, NaiveDate};
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::IntoParams;

use crate::attendance::AttendanceRules;
use crate::attendance::audit::AuditView;
use crate::attendance::trend::build_trend;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::model::daily_aggregate::DailyAggregate;
use crate::model::org_unit::Scope;
use crate::utils::db_utils::ScanFilter;
use crate::utils::report_cache::ReportCache;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// First day of the range, defaults to `to`
    #[param(value_type = Option<String>, example = "2026-01-01")]
    pub from: Option<NaiveDate>,
    /// Last day of the range, defaults to today
    #[param(value_type = Option<String>, example = "2026-01-07")]
    pub to: Option<NaiveDate>,
    pub division_id: Option<u64>,
    pub section_id: Option<u64>,
    pub subsection_id: Option<u64>,
    pub employee_id: Option<String>,
    /// Audit only: `flat` (default) or `grouped` by punch pattern
    #[param(value_type = Option<String>, example = "grouped")]
    pub view: Option<AuditView>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendQuery {
    /// Last day of the series, defaults to today
    #[param(value_type = Option<String>, example = "2026-01-07")]
    pub to: Option<NaiveDate>,
    /// Number of days, defaults to the dashboard window
    pub days: Option<u32>,
    pub division_id: Option<u64>,
    pub section_id: Option<u64>,
    pub subsection_id: Option<u64>,
}

fn scope_of(division_id: Option<u64>, section_id: Option<u64>, subsection_id: Option<u64>) -> Scope {
    Scope {
        division_id,
        section_id,
        subsection_id,
    }
}

/// Resolves optional bounds into an inclusive range no longer than `max_days`.
pub fn resolve_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    today: NaiveDate,
    max_days: u32,
) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let to = to.unwrap_or(today);
    let from = from.unwrap_or(to);

    if from > to {
        return Err(ApiError::BadRequest("`from` must not be after `to`".into()));
    }

    let span = (to - from).num_days() + 1;
    if span > i64::from(max_days) {
        return Err(ApiError::BadRequest(format!(
            "Date range too large: {span} days (max {max_days})"
        )));
    }

    Ok((from, to))
}

/// Aggregates for a filter, served from the report cache when possible.
async fn load_aggregates(
    pool: &MySqlPool,
    cache: &ReportCache,
    rules: &AttendanceRules,
    filter: ScanFilter,
) -> Result<Arc<Vec<DailyAggregate>>, ApiError> {
    let key = filter.clone();

    cache
        .get_or_load(key, async {
            let events = db::fetch_scan_events(pool, &filter).await?;
            Ok::<_, sqlx::Error>(rules.aggregate(&events))
        })
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load attendance scans");
            ApiError::Database
        })
}

/// Daily attendance aggregates
#[utoipa::path(
    get,
    path = "/api/attendance/daily",
    params(ReportQuery),
    responses(
        (status = 200, description = "One entry per employee and day with at least one counted scan", body = [DailyAggregate]),
        (status = 400, description = "Invalid date range", body = Object, example = json!({
            "message": "`from` must not be after `to`"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn daily_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<ReportCache>,
    rules: web::Data<AttendanceRules>,
    config: web::Data<Config>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_report_access()?;

    let query = query.into_inner();
    let today = Local::now().date_naive();
    let (from, to) = resolve_range(query.from, query.to, today, config.max_report_days)?;

    let filter = ScanFilter {
        from,
        to,
        scope: scope_of(query.division_id, query.section_id, query.subsection_id),
        employee_id: query.employee_id,
    };
    debug!(?filter, user = %auth.username, "Daily attendance requested");

    let aggregates = load_aggregates(pool.get_ref(), &cache, &rules, filter).await?;

    Ok(HttpResponse::Ok().json(&*aggregates))
}

/// Audit report of incomplete attendance days
#[utoipa::path(
    get,
    path = "/api/attendance/audit",
    params(ReportQuery),
    responses(
        (status = 200, description = "Flagged employee-days, flat or grouped by punch pattern", body = AuditReport),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn audit_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<ReportCache>,
    rules: web::Data<AttendanceRules>,
    config: web::Data<Config>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_report_access()?;

    let query = query.into_inner();
    let today = Local::now().date_naive();
    let (from, to) = resolve_range(query.from, query.to, today, config.max_report_days)?;
    let view = query.view.unwrap_or_default();

    let filter = ScanFilter {
        from,
        to,
        scope: scope_of(query.division_id, query.section_id, query.subsection_id),
        employee_id: query.employee_id,
    };
    debug!(?filter, %view, user = %auth.username, "Audit report requested");

    let aggregates = load_aggregates(pool.get_ref(), &cache, &rules, filter).await?;
    let report = rules.audit_report(&aggregates, view);

    Ok(HttpResponse::Ok().json(report))
}

/// Present headcount trend for a scope
#[utoipa::path(
    get,
    path = "/api/attendance/trend",
    params(TrendQuery),
    responses(
        (status = 200, description = "Exactly `days` points, oldest first, zero-filled", body = [TrendPoint]),
        (status = 400, description = "Invalid window"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_trend(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<ReportCache>,
    rules: web::Data<AttendanceRules>,
    config: web::Data<Config>,
    query: web::Query<TrendQuery>,
) -> Result<HttpResponse, ApiError> {
    auth.require_report_access()?;

    let days = query.days.unwrap_or(config.trend_window_days);
    if days == 0 || days > config.max_report_days {
        return Err(ApiError::BadRequest(format!(
            "`days` must be between 1 and {}",
            config.max_report_days
        )));
    }

    let to = query.to.unwrap_or_else(|| Local::now().date_naive());
    let from = to
        .checked_sub_days(Days::new(u64::from(days - 1)))
        .ok_or_else(|| ApiError::BadRequest("Window starts before the calendar".into()))?;

    let filter = ScanFilter {
        from,
        to,
        scope: scope_of(query.division_id, query.section_id, query.subsection_id),
        employee_id: None,
    };

    let aggregates = load_aggregates(pool.get_ref(), &cache, &rules, filter).await?;

    Ok(HttpResponse::Ok().json(build_trend(&aggregates, to, days, None)))
}
