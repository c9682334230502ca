use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::attendance::AttendanceRules;
use crate::attendance::trend::build_trend;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ApiError;
use crate::model::dashboard_snapshot::{DashboardSnapshot, PresenceSnapshot};
use crate::utils::report_cache::ReportCache;
use crate::utils::snapshot_store::{RefreshOutcome, SnapshotStore, refresh_snapshot};

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    /// False until the first refresh (or warmup) published a snapshot
    #[schema(example = true)]
    pub ready: bool,
    pub snapshot: Option<DashboardSnapshot>,
}

/// Cached dashboard snapshot
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Latest snapshot, or `ready = false` before the first build", body = DashboardResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(_auth: AuthUser, store: web::Data<SnapshotStore>) -> HttpResponse {
    let snapshot = store.current().map(|s| DashboardSnapshot::clone(&s));

    HttpResponse::Ok().json(DashboardResponse {
        ready: snapshot.is_some(),
        snapshot,
    })
}

/// Trend series of the cached snapshot
#[utoipa::path(
    get,
    path = "/api/dashboard/trend",
    responses(
        (status = 200, description = "Snapshot trend; zero-filled window ending today before the first build", body = [TrendPoint]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard_trend(
    _auth: AuthUser,
    store: web::Data<SnapshotStore>,
    config: web::Data<Config>,
) -> HttpResponse {
    match store.current() {
        Some(snapshot) => HttpResponse::Ok().json(&snapshot.trend),
        None => HttpResponse::Ok().json(build_trend(
            &[],
            Local::now().date_naive(),
            config.trend_window_days,
            None,
        )),
    }
}

/// Present/absent lists of the designated unit
#[utoipa::path(
    get,
    path = "/api/dashboard/presence",
    responses(
        (status = 200, description = "Present and absent roster members; both empty before the first build", body = PresenceSnapshot),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard_presence(
    _auth: AuthUser,
    store: web::Data<SnapshotStore>,
    config: web::Data<Config>,
) -> HttpResponse {
    match store.current() {
        Some(snapshot) => HttpResponse::Ok().json(&snapshot.presence),
        None => HttpResponse::Ok().json(PresenceSnapshot {
            scope: config.dashboard_scope.clone(),
            ..PresenceSnapshot::default()
        }),
    }
}

/// Rebuild the dashboard snapshot now
#[utoipa::path(
    post,
    path = "/api/dashboard/refresh",
    responses(
        (status = 200, description = "Snapshot rebuilt", body = Object, example = json!({
            "revision": "0b6c1f9e-6f0e-4f39-9a7e-2f5d3b1f6a10"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "A refresh is already running", body = Object, example = json!({
            "message": "Dashboard refresh already running"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn refresh_dashboard(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    store: web::Data<SnapshotStore>,
    cache: web::Data<ReportCache>,
    rules: web::Data<AttendanceRules>,
    config: web::Data<Config>,
) -> Result<HttpResponse, ApiError> {
    auth.require_refresh_access()?;

    info!(user_id = auth.user_id, user = %auth.username, "Manual dashboard refresh requested");

    match refresh_snapshot(pool.get_ref(), &store, &cache, &rules, &config).await {
        Ok(RefreshOutcome::Refreshed { revision }) => {
            Ok(HttpResponse::Ok().json(json!({ "revision": revision })))
        }
        Ok(RefreshOutcome::AlreadyRunning) => Err(ApiError::Conflict(
            "Dashboard refresh already running".into(),
        )),
        Err(e) => {
            error!(error = ?e, "Manual dashboard refresh failed");
            Err(ApiError::Internal)
        }
    }
}
