use crate::api::dashboard::DashboardResponse;
use crate::attendance::audit::{AuditEntry, AuditReason, AuditReport, AuditView, PatternGroup};
use crate::attendance::classifier::ScanClass;
use crate::model::daily_aggregate::{DailyAggregate, Punch};
use crate::model::dashboard_snapshot::{DashboardSnapshot, PresenceSnapshot, TrendPoint};
use crate::model::org_unit::{OrgTotals, RosterMember, Scope};
use crate::model::scan_event::ScanEvent;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Attendance API",
        version = "1.0.0",
        description = r#"
## HR Attendance Reporting

Read side of the biometric attendance system. Raw fingerprint/card scans are
classified into **IN** / **OUT** / **UNKNOWN**, aggregated per employee and
day, audited for incomplete days and rolled up into dashboard trends.

### 🔹 Key Features
- **Daily aggregates**
  - Punch count, IN/OUT counts, first IN and last OUT per employee-day
- **Audit report**
  - Days with an IN scan but no OUT scan, flat or grouped by punch pattern
- **Trends**
  - Fixed-length, zero-filled present headcount series per scope
- **Dashboard**
  - Cached organization snapshot with present/absent lists, rebuilt on a schedule

Scans from emergency-exit terminals never count towards any figure.

### 🔐 Security
All `/api` endpoints require a **JWT Bearer** access token.
Reports are limited to **HR** and **Admin**; manual refresh to **Admin** and **System**.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::daily_attendance,
        crate::api::attendance::audit_report,
        crate::api::attendance::attendance_trend,

        crate::api::dashboard::get_dashboard,
        crate::api::dashboard::get_dashboard_trend,
        crate::api::dashboard::get_dashboard_presence,
        crate::api::dashboard::refresh_dashboard
    ),
    components(
        schemas(
            ScanEvent,
            ScanClass,
            Punch,
            DailyAggregate,
            AuditView,
            AuditReason,
            AuditEntry,
            PatternGroup,
            AuditReport,
            Scope,
            OrgTotals,
            RosterMember,
            TrendPoint,
            PresenceSnapshot,
            DashboardSnapshot,
            DashboardResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance aggregation and audit APIs"),
        (name = "Dashboard", description = "Cached dashboard snapshot APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
