use crate::{
    api::{attendance, dashboard},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // only fails for a zero period or burst, both clamped above
        .expect("valid governor config");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/attendance")
                    // /attendance/daily
                    .service(
                        web::resource("/daily")
                            .route(web::get().to(attendance::daily_attendance)),
                    )
                    // /attendance/audit
                    .service(
                        web::resource("/audit").route(web::get().to(attendance::audit_report)),
                    )
                    // /attendance/trend
                    .service(
                        web::resource("/trend")
                            .route(web::get().to(attendance::attendance_trend)),
                    ),
            )
            .service(
                web::scope("/dashboard")
                    // /dashboard
                    .service(web::resource("").route(web::get().to(dashboard::get_dashboard)))
                    // /dashboard/trend
                    .service(
                        web::resource("/trend")
                            .route(web::get().to(dashboard::get_dashboard_trend)),
                    )
                    // /dashboard/presence
                    .service(
                        web::resource("/presence")
                            .route(web::get().to(dashboard::get_dashboard_presence)),
                    )
                    // /dashboard/refresh
                    .service(
                        web::resource("/refresh")
                            .route(web::post().to(dashboard::refresh_dashboard)),
                    ),
            ),
    );
}

// API REQUEST
//  └─ Authorization: Bearer access_token   (issued by the HR portal)
//       └─ auth_middleware → AuthUser in request extensions
//            └─ handler role check (reports: HR/Admin, refresh: Admin/System)
