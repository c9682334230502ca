use crate::{error::ApiError, model::role::Role};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// Caller identity placed in request extensions by `auth_middleware`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Missing token")),
        )
    }
}

impl AuthUser {
    pub fn require_report_access(&self) -> Result<(), ApiError> {
        if self.role.can_read_reports() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("HR/Admin only".into()))
        }
    }

    pub fn require_refresh_access(&self) -> Result<(), ApiError> {
        if self.role.can_refresh_dashboard() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("Admin/System only".into()))
        }
    }
}
