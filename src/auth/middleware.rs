use crate::auth::auth::AuthUser;
use crate::auth::jwt::{TokenType, verify_token};
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

fn reject(req: ServiceRequest, body: serde_json::Value) -> ServiceResponse<BoxBody> {
    let resp = HttpResponse::Unauthorized().json(body);
    req.into_response(resp.map_into_boxed_body())
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header_value = match req.headers().get("Authorization") {
        Some(h) => match h.to_str() {
            Ok(v) => v.to_owned(),
            Err(_) => {
                return Ok(reject(
                    req,
                    json!({"error": "Invalid Authorization header encoding"}),
                ));
            }
        },
        None => {
            return Ok(reject(req, json!({"error": "Missing Authorization header"})));
        }
    };

    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Ok(reject(
            req,
            json!({"error": "Authorization header must start with Bearer"}),
        ));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            return Ok(reject(
                req,
                json!({"error": "Invalid or expired token", "details": e}),
            ));
        }
    };

    if claims.token_type != TokenType::Access {
        return Ok(reject(req, json!({"error": "Access token required"})));
    }

    let Some(role) = Role::from_id(claims.role) else {
        return Ok(reject(req, json!({"error": "Invalid role"})));
    };

    tracing::debug!(user_id = claims.user_id, %role, "Request authenticated");

    req.extensions_mut().insert(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
    });

    next.call(req).await
}
