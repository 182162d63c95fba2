use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::state::AppState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_FINANCE_MANAGER: &str = "finance-manager";

/// Identity resolved from a validated bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub role: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            ))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err((
                    StatusCode::UNAUTHORIZED,
                    "Invalid or expired token".to_string(),
                ));
            }
        };

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

fn check_role(auth: &AuthUser, allowed: &[&str]) -> Result<(), (StatusCode, String)> {
    if allowed.contains(&auth.role.as_str()) {
        Ok(())
    } else {
        warn!(user_id = %auth.id, role = %auth.role, "insufficient role");
        Err((StatusCode::FORBIDDEN, "Insufficient role".to_string()))
    }
}

/// Guard: authenticated user with the admin role.
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        check_role(&auth, &[ROLE_ADMIN])?;
        Ok(AdminUser(auth))
    }
}

/// Guard: authenticated user with the admin or finance-manager role.
pub struct FinanceOrAdmin(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for FinanceOrAdmin {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        check_role(&auth, &[ROLE_ADMIN, ROLE_FINANCE_MANAGER])?;
        Ok(FinanceOrAdmin(auth))
    }
}
