//! Staff extractor
//!
//! Handlers taking a [`StaffUser`] argument only run for a valid bearer
//! token whose role is one of [`STAFF_ROLES`](super::STAFF_ROLES).

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Authenticated staff member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffUser {
    pub id: String,
    pub role: String,
}

impl FromRequestParts<ServerState> for StaffUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                return Err(AppError::not_authenticated());
            }
        };

        let claims = match state.jwt_service().validate_token(token) {
            Ok(claims) => claims,
            Err(e) => {
                security_log!(
                    "WARN",
                    "auth_failed",
                    error = e.to_string(),
                    uri = format!("{:?}", parts.uri)
                );
                return Err(match e {
                    JwtError::ExpiredToken => AppError::token_expired(),
                    _ => AppError::invalid_token("Invalid token"),
                });
            }
        };

        if !claims.is_staff() {
            security_log!(
                "WARN",
                "role_denied",
                user_id = claims.sub.clone(),
                role = claims.role.clone(),
                uri = format!("{:?}", parts.uri)
            );
            return Err(AppError::new(shared::ErrorCode::RoleRequired)
                .with_detail("required", "staff"));
        }

        let user = StaffUser {
            id: claims.sub,
            role: claims.role,
        };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
