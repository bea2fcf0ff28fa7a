use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

const ROLE_ADMIN: &str = "ADMIN";

/// Claims carried by the back-office token issued at `/v1/admin/login`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Gate for every `/v1/admin` route except the login itself. Valid claims
/// land in the request extensions for handlers that want them.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::AuthenticationError("Missing bearer token".to_string()))?;

    let key = DecodingKey::from_secret(state.auth.secret.as_bytes());
    let decoded = decode::<AdminClaims>(token, &key, &Validation::default())
        .map_err(|_| AppError::AuthenticationError("Invalid token".to_string()))?;

    if decoded.claims.role != ROLE_ADMIN {
        return Err(AppError::AuthorizationError(
            "Admin role required".to_string(),
        ));
    }

    req.extensions_mut().insert(decoded.claims);
    Ok(next.run(req).await)
}
