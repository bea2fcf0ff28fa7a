use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, middleware::auth::AdminClaims, state::AppState};

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/login", post(login_admin))
}

async fn login_admin(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let password_ok = bcrypt::verify(&req.password, &state.auth.admin_password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password check failed: {}", e)))?;

    if req.email != state.auth.admin_email || !password_ok {
        return Err(AppError::AuthenticationError(
            "Invalid credentials".to_string(),
        ));
    }

    let my_claims = AdminClaims {
        sub: "admin".to_string(),
        email: req.email,
        role: "ADMIN".to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(AuthResponse { token }))
}
