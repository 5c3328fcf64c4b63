// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in routes.
//!
//! The frontend obtains a Google ID token client-side and posts it here; we
//! verify it against Google's JWKS, upsert the user profile, and mint our
//! own session JWT, returned both as an HttpOnly cookie and in the body.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::User;
use crate::services::IdentityError;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", post(sign_in))
        .route("/auth/logout", post(logout))
}

/// Sign-in request carrying a Google ID token.
#[derive(Deserialize)]
pub struct SignInRequest {
    id_token: String,
}

/// Sign-in response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SignInResponse {
    pub token: String,
    pub uid: String,
    pub email: Option<String>,
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// Verify a Google ID token and establish a session.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>)> {
    let verified = state
        .identity_verifier
        .verify_id_token(&payload.id_token)
        .await
        .map_err(map_identity_error)?;

    let now = format_utc_rfc3339(chrono::Utc::now());

    // Upsert the profile, preserving the original created_at
    let created_at = match state.db.get_user(&verified.uid).await? {
        Some(existing) => existing.created_at,
        None => now.clone(),
    };

    let user = User {
        uid: verified.uid.clone(),
        email: verified.email.clone(),
        display_name: verified.display_name.clone(),
        photo_url: verified.photo_url.clone(),
        created_at,
        last_active: now,
    };
    state.db.upsert_user(&user).await?;

    let token = create_jwt(
        &verified.uid,
        verified.email.as_deref(),
        &state.config.jwt_signing_key,
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(uid = %verified.uid, "User signed in");

    let cookie = session_cookie(token.clone(), SESSION_TTL_SECS as i64);

    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            token,
            uid: user.uid,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
        }),
    ))
}

/// Clear the session cookie.
async fn logout(jar: CookieJar) -> (CookieJar, Json<serde_json::Value>) {
    let cookie = session_cookie(String::new(), 0);
    (
        jar.add(cookie),
        Json(serde_json::json!({ "success": true })),
    )
}

fn session_cookie(value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// Map sign-in failures to distinct user-facing messages.
fn map_identity_error(err: IdentityError) -> AppError {
    match err {
        IdentityError::Rejected(reason) => {
            tracing::warn!(reason = %reason, "Google sign-in rejected");
            let message = if reason.contains("InvalidAudience") || reason.contains("aud") {
                "Sign-in token was issued for a different application"
            } else if reason.contains("ExpiredSignature") {
                "Sign-in token has expired; please try again"
            } else if reason.contains("email is not verified") {
                "Your Google account email is not verified"
            } else {
                "Sign-in token could not be verified"
            };
            AppError::BadRequest(message.to_string())
        }
        IdentityError::Transient(reason) => {
            AppError::Internal(anyhow::anyhow!("identity verification failed: {reason}"))
        }
    }
}
