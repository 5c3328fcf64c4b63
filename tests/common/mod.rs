// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use neko_tracker::config::Config;
use neko_tracker::db::FirestoreDb;
use neko_tracker::middleware::auth::Claims;
use neko_tracker::routes::create_router;
use neko_tracker::services::{GeminiClient, GoogleIdentityVerifier};
use neko_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

/// Create a test app without a Gemini API key configured.
#[allow(dead_code)]
pub fn create_test_app_without_gemini_key() -> (axum::Router, Arc<AppState>) {
    let config = Config {
        gemini_api_key: None,
        ..Config::test_default()
    };
    create_test_app_with_config(config)
}

#[allow(dead_code)]
fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = test_db_offline();
    let identity_verifier =
        Arc::new(GoogleIdentityVerifier::new(&config).expect("Failed to build verifier"));
    let gemini = GeminiClient::new(config.gemini_api_key.clone());

    let state = Arc::new(AppState {
        config,
        db,
        identity_verifier,
        gemini,
    });

    (create_router(state.clone()), state)
}

/// Create a session JWT the way the sign-in route does.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, email: Option<&str>, signing_key: &[u8]) -> String {
    neko_tracker::middleware::auth::create_jwt(uid, email, signing_key)
        .expect("Failed to create JWT")
}

/// Create a session JWT with an explicit issue time, for freshness tests.
#[allow(dead_code)]
pub fn create_test_jwt_issued_at(
    uid: &str,
    email: Option<&str>,
    signing_key: &[u8],
    iat: usize,
) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    let claims = Claims {
        sub: uid.to_string(),
        email: email.map(|e| e.to_string()),
        iat,
        exp: iat + 30 * 24 * 60 * 60,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .expect("Failed to create JWT")
}

/// Current Unix time in seconds.
#[allow(dead_code)]
pub fn now_unix_secs() -> usize {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}
