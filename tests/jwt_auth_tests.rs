// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication tests.
//!
//! These tests verify that session JWTs created by the sign-in route can be
//! decoded by the auth middleware, catching compatibility issues early.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use neko_tracker::middleware::auth::{create_jwt, Claims};

#[test]
fn test_jwt_roundtrip() {
    // This test verifies that a JWT created by the sign-in flow can be
    // decoded by the middleware. If either side changes the Claims structure
    // or algorithm, this test will fail.

    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt("google-uid-12345", Some("cat@example.com"), signing_key)
        .expect("Failed to create JWT");

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(&token, &key, &validation)
        .expect("Failed to decode JWT - check Claims struct compatibility");

    assert_eq!(token_data.claims.sub, "google-uid-12345");
    assert_eq!(token_data.claims.email.as_deref(), Some("cat@example.com"));
    assert!(token_data.claims.exp > token_data.claims.iat);
}

#[test]
fn test_jwt_without_email() {
    let signing_key = b"test_signing_key_32_bytes_long!!";

    let token = create_jwt("google-uid-67890", None, signing_key).expect("Failed to create JWT");

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    assert_eq!(token_data.claims.sub, "google-uid-67890");
    assert_eq!(token_data.claims.email, None);
}

#[test]
fn test_jwt_expiration_is_future() {
    use std::time::{SystemTime, UNIX_EPOCH};

    let signing_key = b"test_signing_key_32_bytes_long!!";
    let token = create_jwt("uid", None, signing_key).unwrap();

    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(&token, &key, &validation).unwrap();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    assert!(token_data.claims.exp > now);
    assert!(token_data.claims.iat <= now + 1);
}
