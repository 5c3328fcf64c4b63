// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Share token issuance.
//!
//! Tokens are two independent base-36 fragments of 13 characters each,
//! concatenated. Once issued a token is stable for the life of the cat
//! record; there is no expiry, rotation, or revocation.

use crate::models::Cat;
use rand::Rng;

const FRAGMENT_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Ensure a cat has a share token, generating one if needed.
///
/// Idempotent: returns the existing token untouched when one is already
/// set. The second tuple element reports whether the record was modified
/// and needs to be persisted by the caller, so repeated calls perform at
/// most one write.
pub fn ensure_share_token(cat: &mut Cat) -> (String, bool) {
    if let Some(token) = &cat.share_token {
        return (token.clone(), false);
    }

    let token = generate_share_token();
    cat.share_token = Some(token.clone());
    (token, true)
}

/// Generate a new 26-character base-36 share token.
pub fn generate_share_token() -> String {
    let mut rng = rand::thread_rng();
    (0..FRAGMENT_LEN * 2)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// Build the public share URL for a token.
pub fn share_url(frontend_url: &str, token: &str) -> String {
    format!("{}/share/{}", frontend_url.trim_end_matches('/'), token)
}
