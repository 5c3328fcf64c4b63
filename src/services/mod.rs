// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod access;
pub mod gemini;
pub mod google_identity;
pub mod share;

pub use access::CapabilitySet;
pub use gemini::GeminiClient;
pub use google_identity::{GoogleIdentityVerifier, IdentityError, VerifiedGoogleUser};
