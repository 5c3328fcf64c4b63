// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Neko-Tracker: Track a cat's weight over time
//!
//! This crate provides the backend API for cat weight records, shared
//! editing, public share links, and the Gemini-based health analysis.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{GeminiClient, GoogleIdentityVerifier};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity_verifier: Arc<GoogleIdentityVerifier>,
    pub gemini: GeminiClient,
}
