// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public read-only view for share-link holders.
//!
//! Anyone with the token sees the cat's name, breed, target weight, and
//! weight history. Nothing here mutates, and nothing identifies the owner
//! or collaborators.

use crate::error::{AppError, Result};
use crate::models::{weight_summary, WeightSummary};
use crate::routes::weights::WeightResponse;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/share/{token}", get(get_shared_cat))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SharedCatResponse {
    pub name: String,
    pub breed: Option<String>,
    pub target_weight: Option<f64>,
    pub weights: Vec<WeightResponse>,
    pub summary: WeightSummary,
}

/// Resolve a share token to its cat's read-only view.
async fn get_shared_cat(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<SharedCatResponse>> {
    let cat = state
        .db
        .find_cat_by_share_token(&token)
        .await?
        .ok_or_else(|| AppError::NotFound("Share link is invalid or was removed".to_string()))?;

    let weights = state.db.get_weights_for_cat(&cat.id).await?;
    let summary = weight_summary(&weights);

    tracing::debug!(cat_id = %cat.id, "Share link viewed");

    Ok(Json(SharedCatResponse {
        name: cat.name,
        breed: cat.breed,
        target_weight: cat.target_weight,
        weights: weights.iter().map(WeightResponse::from).collect(),
        summary,
    }))
}
