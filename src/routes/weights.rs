// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Weight record routes.
//!
//! Records are append/delete only; a correction is a delete followed by a
//! new record.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::WeightRecord;
use crate::routes::cats::load_cat;
use crate::services::access;
use crate::time_utils::{format_utc_rfc3339, noon_utc};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_NOTE_LEN: usize = 500;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/cats/{id}/weights",
            get(list_weights).post(add_weight),
        )
        .route(
            "/api/cats/{id}/weights/{weight_id}",
            delete(delete_weight),
        )
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeightResponse {
    pub id: String,
    pub weight: f64,
    pub date: String,
    pub note: Option<String>,
    pub created_at: String,
}

impl From<&WeightRecord> for WeightResponse {
    fn from(record: &WeightRecord) -> Self {
        WeightResponse {
            id: record.id.clone(),
            weight: record.weight,
            date: record.date.clone(),
            note: record.note.clone(),
            created_at: record.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeightListResponse {
    pub weights: Vec<WeightResponse>,
}

// ─── Handlers ────────────────────────────────────────────────

/// List a cat's weight records, newest first.
async fn list_weights(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
) -> Result<Json<WeightListResponse>> {
    let cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    if !caps.is_owner && !caps.is_collaborator {
        return Err(AppError::Forbidden(
            "You are not allowed to view this cat's records".to_string(),
        ));
    }

    let weights = state.db.get_weights_for_cat(&cat.id).await?;

    Ok(Json(WeightListResponse {
        weights: weights.iter().map(WeightResponse::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct AddWeightRequest {
    /// Weight in kilograms, must be > 0
    weight: f64,
    /// Measurement date as `YYYY-MM-DD`
    date: String,
    note: Option<String>,
}

/// Record a weight measurement.
///
/// Input is validated before any datastore access; the stored value is the
/// input value, untouched.
async fn add_weight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
    Json(payload): Json<AddWeightRequest>,
) -> Result<Json<WeightResponse>> {
    if payload.weight <= 0.0 || !payload.weight.is_finite() {
        return Err(AppError::Validation(
            "weight must be greater than 0".to_string(),
        ));
    }

    let date = chrono::NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("date must be YYYY-MM-DD".to_string()))?;

    let note = payload
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    if note.as_ref().is_some_and(|n| n.chars().count() > MAX_NOTE_LEN) {
        return Err(AppError::Validation(format!(
            "note must be at most {} characters",
            MAX_NOTE_LEN
        )));
    }

    let cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    if !caps.can_edit_weights {
        return Err(AppError::Forbidden(
            "You are not allowed to record weights for this cat".to_string(),
        ));
    }

    let record = WeightRecord {
        id: FirestoreDb::generate_document_id(),
        cat_id: cat.id.clone(),
        weight: payload.weight,
        date: format_utc_rfc3339(noon_utc(date)),
        note,
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.set_weight(&record).await?;

    tracing::info!(
        cat_id = %cat.id,
        weight_id = %record.id,
        weight = record.weight,
        "Weight recorded"
    );

    Ok(Json(WeightResponse::from(&record)))
}

/// Delete a weight record.
///
/// Two collaborators racing to delete the same record: the first succeeds,
/// the second sees 404.
async fn delete_weight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((cat_id, weight_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>> {
    let cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    if !caps.can_edit_weights {
        return Err(AppError::Forbidden(
            "You are not allowed to delete weights for this cat".to_string(),
        ));
    }

    let record = state
        .db
        .get_weight(&weight_id)
        .await?
        .filter(|r| r.cat_id == cat.id)
        .ok_or_else(|| AppError::NotFound(format!("Weight record {} not found", weight_id)))?;

    state.db.delete_weight(&record.id).await?;

    tracing::info!(cat_id = %cat.id, weight_id = %record.id, "Weight record deleted");

    Ok(Json(serde_json::json!({ "success": true })))
}
