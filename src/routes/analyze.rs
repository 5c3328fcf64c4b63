// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI weight analysis endpoint.
//!
//! Relays the cat's profile and weight history to Gemini and returns the
//! model text unmodified. Response bodies keep the original Japanese error
//! messages the frontend displays verbatim. Every call is a fresh billable
//! request; there is no retry and no caching of previous analyses.

use crate::services::gemini::{build_analysis_prompt, AnalysisCatProfile, AnalysisWeight};
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/analyze-weight", post(analyze_weight))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    weights: Vec<AnalysisWeight>,
    cat_data: AnalysisCatProfile,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AnalyzeResponse {
    pub analysis: String,
}

#[derive(Serialize)]
struct AnalyzeError {
    error: String,
}

fn analyze_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(AnalyzeError {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Generate a health analysis for a cat's weight history.
async fn analyze_weight(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Response {
    if payload.weights.is_empty() {
        return analyze_error(StatusCode::BAD_REQUEST, "体重データがありません");
    }

    if !state.gemini.has_api_key() {
        return analyze_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "APIキーが設定されていません",
        );
    }

    let prompt = build_analysis_prompt(&payload.cat_data, &payload.weights);

    tracing::debug!(
        cat = %payload.cat_data.name,
        weight_count = payload.weights.len(),
        "Requesting weight analysis"
    );

    match state.gemini.generate_content(&prompt).await {
        Ok(analysis) => (StatusCode::OK, Json(AnalyzeResponse { analysis })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Weight analysis failed");
            analyze_error(StatusCode::INTERNAL_SERVER_ERROR, "分析に失敗しました")
        }
    }
}
