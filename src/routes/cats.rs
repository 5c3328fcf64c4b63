// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cat CRUD, sharing, and collaborator routes.
//!
//! Every mutation loads a fresh cat snapshot, evaluates the viewer's
//! capabilities against it, and refuses with 403 when the needed capability
//! is absent.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{weight_summary, Cat, Collaborator, Gender, WeightSummary};
use crate::routes::weights::WeightResponse;
use crate::services::{access, share, CapabilitySet};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_IDENTIFIER_LEN: usize = 200;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cats", get(list_cats).post(create_cat))
        .route(
            "/api/cats/{id}",
            get(get_cat).patch(update_cat).delete(delete_cat),
        )
        .route("/api/cats/{id}/target", put(set_target_weight))
        .route("/api/cats/{id}/share", post(ensure_share_token))
        .route("/api/cats/{id}/collaborators", post(add_collaborator))
        .route(
            "/api/cats/{id}/collaborators/{user_id}",
            delete(remove_collaborator),
        )
}

// ─── Responses ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatResponse {
    pub id: String,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Option<Gender>,
    pub birth_date: Option<String>,
    pub is_neutered: Option<bool>,
    pub target_weight: Option<f64>,
    pub created_at: String,
}

impl From<&Cat> for CatResponse {
    fn from(cat: &Cat) -> Self {
        CatResponse {
            id: cat.id.clone(),
            name: cat.name.clone(),
            breed: cat.breed.clone(),
            gender: cat.gender,
            birth_date: cat.birth_date.clone(),
            is_neutered: cat.is_neutered,
            target_weight: cat.target_weight,
            created_at: cat.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatListItem {
    #[serde(flatten)]
    pub cat: CatResponse,
    pub is_owner: bool,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatListResponse {
    pub cats: Vec<CatListItem>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollaboratorResponse {
    pub user_id: String,
    pub email: String,
    pub added_at: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CatDetailResponse {
    #[serde(flatten)]
    pub cat: CatResponse,
    pub capabilities: CapabilitySet,
    /// Present for the owner only
    pub collaborators: Option<Vec<CollaboratorResponse>>,
    pub weights: Vec<WeightResponse>,
    pub summary: WeightSummary,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ShareTokenResponse {
    pub token: String,
    pub share_url: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteCatResponse {
    pub success: bool,
    pub deleted_weights: u32,
}

fn collaborator_responses(cat: &Cat) -> Vec<CollaboratorResponse> {
    cat.collaborators
        .iter()
        .map(|c| CollaboratorResponse {
            user_id: c.user_id.clone(),
            email: c.email.clone(),
            added_at: c.added_at.clone(),
        })
        .collect()
}

// ─── Shared helpers ──────────────────────────────────────────

/// Load a cat or 404.
pub(crate) async fn load_cat(state: &AppState, cat_id: &str) -> Result<Cat> {
    state
        .db
        .get_cat(cat_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cat {} not found", cat_id)))
}

fn require(allowed: bool, action: &str) -> Result<()> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "You are not allowed to {}",
            action
        )))
    }
}

fn validate_birth_date(value: &str) -> Result<()> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::Validation("birth_date must be YYYY-MM-DD".to_string()))
}

fn validate_target_weight(value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(AppError::Validation(
            "target_weight must be greater than 0".to_string(),
        ))
    }
}

// ─── List / Create ───────────────────────────────────────────

/// List the user's cats: owned first, then collaborations.
async fn list_cats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<CatListResponse>> {
    let owned = state.db.get_cats_for_owner(&user.uid).await?;

    // Collaborations may match on the UID or on the email the owner typed
    let mut collaborating = state.db.get_cats_for_collaborator_key(&user.uid).await?;
    if let Some(email) = &user.email {
        collaborating.extend(state.db.get_cats_for_collaborator_key(email).await?);
    }

    let mut cats: Vec<CatListItem> = Vec::with_capacity(owned.len() + collaborating.len());
    let mut seen: Vec<String> = owned.iter().map(|c| c.id.clone()).collect();

    for cat in &owned {
        cats.push(CatListItem {
            cat: CatResponse::from(cat),
            is_owner: true,
        });
    }

    for cat in &collaborating {
        if seen.contains(&cat.id) {
            continue;
        }
        // The denormalized key index can be stale; trust the record itself
        if !access::evaluate(Some(&user), cat).is_collaborator {
            continue;
        }
        seen.push(cat.id.clone());
        cats.push(CatListItem {
            cat: CatResponse::from(cat),
            is_owner: false,
        });
    }

    Ok(Json(CatListResponse { cats }))
}

#[derive(Deserialize, Validate)]
pub struct CreateCatRequest {
    #[validate(length(min = 1, max = 100))]
    name: String,
    #[validate(length(max = 100))]
    breed: Option<String>,
    gender: Option<Gender>,
    birth_date: Option<String>,
    is_neutered: Option<bool>,
    target_weight: Option<f64>,
}

/// Register a new cat. The session user becomes the owner.
async fn create_cat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<CreateCatRequest>,
) -> Result<Json<CatResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    if let Some(date) = payload.birth_date.as_deref() {
        validate_birth_date(date)?;
    }
    if let Some(target) = payload.target_weight {
        validate_target_weight(target)?;
    }

    let cat = Cat {
        id: FirestoreDb::generate_document_id(),
        name,
        breed: payload
            .breed
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty()),
        gender: payload.gender,
        birth_date: payload.birth_date,
        is_neutered: payload.is_neutered,
        owner_id: user.uid.clone(),
        target_weight: payload.target_weight,
        share_token: None,
        collaborators: vec![],
        collaborator_keys: vec![],
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };

    state.db.set_cat(&cat).await?;

    tracing::info!(cat_id = %cat.id, uid = %user.uid, "Cat registered");

    Ok(Json(CatResponse::from(&cat)))
}

// ─── Detail / Update / Delete ────────────────────────────────

/// Get a cat with its weights and the viewer's capabilities.
async fn get_cat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
) -> Result<Json<CatDetailResponse>> {
    let cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);

    // Only people on the record may view it; everyone else goes through
    // the public share link.
    require(caps.is_owner || caps.is_collaborator, "view this cat")?;

    let weights = state.db.get_weights_for_cat(&cat.id).await?;
    let summary = weight_summary(&weights);

    Ok(Json(CatDetailResponse {
        cat: CatResponse::from(&cat),
        capabilities: caps,
        collaborators: caps.is_owner.then(|| collaborator_responses(&cat)),
        weights: weights.iter().map(WeightResponse::from).collect(),
        summary,
    }))
}

#[derive(Deserialize, Validate)]
pub struct UpdateCatRequest {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    #[validate(length(max = 100))]
    breed: Option<String>,
    gender: Option<Gender>,
    birth_date: Option<String>,
    is_neutered: Option<bool>,
}

/// Update profile fields. Owner only; owner_id, share token and the
/// collaborator list are not touchable here.
async fn update_cat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
    Json(payload): Json<UpdateCatRequest>,
) -> Result<Json<CatResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    if let Some(date) = payload.birth_date.as_deref() {
        if !date.is_empty() {
            validate_birth_date(date)?;
        }
    }

    let mut cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    require(caps.can_edit_cat_profile, "edit this cat's profile")?;

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        cat.name = name;
    }
    if let Some(breed) = payload.breed {
        // Empty string clears the field
        cat.breed = Some(breed.trim().to_string()).filter(|b| !b.is_empty());
    }
    if let Some(gender) = payload.gender {
        cat.gender = Some(gender);
    }
    if let Some(date) = payload.birth_date {
        cat.birth_date = Some(date).filter(|d| !d.is_empty());
    }
    if let Some(neutered) = payload.is_neutered {
        cat.is_neutered = Some(neutered);
    }

    state.db.set_cat(&cat).await?;

    Ok(Json(CatResponse::from(&cat)))
}

/// Delete a cat and all of its weight records.
async fn delete_cat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
) -> Result<Json<DeleteCatResponse>> {
    let cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    require(caps.can_delete_cat, "delete this cat")?;

    let deleted_weights = state.db.delete_cat_cascade(&cat.id).await?;

    Ok(Json(DeleteCatResponse {
        success: true,
        deleted_weights: deleted_weights as u32,
    }))
}

// ─── Target Weight ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetTargetRequest {
    /// None clears the target
    target_weight: Option<f64>,
}

/// Set or clear the target weight.
async fn set_target_weight(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
    Json(payload): Json<SetTargetRequest>,
) -> Result<Json<CatResponse>> {
    if let Some(target) = payload.target_weight {
        validate_target_weight(target)?;
    }

    let mut cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    require(caps.can_edit_cat_profile, "set this cat's target weight")?;

    cat.target_weight = payload.target_weight;
    state.db.set_cat(&cat).await?;

    Ok(Json(CatResponse::from(&cat)))
}

// ─── Sharing ─────────────────────────────────────────────────

/// Get or lazily create the cat's share token.
///
/// Idempotent: a second call returns the same token without writing.
async fn ensure_share_token(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
) -> Result<Json<ShareTokenResponse>> {
    let mut cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    require(caps.can_manage_sharing, "share this cat")?;

    let (token, newly_issued) = share::ensure_share_token(&mut cat);
    if newly_issued {
        state.db.set_cat(&cat).await?;
        tracing::info!(cat_id = %cat.id, "Share token issued");
    }

    Ok(Json(ShareTokenResponse {
        share_url: share::share_url(&state.config.frontend_url, &token),
        token,
    }))
}

// ─── Collaborators ───────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct AddCollaboratorRequest {
    /// User ID or email address; stored as typed, no account lookup
    #[validate(length(min = 1, max = 200))]
    identifier: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CollaboratorsResponse {
    pub collaborators: Vec<CollaboratorResponse>,
}

/// Invite a collaborator by user ID or email.
async fn add_collaborator(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cat_id): Path<String>,
    Json(payload): Json<AddCollaboratorRequest>,
) -> Result<Json<CollaboratorsResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let identifier = payload.identifier.trim().to_string();
    if identifier.is_empty() || identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(AppError::Validation(
            "identifier must be a non-empty user ID or email".to_string(),
        ));
    }

    let mut cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    require(caps.can_manage_collaborators, "manage collaborators")?;

    // The identifier fills both fields until the invitee signs in
    cat.collaborators.push(Collaborator {
        user_id: identifier.clone(),
        email: identifier,
        added_at: format_utc_rfc3339(chrono::Utc::now()),
    });
    cat.rebuild_collaborator_keys();

    state.db.set_cat(&cat).await?;

    tracing::info!(cat_id = %cat.id, "Collaborator added");

    Ok(Json(CollaboratorsResponse {
        collaborators: collaborator_responses(&cat),
    }))
}

/// Remove a collaborator by exact user ID.
async fn remove_collaborator(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path((cat_id, collaborator_id)): Path<(String, String)>,
) -> Result<Json<CollaboratorsResponse>> {
    let mut cat = load_cat(&state, &cat_id).await?;
    let caps = access::evaluate(Some(&user), &cat);
    require(caps.can_manage_collaborators, "manage collaborators")?;

    let before = cat.collaborators.len();
    cat.collaborators.retain(|c| c.user_id != collaborator_id);

    if cat.collaborators.len() == before {
        return Err(AppError::NotFound(format!(
            "Collaborator {} not found",
            collaborator_id
        )));
    }
    cat.rebuild_collaborator_keys();

    state.db.set_cat(&cat).await?;

    tracing::info!(cat_id = %cat.id, "Collaborator removed");

    Ok(Json(CollaboratorsResponse {
        collaborators: collaborator_responses(&cat),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn birth_date_validation() {
        assert!(validate_birth_date("2020-05-01").is_ok());
        assert!(validate_birth_date("2020-13-01").is_err());
        assert!(validate_birth_date("not-a-date").is_err());
        assert!(validate_birth_date("2020/05/01").is_err());
    }

    #[test]
    fn target_weight_validation() {
        assert!(validate_target_weight(4.5).is_ok());
        assert!(validate_target_weight(0.0).is_err());
        assert!(validate_target_weight(-1.0).is_err());
        assert!(validate_target_weight(f64::NAN).is_err());
        assert!(validate_target_weight(f64::INFINITY).is_err());
    }
}
