// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-record capability evaluation.
//!
//! Capabilities are never persisted. Every handler recomputes them from the
//! session context and a fresh cat snapshot, and refuses the mutation when
//! the needed capability is absent. The UI hiding a button is not the
//! checkpoint; this is.

use crate::middleware::auth::AuthUser;
use crate::models::Cat;
use serde::Serialize;

/// What the current viewer may do with a given cat record.
#[derive(Debug, Clone, Copy, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CapabilitySet {
    pub is_owner: bool,
    pub is_collaborator: bool,
    pub can_edit_weights: bool,
    pub can_edit_cat_profile: bool,
    pub can_manage_sharing: bool,
    pub can_manage_collaborators: bool,
    pub can_delete_cat: bool,
}

impl CapabilitySet {
    /// No capabilities at all (anonymous viewer without a share token).
    pub const NONE: CapabilitySet = CapabilitySet {
        is_owner: false,
        is_collaborator: false,
        can_edit_weights: false,
        can_edit_cat_profile: false,
        can_manage_sharing: false,
        can_manage_collaborators: false,
        can_delete_cat: false,
    };
}

/// Compute the capability set for a viewer against a cat snapshot.
///
/// Collaborator matching is exact-string on either the user_id or email
/// field of each entry; identifiers differing in case or whitespace do not
/// match.
pub fn evaluate(viewer: Option<&AuthUser>, cat: &Cat) -> CapabilitySet {
    let Some(viewer) = viewer else {
        return CapabilitySet::NONE;
    };

    let is_owner = viewer.uid == cat.owner_id;
    let is_collaborator = cat.collaborators.iter().any(|c| {
        let matches = |identity: &str| c.user_id == identity || c.email == identity;
        matches(&viewer.uid) || viewer.email.as_deref().is_some_and(matches)
    });

    CapabilitySet {
        is_owner,
        is_collaborator,
        can_edit_weights: is_owner || is_collaborator,
        can_edit_cat_profile: is_owner,
        can_manage_sharing: is_owner,
        can_manage_collaborators: is_owner,
        can_delete_cat: is_owner,
    }
}

/// Whether a presented share token grants the public read-only view.
///
/// A cat with no token issued is never publicly readable.
pub fn share_token_matches(cat: &Cat, presented: &str) -> bool {
    cat.share_token
        .as_deref()
        .is_some_and(|token| token == presented)
}
