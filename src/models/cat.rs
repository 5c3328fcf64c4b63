// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Cat profile model for storage and API.

use serde::{Deserialize, Serialize};

/// Cat gender. Absent on the record means "not registered".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A user granted weight-record edit rights by the owner.
///
/// The owner supplies a single identifier (user ID or email) which fills
/// both fields; no account lookup is performed. Matching is exact-string on
/// either field, so identifiers differing in case or whitespace are distinct
/// entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// Identifier the owner supplied (auth UID or email)
    pub user_id: String,
    /// Email as supplied (mirrors `user_id` for unresolved invites)
    pub email: String,
    /// When the entry was added (RFC3339)
    pub added_at: String,
}

/// Cat record stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cat {
    /// Document ID (generated at creation)
    pub id: String,
    /// Display name (required, non-empty)
    pub name: String,
    /// Breed, if registered
    pub breed: Option<String>,
    /// Gender, if registered
    pub gender: Option<Gender>,
    /// Birth date as `YYYY-MM-DD`, if registered
    pub birth_date: Option<String>,
    /// Neutered/spayed: yes, no, or not registered
    pub is_neutered: Option<bool>,
    /// Auth UID of the creating user. Immutable.
    pub owner_id: String,
    /// Target weight in kilograms, owner-settable
    pub target_weight: Option<f64>,
    /// Opaque public-share token. Generated lazily, stable once set.
    pub share_token: Option<String>,
    /// Users with weight-record edit rights
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    /// Denormalized collaborator identifiers (user_id and email of every
    /// entry) so membership is queryable with array-contains. Must be
    /// rebuilt whenever `collaborators` changes.
    #[serde(default)]
    pub collaborator_keys: Vec<String>,
    /// When the cat was registered (RFC3339)
    pub created_at: String,
}

impl Cat {
    /// Rebuild `collaborator_keys` from the collaborator list.
    pub fn rebuild_collaborator_keys(&mut self) {
        let mut keys: Vec<String> = Vec::with_capacity(self.collaborators.len() * 2);
        for c in &self.collaborators {
            if !keys.contains(&c.user_id) {
                keys.push(c.user_id.clone());
            }
            if !keys.contains(&c.email) {
                keys.push(c.email.clone());
            }
        }
        self.collaborator_keys = keys;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat_with_collaborators(entries: &[(&str, &str)]) -> Cat {
        let mut cat = Cat {
            id: "cat-1".to_string(),
            name: "Tama".to_string(),
            breed: None,
            gender: None,
            birth_date: None,
            is_neutered: None,
            owner_id: "owner-uid".to_string(),
            target_weight: None,
            share_token: None,
            collaborators: entries
                .iter()
                .map(|(user_id, email)| Collaborator {
                    user_id: user_id.to_string(),
                    email: email.to_string(),
                    added_at: "2025-01-01T00:00:00Z".to_string(),
                })
                .collect(),
            collaborator_keys: vec![],
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        cat.rebuild_collaborator_keys();
        cat
    }

    #[test]
    fn collaborator_keys_cover_both_fields() {
        let cat = cat_with_collaborators(&[("uid-1", "a@example.com")]);
        assert_eq!(cat.collaborator_keys, vec!["uid-1", "a@example.com"]);
    }

    #[test]
    fn collaborator_keys_skip_duplicates() {
        // Unresolved invites mirror the identifier into both fields
        let cat = cat_with_collaborators(&[("b@example.com", "b@example.com")]);
        assert_eq!(cat.collaborator_keys, vec!["b@example.com"]);
    }

    #[test]
    fn gender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Gender::Male).unwrap(), "\"male\"");
        assert_eq!(
            serde_json::from_str::<Gender>("\"female\"").unwrap(),
            Gender::Female
        );
    }
}
