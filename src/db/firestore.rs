// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage)
//! - Cats (profile, share token, collaborator list)
//! - Weights (weight records, cascade-deleted with their cat)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Cat, User, WeightRecord};
use futures_util::{stream, StreamExt};
use rand::distributions::Alphanumeric;
use rand::Rng;

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Length of generated document IDs, matching Firestore's auto-IDs.
const DOCUMENT_ID_LEN: usize = 20;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Generate a document ID in the same alphabet/length as Firestore auto-IDs.
    pub fn generate_document_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DOCUMENT_ID_LEN)
            .map(char::from)
            .collect()
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by their auth UID.
    pub async fn get_user(&self, uid: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or update a user.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.uid)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Cat Operations ──────────────────────────────────────────

    /// Get a cat by document ID.
    pub async fn get_cat(&self, cat_id: &str) -> Result<Option<Cat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CATS)
            .obj()
            .one(cat_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or fully update a cat record.
    pub async fn set_cat(&self, cat: &Cat) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::CATS)
            .document_id(&cat.id)
            .object(cat)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get all cats owned by a user, newest first.
    pub async fn get_cats_for_owner(&self, uid: &str) -> Result<Vec<Cat>, AppError> {
        let uid = uid.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CATS)
            .filter(move |q| q.field("owner_id").eq(uid.clone()))
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get cats where the given identifier (UID or email) appears in the
    /// denormalized collaborator key list.
    pub async fn get_cats_for_collaborator_key(&self, key: &str) -> Result<Vec<Cat>, AppError> {
        let key = key.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CATS)
            .filter(move |q| q.field("collaborator_keys").array_contains(key.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a cat by its share token. Returns None for unknown tokens.
    pub async fn find_cat_by_share_token(&self, token: &str) -> Result<Option<Cat>, AppError> {
        let token = token.to_string();
        let cats: Vec<Cat> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CATS)
            .filter(move |q| q.field("share_token").eq(token.clone()))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(cats.into_iter().next())
    }

    // ─── Weight Operations ───────────────────────────────────────

    /// Get a weight record by document ID.
    pub async fn get_weight(&self, weight_id: &str) -> Result<Option<WeightRecord>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::WEIGHTS)
            .obj()
            .one(weight_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all weight records for a cat, newest first.
    ///
    /// RFC3339 UTC strings sort lexicographically in date order, so the
    /// datastore ordering matches chronology.
    pub async fn get_weights_for_cat(&self, cat_id: &str) -> Result<Vec<WeightRecord>, AppError> {
        let cat_id = cat_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::WEIGHTS)
            .filter(move |q| q.field("cat_id").eq(cat_id.clone()))
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store a weight record.
    pub async fn set_weight(&self, weight: &WeightRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::WEIGHTS)
            .document_id(&weight.id)
            .object(weight)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a single weight record.
    pub async fn delete_weight(&self, weight_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::WEIGHTS)
            .document_id(weight_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Cascade Deletion ────────────────────────────────────────

    /// Delete a cat together with all of its weight records.
    ///
    /// Deletes run in transaction batches of at most BATCH_SIZE operations.
    /// The cat document is deleted in the same transaction as the final
    /// batch of weights, so a mid-cascade failure leaves the cat in place
    /// rather than orphaning weight records.
    ///
    /// Returns the number of weight records deleted.
    pub async fn delete_cat_cascade(&self, cat_id: &str) -> Result<usize, AppError> {
        let client = self.get_client()?;

        let weights = self.get_weights_for_cat(cat_id).await?;
        let weight_count = weights.len();

        let mut chunks: Vec<&[WeightRecord]> = weights.chunks(BATCH_SIZE).collect();
        if chunks.is_empty() {
            chunks.push(&[]);
        }
        let last_index = chunks.len() - 1;

        for (index, chunk) in chunks.into_iter().enumerate() {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for weight in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collections::WEIGHTS)
                    .document_id(&weight.id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add weight deletion to transaction: {}",
                            e
                        ))
                    })?;
            }

            if index == last_index {
                client
                    .fluent()
                    .delete()
                    .from(collections::CATS)
                    .document_id(cat_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add cat deletion to transaction: {}",
                            e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit cascade deletion: {}", e))
            })?;
        }

        tracing::info!(cat_id, weight_count, "Cat deleted with weight records");

        Ok(weight_count)
    }

    // ─── User Data Deletion ──────────────────────────────────────

    /// Delete ALL data for a user: every owned cat (with its weights,
    /// cascading atomically per cat) and the user profile itself.
    ///
    /// Per-cat cascades run concurrently with a bounded buffer.
    ///
    /// Returns the number of documents deleted.
    pub async fn delete_user_data(&self, uid: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        let owned_cats = self.get_cats_for_owner(uid).await?;
        let cat_count = owned_cats.len();

        let weight_counts: Vec<Result<usize, AppError>> = stream::iter(owned_cats)
            .map(|cat| async move { self.delete_cat_cascade(&cat.id).await })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect()
            .await;

        for count in weight_counts {
            // A cat deleted plus its weight records
            deleted_count += count? + 1;
        }
        tracing::debug!(uid, cat_count, "Deleted owned cats");

        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(uid)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        deleted_count += 1;
        tracing::debug!(uid, "Deleted user profile");

        tracing::info!(uid, deleted_count, "User data deletion complete");

        Ok(deleted_count)
    }
}
