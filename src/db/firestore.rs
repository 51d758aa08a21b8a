// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (directory of identity provider users)
//! - Check-ins (one document per owner per local day)
//! - Community stats (one aggregate document per day)

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Checkin, CommunityStat, User, UserRole};
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{FirestoreQueryDirection, FirestoreTimestamp};
use std::collections::HashMap;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

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

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user by identity provider user ID.
    pub async fn get_user(&self, external_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(external_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace a user document.
    pub async fn upsert_user(&self, user: &User) -> Result<(), AppError> {
        let _: User = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.external_id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// All users with the given role.
    pub async fn list_users_by_role(&self, role: UserRole) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| q.field("role").eq(role.as_str()))
            .order_by([("name", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Total number of users. Full collection read.
    pub async fn count_users(&self) -> Result<u32, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(users.len() as u32)
    }

    // ─── Check-in Operations ─────────────────────────────────────

    /// Get a check-in by its document ID.
    pub async fn get_checkin(&self, id: &str) -> Result<Option<Checkin>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHECKINS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a check-in, failing with `Conflict` if the document already exists.
    ///
    /// The document ID encodes `(owner, day)`, so this create-only write is
    /// what enforces one check-in per owner per day under concurrency.
    pub async fn insert_checkin(&self, checkin: &Checkin) -> Result<Checkin, AppError> {
        self.get_client()?
            .fluent()
            .insert()
            .into(collections::CHECKINS)
            .document_id(&checkin.id)
            .object(checkin)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => {
                    tracing::info!(
                        owner_id = %checkin.owner_id,
                        day = %checkin.day,
                        "Duplicate check-in rejected by storage"
                    );
                    AppError::Conflict(AppError::ALREADY_CHECKED_IN.to_string())
                }
                other => AppError::Database(other.to_string()),
            })
    }

    /// Most recent check-ins for an owner, newest first.
    pub async fn list_checkins_for_owner(
        &self,
        owner_id: &str,
        limit: u32,
    ) -> Result<Vec<Checkin>, AppError> {
        let owner_id = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHECKINS)
            .filter(move |q| q.field("owner_id").eq(owner_id.clone()))
            .order_by([("created_at", FirestoreQueryDirection::Descending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Every check-in for an owner, newest first. Used for streaks.
    pub async fn list_all_checkins_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<Checkin>, AppError> {
        let owner_id = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHECKINS)
            .filter(move |q| q.field("owner_id").eq(owner_id.clone()))
            .order_by([("created_at", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check-ins for an owner created at or after `since`.
    pub async fn list_checkins_for_owner_since(
        &self,
        owner_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Checkin>, AppError> {
        let owner_id = owner_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHECKINS)
            .filter(move |q| {
                q.for_all([
                    q.field("owner_id").eq(owner_id.clone()),
                    q.field("created_at")
                        .greater_than_or_equal(FirestoreTimestamp(since)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All check-ins bucketed into a given day key.
    pub async fn list_checkins_for_day(&self, day: &str) -> Result<Vec<Checkin>, AppError> {
        let day = day.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHECKINS)
            .filter(move |q| q.field("day").eq(day.clone()))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Newest publicly shared check-ins.
    ///
    /// Firestore can't OR across fields in one query here, so the shared-note
    /// and shared-photo sets are fetched separately and merged.
    pub async fn list_shared_checkins(&self, limit: u32) -> Result<Vec<Checkin>, AppError> {
        let mut merged: HashMap<String, Checkin> = HashMap::new();

        for field in ["shared_note", "shared_photo"] {
            let batch: Vec<Checkin> = self
                .get_client()?
                .fluent()
                .select()
                .from(collections::CHECKINS)
                .filter(move |q| q.field(field).eq(true))
                .order_by([("created_at", FirestoreQueryDirection::Descending)])
                .limit(limit)
                .obj()
                .query()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            for checkin in batch {
                merged.entry(checkin.id.clone()).or_insert(checkin);
            }
        }

        let mut shared: Vec<Checkin> = merged
            .into_values()
            .filter(Checkin::is_publicly_shared)
            .collect();
        shared.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        shared.truncate(limit as usize);
        Ok(shared)
    }

    /// Delete every check-in. Returns the number removed.
    pub async fn delete_all_checkins(&self) -> Result<usize, AppError> {
        let checkins: Vec<Checkin> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::CHECKINS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = checkins.len();
        self.batch_delete(&checkins, collections::CHECKINS, |c: &Checkin| {
            c.id.clone()
        })
        .await?;

        tracing::info!(count, "Deleted all check-ins");
        Ok(count)
    }

    // ─── Community Stats Operations ──────────────────────────────

    /// Get the community aggregate for a day key.
    pub async fn get_community_stat(&self, day: &str) -> Result<Option<CommunityStat>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::COMMUNITY_STATS)
            .obj()
            .one(day)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or replace the community aggregate for its day.
    pub async fn set_community_stat(&self, stat: &CommunityStat) -> Result<(), AppError> {
        let _: CommunityStat = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::COMMUNITY_STATS)
            .document_id(&stat.date)
            .object(stat)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}
