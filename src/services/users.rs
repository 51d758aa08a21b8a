// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User directory.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{User, UserRole};
use chrono::Utc;

/// Look up a user by identity provider ID.
pub async fn resolve_user(db: &FirestoreDb, external_id: &str) -> Result<Option<User>> {
    db.get_user(external_id).await
}

/// Look up a user, failing with `NotFound` if they haven't been initialized.
pub async fn require_user(db: &FirestoreDb, external_id: &str) -> Result<User> {
    resolve_user(db, external_id).await?.ok_or_else(|| {
        AppError::NotFound("User not found. Please initialize user first.".to_string())
    })
}

/// Fetch-or-create a user, resyncing the display name.
///
/// An existing user's role is never changed here; `role` only applies on creation.
pub async fn get_or_create_user(
    db: &FirestoreDb,
    external_id: &str,
    display_name: &str,
    role: UserRole,
) -> Result<User> {
    let now = Utc::now();

    let user = match db.get_user(external_id).await? {
        Some(mut existing) => {
            if existing.name == display_name {
                return Ok(existing);
            }
            existing.name = display_name.to_string();
            existing.updated_at = now;
            existing
        }
        None => {
            tracing::info!(external_id, role = %role, "Creating user");
            User::new(external_id, display_name, role, now)
        }
    };

    db.upsert_user(&user).await?;
    Ok(user)
}

/// Change a user's role. Administrative.
pub async fn set_role(db: &FirestoreDb, external_id: &str, role: UserRole) -> Result<User> {
    let mut user = require_user(db, external_id).await?;
    user.role = role;
    user.updated_at = Utc::now();
    db.upsert_user(&user).await?;

    tracing::info!(external_id, role = %role, "User role updated");
    Ok(user)
}
