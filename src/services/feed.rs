// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public feed projection.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::Checkin;
use futures_util::{stream, StreamExt};
use std::collections::{BTreeSet, HashMap};

/// Entries returned by `GET /feed`.
pub const FEED_LIMIT: u32 = 50;

const MAX_CONCURRENT_DB_OPS: usize = 10;

/// A shared check-in joined with its owner's display name.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub checkin: Checkin,
    /// `None` if the owner record no longer exists
    pub owner_name: Option<String>,
}

/// Newest shared check-ins with owner names attached.
pub async fn list_public_feed(db: &FirestoreDb, limit: u32) -> Result<Vec<FeedItem>> {
    let checkins = db.list_shared_checkins(limit).await?;

    let owner_ids: BTreeSet<String> = checkins.iter().map(|c| c.owner_id.clone()).collect();
    let names: HashMap<String, String> = stream::iter(owner_ids)
        .map(|owner_id| async move {
            let user = db.get_user(&owner_id).await?;
            Ok::<_, AppError>(user.map(|u| (owner_id, u.name)))
        })
        .buffer_unordered(MAX_CONCURRENT_DB_OPS)
        .collect::<Vec<Result<Option<(String, String)>>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    Ok(checkins
        .into_iter()
        .map(|checkin| FeedItem {
            owner_name: names.get(&checkin.owner_id).cloned(),
            checkin,
        })
        .collect())
}
