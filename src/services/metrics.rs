// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived metrics over the check-in ledger.
//!
//! Fetches the needed check-ins and delegates the arithmetic to
//! `models::stats`. Community stats are a full recompute on every trigger.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::stats::{photo_compliance, photo_window_start, streak_length};
use crate::models::{CommunityStat, PhotoCompliance};
use crate::time_utils::{day_key, local_day};
use chrono::{DateTime, Utc};

/// Consecutive WORKOUT/REST days ending today.
pub async fn calculate_streak(db: &FirestoreDb, owner_id: &str, now: DateTime<Utc>) -> Result<u32> {
    let checkins = db.list_all_checkins_for_owner(owner_id).await?;
    Ok(streak_length(&checkins, local_day(now)))
}

/// Photographed workouts in the trailing seven days.
pub async fn check_photo_compliance(
    db: &FirestoreDb,
    owner_id: &str,
    now: DateTime<Utc>,
) -> Result<PhotoCompliance> {
    let recent = db
        .list_checkins_for_owner_since(owner_id, photo_window_start(now))
        .await?;
    Ok(photo_compliance(&recent, now))
}

/// Today's stored community aggregate, if it has been computed.
pub async fn get_today_stats(db: &FirestoreDb, now: DateTime<Utc>) -> Result<Option<CommunityStat>> {
    db.get_community_stat(&day_key(local_day(now))).await
}

/// Recompute today's aggregate from scratch and store it.
pub async fn recompute_today_stats(db: &FirestoreDb, now: DateTime<Utc>) -> Result<CommunityStat> {
    let today = local_day(now);
    let total_members = db.count_users().await?;
    let day_checkins = db.list_checkins_for_day(&day_key(today)).await?;

    let stat = CommunityStat::compute(today, total_members, &day_checkins, now);
    db.set_community_stat(&stat).await?;

    tracing::debug!(
        date = %stat.date,
        total_members = stat.total_members,
        active_today = stat.active_today,
        "Community stats recomputed"
    );

    Ok(stat)
}

/// Today's aggregate, computing it on the first request of the day.
pub async fn today_stats(db: &FirestoreDb, now: DateTime<Utc>) -> Result<CommunityStat> {
    match get_today_stats(db, now).await? {
        Some(stat) => Ok(stat),
        None => recompute_today_stats(db, now).await,
    }
}
