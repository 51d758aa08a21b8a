// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal stats, community stats, and the public feed.

use crate::error::Result;
use crate::models::PhotoCompliance;
use crate::routes::responses::{CommunityStatResponse, FeedEntry};
use crate::services::feed::{self, FEED_LIMIT};
use crate::services::{metrics, users, CallerIdentity};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes for identified callers.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/stats", get(get_stats))
}

/// Routes open to anyone.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/feed", get(get_feed))
        .route("/api/community/stats", get(get_community_stats))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub streak: u32,
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "{ compliant: boolean, photoCount: number }")
    )]
    pub photo_compliance: PhotoCompliance,
}

/// Caller's streak and weekly photo compliance.
async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<StatsResponse>> {
    let user = users::require_user(&state.db, &caller.external_id).await?;
    let now = chrono::Utc::now();

    let (streak, photo_compliance) = tokio::try_join!(
        metrics::calculate_streak(&state.db, &user.external_id, now),
        metrics::check_photo_compliance(&state.db, &user.external_id, now),
    )?;

    Ok(Json(StatsResponse {
        streak,
        photo_compliance,
    }))
}

/// Today's community aggregate, computed on first request of the day.
async fn get_community_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommunityStatResponse>> {
    let stat = metrics::today_stats(&state.db, chrono::Utc::now()).await?;
    Ok(Json(CommunityStatResponse::from(&stat)))
}

/// Newest publicly shared check-ins.
async fn get_feed(State(state): State<Arc<AppState>>) -> Result<Json<Vec<FeedEntry>>> {
    let items = feed::list_public_feed(&state.db, FEED_LIMIT).await?;

    tracing::debug!(entries = items.len(), "Serving public feed");

    Ok(Json(items.into_iter().map(FeedEntry::from).collect()))
}
