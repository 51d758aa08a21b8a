// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach-only routes.
//!
//! Coaches can see every member's streak and photo compliance, plus the
//! full check-in history of any member.

use crate::error::{AppError, Result};
use crate::models::{PhotoCompliance, User, UserRole};
use crate::routes::responses::{checkin_list, CheckinResponse, CommunityStatResponse};
use crate::services::ledger::{self, CALENDAR_LIMIT};
use crate::services::{metrics, users, CallerIdentity};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_CONCURRENT_MEMBER_LOOKUPS: usize = 8;

/// Coach routes (caller identity required; role checked per handler).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/coach/dashboard", get(get_dashboard))
        .route("/api/coach/member-calendar", get(get_member_calendar))
}

/// Load the caller and make sure they are a coach.
async fn require_coach(state: &AppState, caller: &CallerIdentity, what: &str) -> Result<User> {
    match users::resolve_user(&state.db, &caller.external_id).await? {
        Some(user) if user.is_coach() => Ok(user),
        _ => {
            tracing::warn!(external_id = %caller.external_id, "Non-coach attempted coach access");
            Err(AppError::Forbidden(format!(
                "Only coaches can access this {what}."
            )))
        }
    }
}

// ─── Dashboard ───────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CoachSummary {
    pub whop_user_id: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MemberSummary {
    pub whop_user_id: String,
    pub name: String,
    pub streak: u32,
    #[cfg_attr(
        feature = "binding-generation",
        ts(type = "{ compliant: boolean, photoCount: number }")
    )]
    pub photo_compliance: PhotoCompliance,
    pub has_checked_in_today: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DashboardResponse {
    pub coach: CoachSummary,
    pub community_stats: CommunityStatResponse,
    pub members: Vec<MemberSummary>,
}

async fn summarize_member(state: &AppState, member: User, now: DateTime<Utc>) -> Result<MemberSummary> {
    let (streak, photo_compliance, today) = tokio::try_join!(
        metrics::calculate_streak(&state.db, &member.external_id, now),
        metrics::check_photo_compliance(&state.db, &member.external_id, now),
        ledger::get_today_checkin(&state.db, &member.external_id, now),
    )?;

    Ok(MemberSummary {
        whop_user_id: member.external_id,
        name: member.name,
        streak,
        photo_compliance,
        has_checked_in_today: today.is_some(),
    })
}

/// Overview of every member plus today's community stats.
async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<DashboardResponse>> {
    let coach = require_coach(&state, &caller, "dashboard").await?;
    let now = Utc::now();

    let members = state.db.list_users_by_role(UserRole::Member).await?;
    tracing::debug!(coach = %coach.external_id, members = members.len(), "Building coach dashboard");

    // `buffered` keeps the members in their listed order.
    let members = stream::iter(members)
        .map(|member| summarize_member(&state, member, now))
        .buffered(MAX_CONCURRENT_MEMBER_LOOKUPS)
        .collect::<Vec<Result<MemberSummary>>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

    let community_stats = metrics::today_stats(&state.db, now).await?;

    Ok(Json(DashboardResponse {
        coach: CoachSummary {
            whop_user_id: coach.external_id,
            name: coach.name,
        },
        community_stats: CommunityStatResponse::from(&community_stats),
        members,
    }))
}

// ─── Member Calendar ─────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberCalendarQuery {
    user_id: Option<String>,
}

/// A member's recent check-ins.
async fn get_member_calendar(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Query(params): Query<MemberCalendarQuery>,
) -> Result<Json<Vec<CheckinResponse>>> {
    let member_id = params
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Member user ID is required.".to_string()))?;

    let coach = require_coach(&state, &caller, "data").await?;
    tracing::debug!(coach = %coach.external_id, member = %member_id, "Coach viewing member calendar");

    let checkins = ledger::list_user_checkins(&state.db, &member_id, CALENDAR_LIMIT).await?;
    Ok(Json(checkin_list(&checkins)))
}
