// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in routes: creation, history, and today's status.

use crate::error::{AppError, Result};
use crate::models::{CheckinType, UserRole};
use crate::routes::responses::{checkin_list, CheckinResponse, LogResponse};
use crate::services::ledger::{self, NewCheckin, CALENDAR_LIMIT, HISTORY_LIMIT};
use crate::services::{metrics, users, CallerIdentity};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_MUSCLE_GROUP_LEN: u64 = 64;
const MAX_NOTE_LEN: u64 = 2000;
const MAX_PHOTO_REF_LEN: u64 = 2048;

/// Check-in routes (caller identity required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/checkins", get(list_checkins))
        .route("/api/checkins/status", get(checkin_status))
        .route("/api/checkin/workout", post(create_workout))
        .route("/api/checkin/rest", post(create_rest))
        .route("/api/checkin/reflection", post(create_reflection))
        .route("/api/logs", post(create_log))
        .route("/api/calendar", get(get_calendar))
}

/// Administrative check-in routes.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/checkins", delete(delete_all_checkins))
}

// ─── Creation ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct WorkoutRequest {
    #[validate(length(max = MAX_MUSCLE_GROUP_LEN))]
    muscle_group: Option<String>,
    #[validate(length(max = MAX_NOTE_LEN))]
    note: Option<String>,
    #[validate(length(max = MAX_PHOTO_REF_LEN))]
    photo_url: Option<String>,
    shared_photo: Option<bool>,
    shared_note: Option<bool>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct NoteRequest {
    #[validate(length(max = MAX_NOTE_LEN))]
    note: Option<String>,
    shared_note: Option<bool>,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct LogRequest {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[validate(length(max = MAX_MUSCLE_GROUP_LEN))]
    workout_kind: Option<String>,
    #[validate(length(max = MAX_NOTE_LEN))]
    note: Option<String>,
    is_public: Option<bool>,
    #[validate(length(max = MAX_PHOTO_REF_LEN))]
    photo_id: Option<String>,
}

impl LogRequest {
    /// `/logs` accepts WORKOUT, REST and the legacy MISSED type.
    fn into_new_checkin(self) -> Result<NewCheckin> {
        let kind = match self.kind.as_deref().map(str::parse::<CheckinType>) {
            Some(Ok(kind @ (CheckinType::Workout | CheckinType::Rest | CheckinType::Missed))) => {
                kind
            }
            _ => return Err(AppError::BadRequest("Invalid check-in type.".to_string())),
        };

        let new = NewCheckin {
            note: self.note,
            ..NewCheckin::new(kind)
        };

        // Only workouts carry a muscle group and a photo.
        if kind != CheckinType::Workout {
            return Ok(new);
        }

        Ok(NewCheckin {
            muscle_group: self.workout_kind,
            photo_ref: self.photo_id,
            shared_photo: self.is_public.unwrap_or(false),
            ..new
        })
    }
}

/// Shared tail of every creation endpoint.
///
/// Validation happens before the user row is touched, so a rejected request
/// writes nothing.
async fn record_checkin(
    state: &AppState,
    caller: &CallerIdentity,
    new: NewCheckin,
) -> Result<(StatusCode, Json<LogResponse>)> {
    new.validate()?;

    let user = users::get_or_create_user(
        &state.db,
        &caller.external_id,
        &caller.display_name,
        UserRole::Member,
    )
    .await?;

    let now = chrono::Utc::now();
    let checkin = ledger::create_checkin(&state.db, &user.external_id, new, now).await?;

    if checkin.kind.is_active() {
        metrics::recompute_today_stats(&state.db, now).await?;
    }

    Ok((StatusCode::CREATED, Json(LogResponse::new(&checkin, &user))))
}

/// Log today's workout.
async fn create_workout(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    payload: std::result::Result<Json<WorkoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LogResponse>)> {
    let Json(body) = payload?;
    body.validate()?;

    let new = NewCheckin {
        muscle_group: body.muscle_group,
        note: body.note,
        photo_ref: body.photo_url,
        shared_photo: body.shared_photo.unwrap_or(false),
        shared_note: body.shared_note.unwrap_or(false),
        ..NewCheckin::new(CheckinType::Workout)
    };

    record_checkin(&state, &caller, new).await
}

/// Log a rest day.
async fn create_rest(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    payload: std::result::Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LogResponse>)> {
    let Json(body) = payload?;
    body.validate()?;

    let new = NewCheckin {
        note: body.note,
        shared_note: body.shared_note.unwrap_or(false),
        ..NewCheckin::new(CheckinType::Rest)
    };

    record_checkin(&state, &caller, new).await
}

/// Log a reflection. Does not affect streaks or community stats.
async fn create_reflection(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    payload: std::result::Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LogResponse>)> {
    let Json(body) = payload?;
    body.validate()?;

    let new = NewCheckin {
        note: body.note,
        shared_note: body.shared_note.unwrap_or(false),
        ..NewCheckin::new(CheckinType::Reflection)
    };

    record_checkin(&state, &caller, new).await
}

/// Generic log endpoint used by the quick-log flow.
async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    payload: std::result::Result<Json<LogRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LogResponse>)> {
    let Json(body) = payload?;
    body.validate()?;

    let new = body.into_new_checkin()?;
    record_checkin(&state, &caller, new).await
}

// ─── Reads ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckinsResponse {
    pub checkins: Vec<CheckinResponse>,
}

/// Caller's own history, newest first.
async fn list_checkins(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<CheckinsResponse>> {
    let checkins =
        ledger::list_user_checkins(&state.db, &caller.external_id, HISTORY_LIMIT).await?;

    Ok(Json(CheckinsResponse {
        checkins: checkin_list(&checkins),
    }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckinStatusResponse {
    pub has_checked_in: bool,
}

/// Whether the caller already checked in today.
async fn checkin_status(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<CheckinStatusResponse>> {
    let today = ledger::get_today_checkin(&state.db, &caller.external_id, chrono::Utc::now())
        .await?;

    Ok(Json(CheckinStatusResponse {
        has_checked_in: today.is_some(),
    }))
}

/// Caller's recent check-ins for the calendar heatmap.
async fn get_calendar(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<Vec<CheckinResponse>>> {
    let user = users::require_user(&state.db, &caller.external_id).await?;
    let checkins = ledger::list_user_checkins(&state.db, &user.external_id, CALENDAR_LIMIT).await?;

    Ok(Json(checkin_list(&checkins)))
}

// ─── Administration ──────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Wipe every check-in (test environment reset).
async fn delete_all_checkins(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>> {
    let count = state.db.delete_all_checkins().await?;
    metrics::recompute_today_stats(&state.db, chrono::Utc::now()).await?;

    tracing::warn!(count, "All check-ins deleted via admin endpoint");

    Ok(Json(MessageResponse {
        message: format!("Successfully deleted {count} check-ins."),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_request(kind: Option<&str>) -> LogRequest {
        LogRequest {
            kind: kind.map(String::from),
            workout_kind: Some("Legs".to_string()),
            note: None,
            is_public: Some(true),
            photo_id: Some("photos/1.jpg".to_string()),
        }
    }

    #[test]
    fn test_log_request_maps_fields() {
        let new = log_request(Some("WORKOUT")).into_new_checkin().unwrap();
        assert_eq!(new.kind, CheckinType::Workout);
        assert_eq!(new.muscle_group.as_deref(), Some("Legs"));
        assert_eq!(new.photo_ref.as_deref(), Some("photos/1.jpg"));
        assert!(new.shared_photo);
    }

    #[test]
    fn test_log_request_rest_drops_photo() {
        let new = log_request(Some("REST")).into_new_checkin().unwrap();
        assert_eq!(new.kind, CheckinType::Rest);
        assert_eq!(new.photo_ref, None);
        assert_eq!(new.muscle_group, None);
        assert!(!new.shared_photo);

        let checkin = new.into_checkin("user_1", chrono::Utc::now());
        assert!(!checkin.is_publicly_shared());
    }

    #[test]
    fn test_log_request_rejects_reflection_and_unknown() {
        for kind in [None, Some("REFLECTION"), Some("workout"), Some("NAP")] {
            assert!(
                matches!(
                    log_request(kind).into_new_checkin(),
                    Err(AppError::BadRequest(_))
                ),
                "{kind:?}"
            );
        }
        assert!(log_request(Some("MISSED")).into_new_checkin().is_ok());
    }

    #[test]
    fn test_overlong_note_fails_validation() {
        let body = NoteRequest {
            note: Some("x".repeat(MAX_NOTE_LEN as usize + 1)),
            shared_note: None,
        };
        assert!(body.validate().is_err());
    }
}
