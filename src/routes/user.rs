// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User directory routes.

use crate::error::{AppError, Result};
use crate::models::UserRole;
use crate::routes::responses::UserResponse;
use crate::services::{users, CallerIdentity};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

/// User routes (caller identity required).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/user/init", get(init_user))
}

/// Administrative user routes.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/user/set-role", post(set_role))
}

/// Create the caller's user row on first visit, resyncing the name afterwards.
async fn init_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<UserResponse>> {
    let user = users::get_or_create_user(
        &state.db,
        &caller.external_id,
        &caller.display_name,
        UserRole::Member,
    )
    .await?;

    Ok(Json(UserResponse::from(&user)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetRoleRequest {
    user_id: Option<String>,
    role: Option<String>,
}

/// Change a user's role.
async fn set_role(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SetRoleRequest>, JsonRejection>,
) -> Result<Json<UserResponse>> {
    let Json(body) = payload?;

    let (Some(user_id), Some(role)) = (body.user_id, body.role) else {
        return Err(AppError::BadRequest(
            "userId and role are required.".to_string(),
        ));
    };

    let role: UserRole = role.parse().map_err(AppError::BadRequest)?;
    let user = users::set_role(&state.db, &user_id, role).await?;

    Ok(Json(UserResponse::from(&user)))
}
