// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gate for administrative endpoints (bulk delete, role changes).
//!
//! Both conditions must hold: the service runs in development and the
//! request carries the configured admin token.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Require development mode plus a matching `x-admin-token`.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !state.config.is_development() {
        tracing::warn!(path = %request.uri().path(), "Blocked admin request outside development");
        return Err(AppError::Forbidden(
            "This action is only available in development.".to_string(),
        ));
    }

    let Some(expected) = state.config.admin_token.as_deref() else {
        tracing::warn!("Blocked admin request: ADMIN_TOKEN not configured");
        return Err(AppError::Forbidden(
            "Administrative endpoints are disabled.".to_string(),
        ));
    };

    let presented = request
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    if !bool::from(presented.as_bytes().ct_eq(expected.as_bytes())) {
        tracing::warn!(path = %request.uri().path(), "Blocked admin request: bad admin token");
        return Err(AppError::Forbidden("Invalid admin token.".to_string()));
    }

    Ok(next.run(request).await)
}
