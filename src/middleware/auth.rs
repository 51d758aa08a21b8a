// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Caller identity middleware.

use crate::error::AppError;
use crate::services::CallerIdentity;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that resolves the caller through the configured identity
/// strategy and stores a [`CallerIdentity`] in the request extensions.
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let caller = state.identity.resolve(request.headers()).await?;

    tracing::debug!(external_id = %caller.external_id, "Caller identified");

    request.extensions_mut().insert::<CallerIdentity>(caller);
    Ok(next.run(request).await)
}
