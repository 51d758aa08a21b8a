// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Caller identity resolution.
//!
//! The strategy is picked once at startup (see `IDENTITY_MODE`) and stored
//! in `AppState` as an `Arc<dyn IdentityResolver>`.

use crate::error::AppError;
use async_trait::async_trait;
use axum::http::HeaderMap;

/// Header carrying the caller ID in test-header mode.
pub const TEST_USER_ID_HEADER: &str = "x-test-user-id";
/// Optional display name in test-header mode.
pub const TEST_USER_NAME_HEADER: &str = "x-test-user-name";

const DEFAULT_TEST_USER_NAME: &str = "Test User";

/// Who is calling, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub external_id: String,
    pub display_name: String,
}

/// Identity resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// No usable identity on the request.
    #[error("no caller identity present")]
    Missing,
    /// The provider rejected the credential.
    #[error("identity rejected: {0}")]
    Rejected(String),
    /// The provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Missing => AppError::MissingIdentity,
            IdentityError::Rejected(reason) => {
                tracing::warn!(reason = %reason, "Identity verification failed");
                AppError::InvalidToken
            }
            IdentityError::Unavailable(reason) => AppError::IdentityProvider(reason),
        }
    }
}

/// Strategy for turning request headers into a caller identity.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity, IdentityError>;
}

/// Trusts the `x-test-user-id` header. Only constructed in development.
#[derive(Debug, Default, Clone)]
pub struct TestHeaderIdentity;

#[async_trait]
impl IdentityResolver for TestHeaderIdentity {
    async fn resolve(&self, headers: &HeaderMap) -> Result<CallerIdentity, IdentityError> {
        let external_id = header_str(headers, TEST_USER_ID_HEADER).ok_or(IdentityError::Missing)?;
        let display_name = header_str(headers, TEST_USER_NAME_HEADER)
            .unwrap_or(DEFAULT_TEST_USER_NAME)
            .to_string();

        Ok(CallerIdentity {
            external_id: external_id.to_string(),
            display_name,
        })
    }
}

/// Non-empty, trimmed header value.
pub(crate) fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
