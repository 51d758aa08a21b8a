// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::http::HeaderMap;
use gym_checkin::config::Config;
use gym_checkin::db::FirestoreDb;
use gym_checkin::routes::create_router;
use gym_checkin::services::{CallerIdentity, IdentityError, IdentityResolver, TestHeaderIdentity};
use gym_checkin::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique ID per call so emulator tests don't see each other's rows.
#[allow(dead_code)]
pub fn unique_user_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{prefix}_{nanos}")
}

/// Resolver that rejects every credential, like a provider seeing a bad token.
#[allow(dead_code)]
pub struct RejectingIdentity;

#[async_trait]
impl IdentityResolver for RejectingIdentity {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<CallerIdentity, IdentityError> {
        Err(IdentityError::Rejected("bad signature".to_string()))
    }
}

/// Resolver whose upstream is down.
#[allow(dead_code)]
pub struct UnavailableIdentity;

#[async_trait]
impl IdentityResolver for UnavailableIdentity {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<CallerIdentity, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".to_string()))
    }
}

/// Create a test app from explicit config and identity strategy, offline DB.
#[allow(dead_code)]
pub fn create_test_app_with(
    config: Config,
    identity: Arc<dyn IdentityResolver>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config,
        db: FirestoreDb::new_mock(),
        identity,
    });

    (create_router(state.clone()), state)
}

/// Create a test app with offline mock dependencies and header identity.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default(), Arc::new(TestHeaderIdentity))
}

/// Create a test app backed by the Firestore emulator.
#[allow(dead_code)]
pub async fn create_emulator_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: test_db().await,
        identity: Arc::new(TestHeaderIdentity),
    });

    (create_router(state.clone()), state)
}

/// Read a JSON response body.
#[allow(dead_code)]
pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
