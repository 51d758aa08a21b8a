// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym check-in: daily workout logging for a small coaching community
//!
//! This crate provides the backend API: one check-in per member per day,
//! streaks, weekly photo compliance, community stats, a public feed, and a
//! coach dashboard.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::IdentityResolver;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: Arc<dyn IdentityResolver>,
}
