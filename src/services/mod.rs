// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod feed;
pub mod identity;
pub mod ledger;
pub mod metrics;
pub mod sanitize;
pub mod users;
pub mod whop;

pub use identity::{CallerIdentity, IdentityError, IdentityResolver, TestHeaderIdentity};
pub use ledger::NewCheckin;
pub use whop::WhopIdentity;
