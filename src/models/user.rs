//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Community role. Coaches can additionally read dashboards and any member's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Member,
    Coach,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "MEMBER",
            UserRole::Coach => "COACH",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MEMBER" => Ok(UserRole::Member),
            "COACH" => Ok(UserRole::Coach),
            other => Err(format!("Invalid role provided: {other}")),
        }
    }
}

/// User profile stored in Firestore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Identity provider user ID (also used as document ID)
    pub external_id: String,
    /// Display name, resynced from the identity provider
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(external_id: &str, name: &str, role: UserRole, now: DateTime<Utc>) -> Self {
        Self {
            external_id: external_id.to_string(),
            name: name.to_string(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_coach(&self) -> bool {
        self.role == UserRole::Coach
    }
}
