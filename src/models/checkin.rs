// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Daily check-in model for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::time_utils::{day_key, local_day, parse_day_key};

/// Kind of daily check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckinType {
    Workout,
    Rest,
    Reflection,
    /// Legacy entry type, still accepted by `/logs`.
    Missed,
}

impl CheckinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckinType::Workout => "WORKOUT",
            CheckinType::Rest => "REST",
            CheckinType::Reflection => "REFLECTION",
            CheckinType::Missed => "MISSED",
        }
    }

    /// WORKOUT and REST days keep a streak alive and count as "active" for the community.
    pub fn is_active(&self) -> bool {
        matches!(self, CheckinType::Workout | CheckinType::Rest)
    }

    /// Whether a check-in of this type may carry a shareable photo.
    pub fn allows_photo(&self) -> bool {
        matches!(self, CheckinType::Workout | CheckinType::Rest)
    }
}

impl fmt::Display for CheckinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CheckinType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WORKOUT" => Ok(CheckinType::Workout),
            "REST" => Ok(CheckinType::Rest),
            "REFLECTION" => Ok(CheckinType::Reflection),
            "MISSED" => Ok(CheckinType::Missed),
            other => Err(format!("Invalid check-in type: {other}")),
        }
    }
}

/// Stored check-in record in Firestore.
///
/// The document ID is derived from `(owner_id, day)`, so the collection can
/// hold at most one check-in per owner per local day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkin {
    /// Document ID, see [`Checkin::document_id`]
    pub id: String,
    /// Owner's identity provider user ID
    pub owner_id: String,
    #[serde(rename = "type")]
    pub kind: CheckinType,
    /// Required for WORKOUT, absent otherwise
    pub muscle_group: Option<String>,
    /// Sanitized note
    pub note: Option<String>,
    /// Reference to an uploaded photo
    pub photo_ref: Option<String>,
    #[serde(default)]
    pub shared_photo: bool,
    #[serde(default)]
    pub shared_note: bool,
    /// Local calendar day of `created_at` (`YYYY-MM-DD`)
    pub day: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Checkin {
    /// Deterministic document ID for an owner's check-in on a given day.
    pub fn document_id(owner_id: &str, day: NaiveDate) -> String {
        format!("{}_{}", urlencoding::encode(owner_id), day_key(day))
    }

    /// Calendar day this check-in was bucketed into when it was written.
    pub fn local_day(&self) -> NaiveDate {
        parse_day_key(&self.day).unwrap_or_else(|| local_day(self.created_at))
    }

    /// Whether this entry belongs in the public feed.
    ///
    /// Any type with a shared note qualifies; WORKOUT/REST also qualify with a shared photo.
    pub fn is_publicly_shared(&self) -> bool {
        self.shared_note || (self.kind.allows_photo() && self.shared_photo)
    }
}
