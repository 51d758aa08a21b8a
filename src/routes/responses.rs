// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON shapes shared across routes.

use crate::models::{Checkin, CheckinType, CommunityStat, User, UserRole};
use crate::services::feed::FeedItem;
use crate::time_utils::format_utc_rfc3339;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Check-in as returned by the API.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckinResponse {
    pub id: String,
    pub whop_user_id: String,
    #[serde(rename = "type")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub kind: CheckinType,
    pub muscle_group: Option<String>,
    pub note: Option<String>,
    pub photo_url: Option<String>,
    pub shared_photo: bool,
    pub shared_note: bool,
    pub created_at: String,
}

impl From<&Checkin> for CheckinResponse {
    fn from(c: &Checkin) -> Self {
        Self {
            id: c.id.clone(),
            whop_user_id: c.owner_id.clone(),
            kind: c.kind,
            muscle_group: c.muscle_group.clone(),
            note: c.note.clone(),
            photo_url: c.photo_ref.clone(),
            shared_photo: c.shared_photo,
            shared_note: c.shared_note,
            created_at: format_utc_rfc3339(c.created_at),
        }
    }
}

pub fn checkin_list(checkins: &[Checkin]) -> Vec<CheckinResponse> {
    checkins.iter().map(CheckinResponse::from).collect()
}

/// User as returned by the API.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub whop_user_id: String,
    pub name: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub role: UserRole,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            whop_user_id: u.external_id.clone(),
            name: u.name.clone(),
            role: u.role,
            created_at: format_utc_rfc3339(u.created_at),
            updated_at: format_utc_rfc3339(u.updated_at),
        }
    }
}

/// Community aggregate as returned by the API.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CommunityStatResponse {
    pub date: String,
    pub total_members: u32,
    pub active_today: u32,
    pub updated_at: String,
}

impl From<&CommunityStat> for CommunityStatResponse {
    fn from(s: &CommunityStat) -> Self {
        Self {
            date: s.date.clone(),
            total_members: s.total_members,
            active_today: s.active_today,
            updated_at: format_utc_rfc3339(s.updated_at),
        }
    }
}

/// Owner summary attached to check-in creation responses.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogUser {
    pub id: String,
    pub name: String,
    pub avatar_url: Option<String>,
}

/// `201` body for every check-in creation endpoint.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogResponse {
    pub log: CheckinResponse,
    pub user: LogUser,
}

impl LogResponse {
    pub fn new(checkin: &Checkin, owner: &User) -> Self {
        Self {
            log: CheckinResponse::from(checkin),
            user: LogUser {
                id: owner.external_id.clone(),
                name: owner.name.clone(),
                avatar_url: None,
            },
        }
    }
}

/// Owner fields exposed in the public feed.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedUser {
    pub name: Option<String>,
    pub whop_user_id: String,
}

/// Public feed entry. Unshared notes and photos are blanked.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct FeedEntry {
    #[serde(flatten)]
    #[cfg_attr(feature = "binding-generation", ts(flatten))]
    pub checkin: CheckinResponse,
    pub user: FeedUser,
}

impl From<FeedItem> for FeedEntry {
    fn from(item: FeedItem) -> Self {
        let mut checkin = CheckinResponse::from(&item.checkin);
        if !item.checkin.shared_note {
            checkin.note = None;
        }
        if !item.checkin.shared_photo {
            checkin.photo_url = None;
        }

        Self {
            user: FeedUser {
                name: item.owner_name,
                whop_user_id: item.checkin.owner_id,
            },
            checkin,
        }
    }
}
