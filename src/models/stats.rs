//! Derived metrics: streaks, photo compliance and the daily community aggregate.
//!
//! Everything here is computed from already-loaded check-ins so it can be
//! tested without a database. The service layer does the fetching.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use crate::models::{Checkin, CheckinType};
use crate::time_utils::day_key;

/// Photographed workouts needed in the trailing window to be compliant.
pub const PHOTO_COMPLIANCE_MIN: u32 = 2;
/// Length of the trailing photo-compliance window.
pub const PHOTO_COMPLIANCE_WINDOW_DAYS: i64 = 7;

/// Daily community aggregate.
///
/// Stored at: `community_stats/{YYYY-MM-DD}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityStat {
    /// Local calendar day (`YYYY-MM-DD`, also the document ID)
    pub date: String,
    /// Number of users at computation time
    pub total_members: u32,
    /// Distinct owners with a WORKOUT or REST check-in that day
    pub active_today: u32,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl CommunityStat {
    /// Full recomputation from the member count and the day's check-ins.
    pub fn compute(
        day: NaiveDate,
        total_members: u32,
        day_checkins: &[Checkin],
        now: DateTime<Utc>,
    ) -> Self {
        let key = day_key(day);
        let active: HashSet<&str> = day_checkins
            .iter()
            .filter(|c| c.kind.is_active() && c.day == key)
            .map(|c| c.owner_id.as_str())
            .collect();

        Self {
            date: key,
            total_members,
            active_today: active.len() as u32,
            updated_at: now,
        }
    }
}

/// Weekly photo compliance result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCompliance {
    pub compliant: bool,
    pub photo_count: u32,
}

impl PhotoCompliance {
    pub fn from_count(photo_count: u32) -> Self {
        Self {
            compliant: photo_count >= PHOTO_COMPLIANCE_MIN,
            photo_count,
        }
    }
}

/// Start of the rolling photo-compliance window ending at `now`.
pub fn photo_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(PHOTO_COMPLIANCE_WINDOW_DAYS)
}

/// Count WORKOUT check-ins with a photo inside the trailing window.
pub fn photo_compliance(checkins: &[Checkin], now: DateTime<Utc>) -> PhotoCompliance {
    let since = photo_window_start(now);
    let count = checkins
        .iter()
        .filter(|c| c.kind == CheckinType::Workout)
        .filter(|c| c.photo_ref.is_some())
        .filter(|c| c.created_at >= since)
        .count();

    PhotoCompliance::from_count(count as u32)
}

/// Consecutive qualifying days ending today.
///
/// Walks backwards one day at a time starting at `today` and stops at the
/// first day without a WORKOUT/REST check-in. A missing check-in today
/// therefore yields 0 even if yesterday was logged.
pub fn streak_length(checkins: &[Checkin], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = checkins
        .iter()
        .filter(|c| c.kind.is_active())
        .map(Checkin::local_day)
        .collect();

    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
