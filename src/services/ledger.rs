// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in ledger.
//!
//! Handles the write path for daily check-ins:
//! 1. Validate type-specific fields
//! 2. Sanitize the note
//! 3. Fast-path duplicate check against today's document
//! 4. Create-only insert keyed by (owner, day)

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Checkin, CheckinType};
use crate::services::sanitize::sanitize_note;
use crate::time_utils::{day_key, local_day};
use chrono::{DateTime, Utc};

/// Entries returned by `GET /checkins`.
pub const HISTORY_LIMIT: u32 = 100;
/// Entries returned for calendar/heatmap views.
pub const CALENDAR_LIMIT: u32 = 30;

/// A check-in as submitted, before sanitization.
#[derive(Debug, Clone)]
pub struct NewCheckin {
    pub kind: CheckinType,
    pub muscle_group: Option<String>,
    pub note: Option<String>,
    pub photo_ref: Option<String>,
    pub shared_photo: bool,
    pub shared_note: bool,
}

impl NewCheckin {
    pub fn new(kind: CheckinType) -> Self {
        Self {
            kind,
            muscle_group: None,
            note: None,
            photo_ref: None,
            shared_photo: false,
            shared_note: false,
        }
    }

    /// Type-specific field rules. Runs before anything touches storage.
    pub fn validate(&self) -> Result<()> {
        if self.kind == CheckinType::Workout {
            let has_group = self
                .muscle_group
                .as_deref()
                .is_some_and(|g| !g.trim().is_empty());
            if !has_group {
                return Err(AppError::BadRequest(
                    "Muscle group is required for workout check-in.".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Build the stored record, normalizing fields that don't apply to this type.
    pub fn into_checkin(self, owner_id: &str, now: DateTime<Utc>) -> Checkin {
        let day = local_day(now);
        let allows_photo = self.kind.allows_photo();
        let photo_ref = self
            .photo_ref
            .filter(|p| allows_photo && !p.trim().is_empty());

        Checkin {
            id: Checkin::document_id(owner_id, day),
            owner_id: owner_id.to_string(),
            kind: self.kind,
            muscle_group: self
                .muscle_group
                .filter(|_| self.kind == CheckinType::Workout)
                .map(|g| g.trim().to_string()),
            note: sanitize_note(self.note.as_deref()),
            photo_ref,
            shared_photo: allows_photo && self.shared_photo,
            shared_note: self.shared_note,
            day: day_key(day),
            created_at: now,
        }
    }
}

/// The owner's check-in for the local day containing `now`, if any.
pub async fn get_today_checkin(
    db: &FirestoreDb,
    owner_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<Checkin>> {
    db.get_checkin(&Checkin::document_id(owner_id, local_day(now)))
        .await
}

/// Record a check-in for today.
///
/// Returns `BadRequest` for invalid fields and `Conflict` if the owner already
/// checked in today, in both cases without writing anything.
pub async fn create_checkin(
    db: &FirestoreDb,
    owner_id: &str,
    new: NewCheckin,
    now: DateTime<Utc>,
) -> Result<Checkin> {
    new.validate()?;

    if get_today_checkin(db, owner_id, now).await?.is_some() {
        return Err(AppError::Conflict(AppError::ALREADY_CHECKED_IN.to_string()));
    }

    // The pre-check above can race; the create-only insert is authoritative.
    let checkin = db.insert_checkin(&new.into_checkin(owner_id, now)).await?;

    tracing::info!(
        owner_id,
        kind = %checkin.kind,
        day = %checkin.day,
        has_photo = checkin.photo_ref.is_some(),
        "Check-in recorded"
    );

    Ok(checkin)
}

/// Recent check-ins for an owner, newest first.
pub async fn list_user_checkins(
    db: &FirestoreDb,
    owner_id: &str,
    limit: u32,
) -> Result<Vec<Checkin>> {
    db.list_checkins_for_owner(owner_id, limit).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout(group: Option<&str>) -> NewCheckin {
        NewCheckin {
            muscle_group: group.map(String::from),
            ..NewCheckin::new(CheckinType::Workout)
        }
    }

    #[test]
    fn test_workout_requires_muscle_group() {
        assert!(matches!(
            workout(None).validate(),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            workout(Some("  ")).validate(),
            Err(AppError::BadRequest(_))
        ));
        assert!(workout(Some("Back")).validate().is_ok());
    }

    #[test]
    fn test_rest_and_reflection_need_no_muscle_group() {
        assert!(NewCheckin::new(CheckinType::Rest).validate().is_ok());
        assert!(NewCheckin::new(CheckinType::Reflection).validate().is_ok());
        assert!(NewCheckin::new(CheckinType::Missed).validate().is_ok());
    }

    #[test]
    fn test_into_checkin_sanitizes_note_and_keys_by_day() {
        let now = Utc::now();
        let new = NewCheckin {
            note: Some("Felt great<script>steal()</script>".to_string()),
            ..workout(Some(" Chest "))
        };

        let checkin = new.into_checkin("user_1", now);

        assert_eq!(checkin.note.as_deref(), Some("Felt great"));
        assert_eq!(checkin.muscle_group.as_deref(), Some("Chest"));
        assert_eq!(checkin.id, Checkin::document_id("user_1", local_day(now)));
        assert_eq!(checkin.day, day_key(local_day(now)));
        assert_eq!(checkin.created_at, now);
    }

    #[test]
    fn test_into_checkin_drops_fields_that_do_not_apply() {
        let new = NewCheckin {
            muscle_group: Some("Legs".to_string()),
            photo_ref: Some("photos/1.jpg".to_string()),
            shared_photo: true,
            shared_note: true,
            ..NewCheckin::new(CheckinType::Reflection)
        };

        let checkin = new.into_checkin("user_1", Utc::now());

        assert_eq!(checkin.muscle_group, None);
        assert_eq!(checkin.photo_ref, None);
        assert!(!checkin.shared_photo);
        assert!(checkin.shared_note);
    }

    #[test]
    fn test_empty_note_becomes_none() {
        let new = NewCheckin {
            note: Some(String::new()),
            ..NewCheckin::new(CheckinType::Rest)
        };
        assert_eq!(new.into_checkin("user_1", Utc::now()).note, None);
    }

    #[tokio::test]
    async fn test_invalid_workout_fails_before_storage() {
        // Offline DB errors on any access, so a BadRequest proves no read or write happened.
        let db = FirestoreDb::new_mock();
        let err = create_checkin(&db, "user_1", workout(None), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
