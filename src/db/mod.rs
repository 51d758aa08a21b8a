//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Users keyed by identity provider user ID
    pub const USERS: &str = "users";
    /// Check-ins keyed by `{owner}_{YYYY-MM-DD}`
    pub const CHECKINS: &str = "checkins";
    /// Daily community aggregates keyed by `YYYY-MM-DD`
    pub const COMMUNITY_STATS: &str = "community_stats";
}
