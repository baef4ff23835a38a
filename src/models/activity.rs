use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A viewed-movie or watchlist record owned by the activity collaborator
///
/// `movie_id` is always an integer; callers normalize before any lookup or
/// storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntry {
    pub user_id: i64,
    pub movie_id: i64,
    pub timestamp: DateTime<Utc>,
}
