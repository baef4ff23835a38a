use crate::error::AppResult;
use crate::models::ActivityEntry;

/// A user's viewing history and watchlist
///
/// Persistence lives outside this crate; the recommendation engine only
/// calls the read operations. The write operations exist for the
/// out-of-scope persistence layer and for [`super::activity::ActivityService`],
/// which pairs them with cache invalidation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserActivity: Send + Sync {
    async fn get_viewed(&self, user_id: i64) -> AppResult<Vec<ActivityEntry>>;

    async fn get_watchlist(&self, user_id: i64) -> AppResult<Vec<ActivityEntry>>;

    async fn upsert_viewed(&self, user_id: i64, movie_id: i64) -> AppResult<()>;

    async fn upsert_watchlist(&self, user_id: i64, movie_id: i64) -> AppResult<()>;

    async fn delete_watchlist(&self, user_id: i64, movie_id: i64) -> AppResult<()>;

    async fn watchlist_count(&self, user_id: i64) -> AppResult<u64>;
}
