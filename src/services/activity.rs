//! Write-through activity operations with cache invalidation
//!
//! The web layer calls these instead of the raw [`UserActivity`] collaborator
//! so that every history mutation also drops the cache entries it can stale:
//! the user's hydrated watchlist and all of their recommendation lists —
//! both blend surfaces, any limit. Invalidation never crosses users.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{Cache, CacheKey};
use crate::error::AppResult;
use crate::models::Movie;
use crate::services::providers::MetadataProvider;
use crate::services::user_activity::UserActivity;

const WATCHLIST_DETAILS_TTL: Duration = Duration::from_secs(15 * 60);

pub struct ActivityService {
    activity: Arc<dyn UserActivity>,
    provider: Arc<dyn MetadataProvider>,
    cache: Cache,
}

impl ActivityService {
    pub fn new(
        activity: Arc<dyn UserActivity>,
        provider: Arc<dyn MetadataProvider>,
        cache: Cache,
    ) -> Self {
        Self {
            activity,
            provider,
            cache,
        }
    }

    pub async fn add_to_watchlist(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        self.activity.upsert_watchlist(user_id, movie_id).await?;
        tracing::info!(user_id, movie_id, "Movie added to watchlist");
        self.invalidate_user(user_id).await;
        Ok(())
    }

    pub async fn remove_from_watchlist(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        self.activity.delete_watchlist(user_id, movie_id).await?;
        tracing::info!(user_id, movie_id, "Movie removed from watchlist");
        self.invalidate_user(user_id).await;
        Ok(())
    }

    pub async fn record_view(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        self.activity.upsert_viewed(user_id, movie_id).await?;
        tracing::info!(user_id, movie_id, "Movie recorded as viewed");
        // Viewed history feeds the same candidate generation as the
        // watchlist, so recommendation entries go stale here too
        self.cache
            .delete_prefix(&CacheKey::recommendations_prefix(user_id))
            .await;
        Ok(())
    }

    pub async fn watchlist_count(&self, user_id: i64) -> AppResult<u64> {
        self.activity.watchlist_count(user_id).await
    }

    /// Hydrated watchlist in collaborator order
    ///
    /// Entries the provider cannot resolve are skipped, not errors.
    pub async fn watchlist_movies(&self, user_id: i64) -> AppResult<Vec<Movie>> {
        let key = CacheKey::WatchlistDetails(user_id);
        if let Some(movies) = self.cache.get_json::<Vec<Movie>>(&key).await {
            return Ok(movies);
        }

        let entries = self.activity.get_watchlist(user_id).await?;
        let mut movies = Vec::new();
        for entry in entries {
            match self.provider.fetch_movie(entry.movie_id).await {
                Ok(Some(movie)) => movies.push(movie),
                Ok(None) => tracing::warn!(
                    user_id,
                    movie_id = entry.movie_id,
                    "Watchlisted movie unknown to provider"
                ),
                Err(e) => tracing::warn!(
                    user_id,
                    movie_id = entry.movie_id,
                    error = %e,
                    "Watchlisted movie fetch failed, skipping"
                ),
            }
        }

        self.cache
            .set_json(&key, &movies, WATCHLIST_DETAILS_TTL)
            .await;
        Ok(movies)
    }

    async fn invalidate_user(&self, user_id: i64) {
        self.cache.delete(&CacheKey::WatchlistDetails(user_id)).await;
        self.cache
            .delete_prefix(&CacheKey::recommendations_prefix(user_id))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{Actor, BlendMode, MovieSummary};
    use crate::services::providers::{MovieFilters, TrendingWindow};
    use crate::services::user_activity::MockUserActivity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider stub that resolves no movies and counts detail fetches
    struct EmptyProvider {
        fetches: AtomicUsize,
    }

    impl EmptyProvider {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl MetadataProvider for EmptyProvider {
        async fn fetch_movie(&self, _movie_id: i64) -> AppResult<Option<Movie>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }

        async fn fetch_popular(&self, _page: u32, _limit: usize) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        async fn fetch_trending(
            &self,
            _window: TrendingWindow,
            _page: u32,
        ) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        async fn search_movies(&self, _query: &str, _page: u32) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        async fn search_movies_by_filters(
            &self,
            _filters: &MovieFilters,
            _page: u32,
        ) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        async fn fetch_actor_filmography(&self, _actor_id: i64) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        async fn fetch_actor_details(&self, _actor_id: i64) -> AppResult<Option<Actor>> {
            Ok(None)
        }

        async fn fetch_movies_by_person(&self, _person_id: i64) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        async fn fetch_related(
            &self,
            _movie_ids: &[i64],
            _limit: usize,
        ) -> AppResult<Vec<MovieSummary>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &'static str {
            "empty"
        }
    }

    async fn seed_user_entries(cache: &Cache, user_id: i64) {
        let ttl = Duration::from_secs(3600);
        for mode in [BlendMode::RoundRobin, BlendMode::FlatAccumulate] {
            cache
                .set_raw(
                    &CacheKey::Recommendations {
                        user_id,
                        limit: 20,
                        mode,
                    },
                    "[]".to_string(),
                    ttl,
                )
                .await;
        }
        cache
            .set_raw(
                &CacheKey::WatchlistDetails(user_id),
                "[]".to_string(),
                ttl,
            )
            .await;
    }

    #[tokio::test]
    async fn test_add_to_watchlist_invalidates_both_surfaces() {
        let mut activity = MockUserActivity::new();
        activity
            .expect_upsert_watchlist()
            .returning(|_, _| Ok(()));

        let cache = Cache::in_memory();
        seed_user_entries(&cache, 42).await;
        seed_user_entries(&cache, 7).await;

        let service = ActivityService::new(
            Arc::new(activity),
            Arc::new(EmptyProvider::new()),
            cache.clone(),
        );
        service.add_to_watchlist(42, 603).await.unwrap();

        for mode in [BlendMode::RoundRobin, BlendMode::FlatAccumulate] {
            let key = CacheKey::Recommendations {
                user_id: 42,
                limit: 20,
                mode,
            };
            assert_eq!(cache.get_raw(&key).await, None);
        }
        assert_eq!(
            cache.get_raw(&CacheKey::WatchlistDetails(42)).await,
            None
        );

        // Other users are untouched
        assert!(cache
            .get_raw(&CacheKey::WatchlistDetails(7))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_record_view_invalidates_recommendations_only() {
        let mut activity = MockUserActivity::new();
        activity.expect_upsert_viewed().returning(|_, _| Ok(()));

        let cache = Cache::in_memory();
        seed_user_entries(&cache, 42).await;

        let service = ActivityService::new(
            Arc::new(activity),
            Arc::new(EmptyProvider::new()),
            cache.clone(),
        );
        service.record_view(42, 603).await.unwrap();

        let key = CacheKey::Recommendations {
            user_id: 42,
            limit: 20,
            mode: BlendMode::RoundRobin,
        };
        assert_eq!(cache.get_raw(&key).await, None);
        assert!(cache
            .get_raw(&CacheKey::WatchlistDetails(42))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_failed_upsert_skips_invalidation() {
        let mut activity = MockUserActivity::new();
        activity
            .expect_upsert_watchlist()
            .returning(|_, _| Err(AppError::Internal("store down".to_string())));

        let cache = Cache::in_memory();
        seed_user_entries(&cache, 42).await;

        let service = ActivityService::new(
            Arc::new(activity),
            Arc::new(EmptyProvider::new()),
            cache.clone(),
        );
        assert!(service.add_to_watchlist(42, 603).await.is_err());

        // Nothing was written, so nothing is dropped
        assert!(cache
            .get_raw(&CacheKey::WatchlistDetails(42))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_watchlist_movies_skips_unresolvable_entries() {
        let mut activity = MockUserActivity::new();
        activity.expect_get_watchlist().returning(|user_id| {
            Ok(vec![crate::models::ActivityEntry {
                user_id,
                movie_id: 603,
                timestamp: chrono::Utc::now(),
            }])
        });

        let provider = Arc::new(EmptyProvider::new());
        let service =
            ActivityService::new(Arc::new(activity), provider.clone(), Cache::in_memory());

        let movies = service.watchlist_movies(42).await.unwrap();
        assert!(movies.is_empty());
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);

        // Second read comes from the cache
        let movies = service.watchlist_movies(42).await.unwrap();
        assert!(movies.is_empty());
        assert_eq!(provider.fetches.load(Ordering::SeqCst), 1);
    }
}
