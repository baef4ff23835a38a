//! Actor-based recommendation engine
//!
//! Blends per-actor candidate queues derived from the user's history into
//! one list, supplements shortfalls from the popularity list, and filters
//! out anything the user has seen, anything already placed, and anything
//! not yet released. Both the dedicated recommendations surface and the
//! home feed run through here, parameterized by [`BlendMode`].

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::cache::{Cache, CacheKey};
use crate::config::Config;
use crate::error::AppResult;
use crate::models::{BlendMode, Movie, MovieSummary, RecommendationResult, RecommendationSource};
use crate::services::providers::MetadataProvider;
use crate::services::user_activity::UserActivity;

const RESULT_TTL: Duration = Duration::from_secs(60 * 60);
/// Newest candidates kept per contributing actor
const PER_ACTOR_CAP: usize = 5;
/// Popularity page size drawn on when supplementing a shortfall
const POPULAR_PAGE_SIZE: usize = 20;

/// Which history movie contributed an actor to candidate generation
#[derive(Debug, Clone)]
struct ActorAttribution {
    actor_id: i64,
    actor_name: String,
    source_movie_id: i64,
    source_movie_title: String,
}

/// Recommendation engine over a metadata provider and an activity source
pub struct RecommendationEngine {
    provider: Arc<dyn MetadataProvider>,
    activity: Arc<dyn UserActivity>,
    cache: Cache,
    fetch_concurrency: usize,
    deadline: Duration,
}

impl RecommendationEngine {
    pub fn new(
        provider: Arc<dyn MetadataProvider>,
        activity: Arc<dyn UserActivity>,
        cache: Cache,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            activity,
            cache,
            fetch_concurrency: config.fetch_concurrency.max(1),
            deadline: Duration::from_secs(config.recommend_deadline_secs),
        }
    }

    /// Produces up to `limit` recommendations for `user_id`
    ///
    /// Partial data loss degrades the candidate pool silently; the result is
    /// marked `degraded` only when even the popularity fallback failed.
    pub async fn recommend(
        &self,
        user_id: i64,
        limit: usize,
        mode: BlendMode,
    ) -> AppResult<RecommendationResult> {
        let key = CacheKey::Recommendations {
            user_id,
            limit,
            mode,
        };
        if let Some(result) = self.cache.get_json::<RecommendationResult>(&key).await {
            tracing::info!(
                user_id,
                mode = mode.as_str(),
                "Serving recommendations from cache"
            );
            return Ok(result);
        }

        let result = self.compute(user_id, limit, mode).await;
        // Degraded results stay uncached so recovery is picked up immediately
        if !result.degraded {
            self.cache.set_json(&key, &result, RESULT_TTL).await;
        }
        Ok(result)
    }

    async fn compute(&self, user_id: i64, limit: usize, mode: BlendMode) -> RecommendationResult {
        let deadline = Instant::now() + self.deadline;
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();

        let viewed_ids: Vec<i64> = match self.activity.get_viewed(user_id).await {
            Ok(entries) => entries.into_iter().map(|entry| entry.movie_id).collect(),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Viewed history unavailable, continuing without it");
                Vec::new()
            }
        };
        let watchlist_ids: Vec<i64> = match self.activity.get_watchlist(user_id).await {
            Ok(entries) => entries.into_iter().map(|entry| entry.movie_id).collect(),
            Err(e) => {
                tracing::error!(user_id, error = %e, "Watchlist unavailable, continuing without it");
                Vec::new()
            }
        };

        // Set union; the ordered set fixes the iteration order (ascending
        // by id) that every order-sensitive step below depends on
        let history: BTreeSet<i64> = viewed_ids.iter().chain(&watchlist_ids).copied().collect();

        if history.is_empty() {
            return self.popular_only(user_id, limit).await;
        }

        let fetched = self.fetch_history_movies(user_id, &history, deadline).await;

        // Computed for parity with the genre-preference tally the fallback
        // path historically carried; intentionally not applied to ranking.
        // See DESIGN.md.
        let tally = genre_tally(&fetched, &viewed_ids, &watchlist_ids);
        if !tally.is_empty() {
            tracing::debug!(user_id, tally = ?tally, "Genre affinity tally");
        }

        let attributions = collect_first_cast(&fetched);
        tracing::info!(
            user_id,
            movies = fetched.len(),
            attributions = attributions.len(),
            "Collected primary cast members"
        );

        let queues = self
            .build_actor_queues(user_id, &history, attributions, deadline)
            .await;

        let mut movies = match mode {
            BlendMode::RoundRobin => round_robin_blend(queues, limit),
            BlendMode::FlatAccumulate => flat_accumulate_blend(queues, limit),
        };

        let mut degraded = false;
        if movies.len() < limit {
            let shortfall = limit - movies.len();
            let mut excluded: HashSet<i64> = history.iter().copied().collect();
            excluded.extend(movies.iter().map(|movie| movie.id));

            match self.provider.fetch_popular(1, POPULAR_PAGE_SIZE).await {
                Ok(popular) => {
                    tracing::info!(user_id, shortfall, "Supplementing with popular movies");
                    movies.extend(
                        popular
                            .into_iter()
                            .filter(|movie| !excluded.contains(&movie.id))
                            .take(shortfall),
                    );
                }
                Err(e) => {
                    tracing::error!(
                        user_id,
                        endpoint = "movie/popular",
                        error = %e,
                        "Popularity fallback unavailable"
                    );
                    degraded = movies.is_empty();
                }
            }
        }

        // Unreleased and undated entries never surface
        movies.retain(|movie| !movie.release_date.is_empty() && movie.release_date <= today);
        movies.truncate(limit);

        tracing::info!(
            user_id,
            count = movies.len(),
            mode = mode.as_str(),
            degraded,
            "Recommendations assembled"
        );
        RecommendationResult {
            movies,
            source: RecommendationSource::Cast,
            degraded,
        }
    }

    /// Empty-history path: the first `limit` popular movies
    async fn popular_only(&self, user_id: i64, limit: usize) -> RecommendationResult {
        match self.provider.fetch_popular(1, limit).await {
            Ok(movies) => {
                tracing::info!(
                    user_id,
                    count = movies.len(),
                    "No history, serving popular movies"
                );
                RecommendationResult {
                    movies,
                    source: RecommendationSource::Popular,
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::error!(
                    user_id,
                    endpoint = "movie/popular",
                    error = %e,
                    "Popularity fallback unavailable"
                );
                RecommendationResult {
                    movies: Vec::new(),
                    source: RecommendationSource::Popular,
                    degraded: true,
                }
            }
        }
    }

    /// Fetches history movies over the bounded pool, merged back in
    /// ascending-id order regardless of completion order
    async fn fetch_history_movies(
        &self,
        user_id: i64,
        history: &BTreeSet<i64>,
        deadline: Instant,
    ) -> Vec<Movie> {
        let fetches = stream::iter(history.iter().copied())
            .map(|movie_id| async move {
                match self.provider.fetch_movie(movie_id).await {
                    Ok(movie) => movie,
                    Err(e) => {
                        tracing::warn!(
                            user_id,
                            movie_id,
                            endpoint = "movie/{id}",
                            error = %e,
                            "History movie fetch failed, skipping"
                        );
                        None
                    }
                }
            })
            .buffered(self.fetch_concurrency);
        futures::pin_mut!(fetches);

        let mut movies = Vec::new();
        while let Some(movie) = fetches.next().await {
            if let Some(movie) = movie {
                movies.push(movie);
            }
            if Instant::now() >= deadline {
                tracing::warn!(
                    user_id,
                    fetched = movies.len(),
                    "Deadline reached while fetching history movies"
                );
                break;
            }
        }
        movies
    }

    /// Fetches filmographies for the de-duplicated actors and builds each
    /// actor's capped candidate queue
    async fn build_actor_queues(
        &self,
        user_id: i64,
        history: &BTreeSet<i64>,
        attributions: Vec<ActorAttribution>,
        deadline: Instant,
    ) -> Vec<VecDeque<MovieSummary>> {
        // First attribution wins on duplicate actors
        let mut seen = HashSet::new();
        let unique: Vec<ActorAttribution> = attributions
            .into_iter()
            .filter(|attribution| seen.insert(attribution.actor_id))
            .collect();

        if Instant::now() >= deadline {
            tracing::warn!(user_id, "Deadline reached before filmography fetches");
            return Vec::new();
        }

        let fetches = stream::iter(unique)
            .map(|attribution| async move {
                let films = match self
                    .provider
                    .fetch_actor_filmography(attribution.actor_id)
                    .await
                {
                    Ok(films) => films,
                    Err(e) => {
                        tracing::warn!(
                            user_id,
                            actor_id = attribution.actor_id,
                            endpoint = "person/{id}/movie_credits",
                            error = %e,
                            "Filmography fetch failed, skipping actor"
                        );
                        Vec::new()
                    }
                };
                (attribution, films)
            })
            .buffered(self.fetch_concurrency);
        futures::pin_mut!(fetches);

        let mut per_actor: Vec<(ActorAttribution, Vec<MovieSummary>)> = Vec::new();
        while let Some(item) = fetches.next().await {
            per_actor.push(item);
            if Instant::now() >= deadline {
                tracing::warn!(
                    user_id,
                    actors = per_actor.len(),
                    "Deadline reached while fetching filmographies"
                );
                break;
            }
        }

        // Claiming is order-sensitive: actors take candidates in
        // attribution order, newest releases first, at most
        // PER_ACTOR_CAP each
        let mut claimed: HashSet<i64> = history.iter().copied().collect();
        let mut queues = Vec::new();
        for (attribution, films) in per_actor {
            let mut candidates: Vec<MovieSummary> = films
                .into_iter()
                .filter(|movie| !claimed.contains(&movie.id))
                .collect();
            candidates.sort_by(|a, b| b.release_date.cmp(&a.release_date));
            candidates.truncate(PER_ACTOR_CAP);
            claimed.extend(candidates.iter().map(|movie| movie.id));

            tracing::debug!(
                user_id,
                actor_id = attribution.actor_id,
                actor = %attribution.actor_name,
                source_movie_id = attribution.source_movie_id,
                source_movie = %attribution.source_movie_title,
                candidates = candidates.len(),
                "Actor candidate queue built"
            );
            queues.push(candidates.into());
        }
        queues
    }
}

/// Primary cast member of each history movie, in movie order
fn collect_first_cast(movies: &[Movie]) -> Vec<ActorAttribution> {
    movies
        .iter()
        .filter_map(|movie| {
            movie.first_cast.as_ref().map(|cast| ActorAttribution {
                actor_id: cast.id,
                actor_name: cast.name.clone(),
                source_movie_id: movie.id,
                source_movie_title: movie.title.clone(),
            })
        })
        .collect()
}

/// Genre counts over the user's history: viewed movies weigh 2, watchlist
/// movies weigh 3
fn genre_tally(movies: &[Movie], viewed_ids: &[i64], watchlist_ids: &[i64]) -> HashMap<i64, u32> {
    let by_id: HashMap<i64, &Movie> = movies.iter().map(|movie| (movie.id, movie)).collect();

    let mut tally = HashMap::new();
    for (ids, weight) in [(viewed_ids, 2u32), (watchlist_ids, 3u32)] {
        for movie_id in ids {
            if let Some(movie) = by_id.get(movie_id) {
                for genre in &movie.genres {
                    *tally.entry(genre.id).or_insert(0) += weight;
                }
            }
        }
    }
    tally
}

/// One candidate at a time from each active queue, in actor order, until
/// `limit` or all queues drain
fn round_robin_blend(mut queues: Vec<VecDeque<MovieSummary>>, limit: usize) -> Vec<MovieSummary> {
    let mut blended = Vec::new();
    while blended.len() < limit && !queues.is_empty() {
        let mut still_active = Vec::new();
        for mut queue in queues {
            if blended.len() < limit {
                if let Some(movie) = queue.pop_front() {
                    blended.push(movie);
                }
            }
            if !queue.is_empty() {
                still_active.push(queue);
            }
        }
        queues = still_active;
    }
    blended
}

/// Every capped queue appended whole in actor order, then one global sort by
/// release date, newest first
fn flat_accumulate_blend(queues: Vec<VecDeque<MovieSummary>>, limit: usize) -> Vec<MovieSummary> {
    let mut blended: Vec<MovieSummary> = queues.into_iter().flatten().collect();
    blended.sort_by(|a, b| b.release_date.cmp(&a.release_date));
    blended.truncate(limit);
    blended
}
