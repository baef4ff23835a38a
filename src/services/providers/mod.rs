/// Movie metadata provider abstraction
///
/// This module provides a pluggable architecture for external movie/person
/// metadata sources (TMDB today). Every operation fails soft: a missing
/// entity resolves to an absent value, and callers are expected to degrade
/// on errors rather than propagate them to users.
use crate::{
    error::AppResult,
    models::{Actor, Movie, MovieSummary},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trending window accepted by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingWindow {
    Day,
    Week,
}

impl TrendingWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendingWindow::Day => "day",
            TrendingWindow::Week => "week",
        }
    }
}

/// Filters for the multi-criteria search surface
#[derive(Debug, Clone, Default)]
pub struct MovieFilters {
    pub query: Option<String>,
    pub year: Option<i32>,
    /// Genre name, resolved to an id through the static genre table
    pub genre: Option<String>,
    pub language: Option<String>,
}

/// Trait for movie metadata providers
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Fetches one movie with credits, videos, and related movies embedded
    ///
    /// Returns `None` when the provider does not know the id.
    async fn fetch_movie(&self, movie_id: i64) -> AppResult<Option<Movie>>;

    /// Fetches the popularity list, truncated to `limit`
    async fn fetch_popular(&self, page: u32, limit: usize) -> AppResult<Vec<MovieSummary>>;

    /// Fetches the trending list for a day or week window
    async fn fetch_trending(
        &self,
        window: TrendingWindow,
        page: u32,
    ) -> AppResult<Vec<MovieSummary>>;

    /// Searches movies by title
    async fn search_movies(&self, query: &str, page: u32) -> AppResult<Vec<MovieSummary>>;

    /// Searches movies by any combination of title, year, genre, language
    async fn search_movies_by_filters(
        &self,
        filters: &MovieFilters,
        page: u32,
    ) -> AppResult<Vec<MovieSummary>>;

    /// Fetches the movies a person is credited in as cast
    async fn fetch_actor_filmography(&self, actor_id: i64) -> AppResult<Vec<MovieSummary>>;

    /// Fetches one person's detail with profile images embedded
    async fn fetch_actor_details(&self, actor_id: i64) -> AppResult<Option<Actor>>;

    /// Fetches the movies a person is credited in as cast or crew
    async fn fetch_movies_by_person(&self, person_id: i64) -> AppResult<Vec<MovieSummary>>;

    /// Fetches provider-curated related movies for a set of source movies,
    /// de-duplicated by id and ranked by vote average
    async fn fetch_related(&self, movie_ids: &[i64], limit: usize)
        -> AppResult<Vec<MovieSummary>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
