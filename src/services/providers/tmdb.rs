/// TMDB metadata provider
///
/// Wraps the provider's HTTP API behind the retry/backoff, rate-limit delay,
/// and response-caching contract, and normalizes raw payloads into the
/// canonical movie/person shapes. Every request is a GET carrying the API
/// key and `language=en-US`.
use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::cache::{Cache, CacheKey};
use crate::cached;
use crate::config::Config;
use crate::error::{is_retryable_status, AppError, AppResult};
use crate::models::tmdb::{
    TmdbMovieDetails, TmdbMovieList, TmdbMovieListItem, TmdbPersonCredits, TmdbPersonDetails,
    TmdbVideo, TmdbVideoList,
};
use crate::models::{
    Actor, CastMember, CrewCredit, Genre, Movie, MovieSummary, ProfileImage, RelatedMovie,
};
use crate::services::genres;
use crate::services::providers::{MetadataProvider, MovieFilters, TrendingWindow};

const MOVIE_DETAIL_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const PERSON_TTL: Duration = Duration::from_secs(24 * 60 * 60);
const LIST_TTL: Duration = Duration::from_secs(60 * 60);

const MAX_ATTEMPTS: u32 = 5;
const BACKOFF_BASE: Duration = Duration::from_millis(500);
/// Randomized delay before every outbound call, to stay under provider
/// rate limits
const JITTER_MIN_MS: u64 = 100;
const JITTER_MAX_MS: u64 = 300;

/// Cast entries scanned for profile images before giving up
const CAST_SCAN_LIMIT: usize = 20;
/// Cast entries kept on a movie
const CAST_KEEP_LIMIT: usize = 10;
/// Related movies kept on a movie detail
const RELATED_LIMIT: usize = 6;
/// Extra profile images kept on an actor detail
const PROFILE_IMAGE_LIMIT: usize = 10;

/// TMDB client with caching, retry, and rate-limit discipline
pub struct TmdbProvider {
    /// Owned HTTP client, replaced wholesale after a connection-level
    /// failure so stale pooled connections are discarded
    http: RwLock<reqwest::Client>,
    api_key: String,
    api_url: String,
    image_base: String,
    request_timeout: Duration,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, config: &Config) -> AppResult<Self> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        Ok(Self {
            http: RwLock::new(build_http_client(request_timeout)?),
            api_key: config.tmdb_api_key.clone(),
            api_url: config.tmdb_api_url.clone(),
            image_base: config.image_base_url.clone(),
            request_timeout,
            cache,
        })
    }

    /// GET a provider endpoint through the response cache
    ///
    /// On a miss the call goes out with rate-limit delay and retries; the
    /// raw body is cached under a canonicalized (endpoint, params) key for
    /// `ttl`. A 404 and an undecodable payload both read as absent.
    async fn request_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        ttl: Duration,
    ) -> AppResult<Option<T>> {
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let key = CacheKey::ProviderRequest {
            endpoint: endpoint.to_string(),
            params: params.clone(),
        };

        if let Some(body) = self.cache.get_raw(&key).await {
            return Ok(decode(endpoint, &body));
        }

        let Some(body) = self.execute_with_retry(endpoint, &params).await? else {
            return Ok(None);
        };

        let decoded = decode(endpoint, &body);
        if decoded.is_some() {
            self.cache.set_raw(&key, body, ttl).await;
        }
        Ok(decoded)
    }

    /// Sends one GET with up to [`MAX_ATTEMPTS`] attempts
    ///
    /// Retryable statuses (429, 5xx gateway classes) and connection-level
    /// failures back off exponentially from [`BACKOFF_BASE`]. 404 resolves
    /// to `Ok(None)`. After retries exhaust on a connection failure the
    /// owned client is recreated before the error surfaces.
    async fn execute_with_retry(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> AppResult<Option<String>> {
        let url = format!("{}/{}", self.api_url.trim_end_matches('/'), endpoint);
        let mut attempt: u32 = 0;

        loop {
            let jitter_ms = {
                let mut rng = rand::thread_rng();
                rng.gen_range(JITTER_MIN_MS..=JITTER_MAX_MS)
            };
            tokio::time::sleep(Duration::from_millis(jitter_ms)).await;

            let client = self.http.read().await.clone();
            let result = client
                .get(&url)
                .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
                .query(params)
                .send()
                .await;

            match result {
                Ok(response) => {
                    let status = response.status();

                    if status == reqwest::StatusCode::NOT_FOUND {
                        tracing::debug!(endpoint, "Provider returned 404, treating as absent");
                        return Ok(None);
                    }
                    if status.is_success() {
                        return Ok(Some(response.text().await?));
                    }

                    if is_retryable_status(status.as_u16()) && attempt + 1 < MAX_ATTEMPTS {
                        let backoff = backoff_delay(attempt);
                        tracing::warn!(
                            endpoint,
                            status = %status,
                            attempt,
                            backoff_ms = backoff.as_millis() as u64,
                            "Retryable provider status, backing off"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        continue;
                    }

                    let body = response.text().await.unwrap_or_default();
                    tracing::error!(
                        endpoint,
                        status = %status,
                        body = %body,
                        "Provider request failed"
                    );
                    return Err(if status.as_u16() == 429 {
                        AppError::RateLimited(format!("{}: {}", endpoint, body))
                    } else {
                        AppError::ExternalApi(format!(
                            "{} returned {}: {}",
                            endpoint, status, body
                        ))
                    });
                }
                Err(e) => {
                    if (e.is_connect() || e.is_timeout()) && attempt + 1 < MAX_ATTEMPTS {
                        let backoff = backoff_delay(attempt);
                        tracing::warn!(
                            endpoint,
                            error = %e,
                            attempt,
                            "Transient network failure, backing off"
                        );
                        tokio::time::sleep(backoff).await;
                        attempt += 1;
                        continue;
                    }
                    if e.is_connect() {
                        self.rebuild_client().await;
                    }
                    tracing::error!(endpoint, error = %e, "Provider request failed");
                    return Err(e.into());
                }
            }
        }
    }

    /// Installs a fresh HTTP client, discarding pooled connections
    async fn rebuild_client(&self) {
        match build_http_client(self.request_timeout) {
            Ok(fresh) => {
                *self.http.write().await = fresh;
                tracing::warn!("Recreated HTTP client after connection failure");
            }
            Err(e) => tracing::error!(error = %e, "Failed to recreate HTTP client"),
        }
    }

    fn image_url(&self, size: &str, path: Option<&str>) -> Option<String> {
        path.map(|p| format!("{}/{}{}", self.image_base.trim_end_matches('/'), size, p))
    }

    fn normalize_movie(&self, raw: TmdbMovieDetails, videos: &[TmdbVideo]) -> Movie {
        let release_date = raw.release_date.unwrap_or_default();
        let release_date_formatted = chrono::NaiveDate::parse_from_str(&release_date, "%Y-%m-%d")
            .ok()
            .map(|date| date.format("%d-%m-%Y").to_string());

        let cast: Vec<CastMember> = raw
            .credits
            .cast
            .iter()
            .take(CAST_SCAN_LIMIT)
            .filter_map(|member| {
                let profile_url = self.image_url("w500", member.profile_path.as_deref())?;
                Some(CastMember {
                    id: member.id,
                    name: member.name.clone(),
                    character: member.character.clone().unwrap_or_default(),
                    profile_url,
                })
            })
            .take(CAST_KEEP_LIMIT)
            .collect();
        let first_cast = cast.first().cloned();

        let mut directors = Vec::new();
        let mut writers = Vec::new();
        for member in &raw.credits.crew {
            if member.job.as_deref() == Some("Director") {
                directors.push(CrewCredit {
                    id: member.id,
                    name: member.name.clone(),
                    job: None,
                    profile_url: self.image_url("w500", member.profile_path.as_deref()),
                });
            } else if member.department.as_deref() == Some("Writing") {
                writers.push(CrewCredit {
                    id: member.id,
                    name: member.name.clone(),
                    job: member.job.clone(),
                    profile_url: self.image_url("w500", member.profile_path.as_deref()),
                });
            }
        }

        let recommendations = raw
            .recommendations
            .results
            .into_iter()
            .take(RELATED_LIMIT)
            .map(|rec| RelatedMovie {
                id: rec.id,
                title: rec.title,
                poster_url: self.image_url("w500", rec.poster_path.as_deref()),
                vote_average: rec.vote_average.unwrap_or(0.0),
            })
            .collect();

        Movie {
            id: raw.id,
            title: raw.title,
            overview: raw.overview.unwrap_or_default(),
            release_date,
            release_date_formatted,
            runtime: raw.runtime.unwrap_or(0),
            vote_average: raw.vote_average.unwrap_or(0.0),
            vote_count: raw.vote_count.unwrap_or(0),
            genres: raw
                .genres
                .into_iter()
                .map(|genre| Genre {
                    id: genre.id,
                    name: genre.name,
                })
                .collect(),
            poster_url: self.image_url("w500", raw.poster_path.as_deref()),
            backdrop_url: self.image_url("original", raw.backdrop_path.as_deref()),
            tagline: raw.tagline.unwrap_or_default(),
            status: raw.status.unwrap_or_default(),
            budget: raw.budget.unwrap_or(0),
            revenue: raw.revenue.unwrap_or(0),
            original_language: raw.original_language.unwrap_or_default(),
            production_companies: raw
                .production_companies
                .into_iter()
                .map(|company| company.name)
                .collect(),
            production_countries: raw
                .production_countries
                .into_iter()
                .map(|country| country.name)
                .collect(),
            cast,
            first_cast,
            directors,
            writers,
            trailer_key: resolve_trailer_key(videos),
            recommendations,
        }
    }

    fn normalize_summary(&self, item: TmdbMovieListItem, resolve_genres: bool) -> MovieSummary {
        let genres = if resolve_genres {
            Some(
                item.genre_ids
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(genres::genre_name)
                    .map(str::to_string)
                    .collect(),
            )
        } else {
            None
        };

        MovieSummary {
            id: item.id,
            title: item.title,
            poster_url: self.image_url("w500", item.poster_path.as_deref()),
            release_date: item.release_date.unwrap_or_default(),
            vote_average: item.vote_average.unwrap_or(0.0),
            overview: item.overview.unwrap_or_default(),
            original_language: item.original_language,
            genres,
            character: item.character,
        }
    }

    fn normalize_actor(&self, raw: TmdbPersonDetails) -> Actor {
        let images = raw
            .images
            .profiles
            .into_iter()
            .take(PROFILE_IMAGE_LIMIT)
            .map(|image| ProfileImage {
                url: format!(
                    "{}/w500{}",
                    self.image_base.trim_end_matches('/'),
                    image.file_path
                ),
                aspect_ratio: image.aspect_ratio.unwrap_or(0.0),
                height: image.height.unwrap_or(0),
                width: image.width.unwrap_or(0),
            })
            .collect();

        Actor {
            id: raw.id,
            name: raw.name,
            biography: raw.biography.unwrap_or_default(),
            birthday: raw.birthday,
            deathday: raw.deathday,
            place_of_birth: raw.place_of_birth,
            profile_url: self.image_url("w500", raw.profile_path.as_deref()),
            known_for_department: raw.known_for_department,
            gender: raw.gender,
            popularity: raw.popularity,
            images,
        }
    }
}

fn build_http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

fn backoff_delay(attempt: u32) -> Duration {
    BACKOFF_BASE * 2u32.pow(attempt)
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Option<T> {
    match serde_json::from_str(body) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(endpoint, error = %e, "Malformed provider response, treating as absent");
            None
        }
    }
}

/// Picks the trailer to surface for a movie
///
/// Precedence: official YouTube trailer, any YouTube trailer, YouTube
/// teaser, any YouTube video. A missing `official` flag counts as official.
/// Videos without a key never match.
fn resolve_trailer_key(videos: &[TmdbVideo]) -> Option<String> {
    let on_youtube =
        |video: &&TmdbVideo| video.site.as_deref() == Some("YouTube") && video.key.is_some();

    videos
        .iter()
        .find(|video| {
            on_youtube(video)
                && video.video_type.as_deref() == Some("Trailer")
                && video.official.unwrap_or(true)
        })
        .or_else(|| {
            videos
                .iter()
                .find(|video| on_youtube(video) && video.video_type.as_deref() == Some("Trailer"))
        })
        .or_else(|| {
            videos
                .iter()
                .find(|video| on_youtube(video) && video.video_type.as_deref() == Some("Teaser"))
        })
        .or_else(|| videos.iter().find(on_youtube))
        .and_then(|video| video.key.clone())
}

/// De-duplicates related movies by id (first occurrence wins) and ranks by
/// vote average, highest first
fn merge_related(movies: Vec<MovieSummary>, limit: usize) -> Vec<MovieSummary> {
    let mut seen = std::collections::HashSet::new();
    let mut unique: Vec<MovieSummary> = movies
        .into_iter()
        .filter(|movie| seen.insert(movie.id))
        .collect();
    unique.sort_by(|a, b| b.vote_average.total_cmp(&a.vote_average));
    unique.truncate(limit);
    unique
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn fetch_movie(&self, movie_id: i64) -> AppResult<Option<Movie>> {
        let key = CacheKey::MovieDetail(movie_id);
        if let Some(movie) = self.cache.get_json::<Movie>(&key).await {
            return Ok(Some(movie));
        }

        let raw: Option<TmdbMovieDetails> = self
            .request_json(
                &format!("movie/{}", movie_id),
                &[("append_to_response", "credits,videos,recommendations")],
                MOVIE_DETAIL_TTL,
            )
            .await?;
        let Some(mut raw) = raw else {
            return Ok(None);
        };

        // Some titles ship an empty embedded video payload; try the
        // dedicated endpoint before giving up on a trailer.
        let mut videos = std::mem::take(&mut raw.videos.results);
        if videos.is_empty() {
            tracing::info!(movie_id, "No embedded videos, fetching videos endpoint");
            match self
                .request_json::<TmdbVideoList>(
                    &format!("movie/{}/videos", movie_id),
                    &[],
                    MOVIE_DETAIL_TTL,
                )
                .await
            {
                Ok(Some(list)) => videos = list.results,
                Ok(None) => {}
                Err(e) => tracing::warn!(movie_id, error = %e, "Videos fetch failed"),
            }
        }

        let movie = self.normalize_movie(raw, &videos);
        self.cache.set_json(&key, &movie, MOVIE_DETAIL_TTL).await;
        Ok(Some(movie))
    }

    async fn fetch_popular(&self, page: u32, limit: usize) -> AppResult<Vec<MovieSummary>> {
        let raw: Option<TmdbMovieList> = self
            .request_json("movie/popular", &[("page", &page.to_string())], LIST_TTL)
            .await?;

        Ok(raw
            .map(|list| {
                list.results
                    .into_iter()
                    .take(limit)
                    .map(|item| self.normalize_summary(item, false))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_trending(
        &self,
        window: TrendingWindow,
        page: u32,
    ) -> AppResult<Vec<MovieSummary>> {
        let raw: Option<TmdbMovieList> = self
            .request_json(
                &format!("trending/movie/{}", window.as_str()),
                &[("page", &page.to_string())],
                LIST_TTL,
            )
            .await?;

        Ok(raw
            .map(|list| {
                list.results
                    .into_iter()
                    .map(|item| self.normalize_summary(item, false))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search_movies(&self, query: &str, page: u32) -> AppResult<Vec<MovieSummary>> {
        let page = page.to_string();
        let raw: Option<TmdbMovieList> = self
            .request_json(
                "search/movie",
                &[
                    ("query", query),
                    ("page", &page),
                    ("include_adult", "false"),
                ],
                LIST_TTL,
            )
            .await?;

        Ok(raw
            .map(|list| {
                list.results
                    .into_iter()
                    .map(|item| self.normalize_summary(item, true))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn search_movies_by_filters(
        &self,
        filters: &MovieFilters,
        page: u32,
    ) -> AppResult<Vec<MovieSummary>> {
        let page = page.to_string();
        let mut params: Vec<(&str, String)> = Vec::new();

        let endpoint = if let Some(query) = &filters.query {
            params.push(("query", query.clone()));
            "search/movie"
        } else {
            params.push(("sort_by", "popularity.desc".to_string()));
            "discover/movie"
        };
        params.push(("page", page));
        params.push(("include_adult", "false".to_string()));

        if let Some(year) = filters.year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(language) = &filters.language {
            params.push(("with_original_language", language.clone()));
        }
        if let Some(genre) = &filters.genre {
            match genres::genre_id(genre) {
                Some(id) => params.push(("with_genres", id.to_string())),
                None => tracing::warn!(genre = %genre, "Unknown genre name, ignoring filter"),
            }
        }

        let params: Vec<(&str, &str)> = params
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
            .collect();
        let raw: Option<TmdbMovieList> = self.request_json(endpoint, &params, LIST_TTL).await?;

        Ok(raw
            .map(|list| {
                list.results
                    .into_iter()
                    .map(|item| self.normalize_summary(item, true))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_actor_filmography(&self, actor_id: i64) -> AppResult<Vec<MovieSummary>> {
        let key = CacheKey::ActorFilmography(actor_id);
        cached!(self.cache, key, PERSON_TTL, async move {
            let raw: Option<TmdbPersonCredits> = self
                .request_json(
                    &format!("person/{}/movie_credits", actor_id),
                    &[],
                    PERSON_TTL,
                )
                .await?;

            Ok::<_, AppError>(
                raw.map(|credits| {
                    credits
                        .cast
                        .into_iter()
                        .map(|item| self.normalize_summary(item, false))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
            )
        })
    }

    async fn fetch_actor_details(&self, actor_id: i64) -> AppResult<Option<Actor>> {
        let key = CacheKey::ActorDetail(actor_id);
        if let Some(actor) = self.cache.get_json::<Actor>(&key).await {
            return Ok(Some(actor));
        }

        let raw: Option<TmdbPersonDetails> = self
            .request_json(
                &format!("person/{}", actor_id),
                &[("append_to_response", "images")],
                PERSON_TTL,
            )
            .await?;
        let Some(raw) = raw else {
            return Ok(None);
        };

        let actor = self.normalize_actor(raw);
        self.cache.set_json(&key, &actor, PERSON_TTL).await;
        Ok(Some(actor))
    }

    async fn fetch_movies_by_person(&self, person_id: i64) -> AppResult<Vec<MovieSummary>> {
        let raw: Option<TmdbPersonCredits> = self
            .request_json(
                &format!("person/{}/movie_credits", person_id),
                &[],
                PERSON_TTL,
            )
            .await?;

        Ok(raw
            .map(|credits| {
                credits
                    .cast
                    .into_iter()
                    .chain(credits.crew)
                    .map(|item| self.normalize_summary(item, false))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_related(
        &self,
        movie_ids: &[i64],
        limit: usize,
    ) -> AppResult<Vec<MovieSummary>> {
        let mut all = Vec::new();
        for &movie_id in movie_ids {
            match self
                .request_json::<TmdbMovieList>(
                    &format!("movie/{}/recommendations", movie_id),
                    &[],
                    LIST_TTL,
                )
                .await
            {
                Ok(Some(list)) => all.extend(
                    list.results
                        .into_iter()
                        .map(|item| self.normalize_summary(item, false)),
                ),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(movie_id, error = %e, "Related movies fetch failed, skipping")
                }
            }
        }
        Ok(merge_related(all, limit))
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> TmdbProvider {
        TmdbProvider {
            http: RwLock::new(reqwest::Client::new()),
            api_key: "test_key".to_string(),
            api_url: "http://test.local".to_string(),
            image_base: "https://image.tmdb.org/t/p".to_string(),
            request_timeout: Duration::from_secs(10),
            cache: Cache::in_memory(),
        }
    }

    fn video(site: &str, video_type: &str, official: Option<bool>, key: &str) -> TmdbVideo {
        TmdbVideo {
            key: Some(key.to_string()),
            site: Some(site.to_string()),
            video_type: Some(video_type.to_string()),
            official,
        }
    }

    #[test]
    fn test_official_trailer_beats_teaser() {
        let videos = vec![
            video("YouTube", "Teaser", Some(true), "T1"),
            video("YouTube", "Trailer", Some(true), "O1"),
        ];
        assert_eq!(resolve_trailer_key(&videos), Some("O1".to_string()));
    }

    #[test]
    fn test_unofficial_trailer_used_when_no_official_exists() {
        let videos = vec![
            video("YouTube", "Teaser", Some(true), "T1"),
            video("YouTube", "Trailer", Some(false), "U1"),
        ];
        assert_eq!(resolve_trailer_key(&videos), Some("U1".to_string()));
    }

    #[test]
    fn test_missing_official_flag_counts_as_official() {
        let videos = vec![
            video("YouTube", "Trailer", Some(false), "U1"),
            video("YouTube", "Trailer", None, "M1"),
        ];
        assert_eq!(resolve_trailer_key(&videos), Some("M1".to_string()));
    }

    #[test]
    fn test_teaser_used_when_no_trailer_exists() {
        let videos = vec![
            video("YouTube", "Clip", Some(true), "C1"),
            video("YouTube", "Teaser", Some(true), "T1"),
        ];
        assert_eq!(resolve_trailer_key(&videos), Some("T1".to_string()));
    }

    #[test]
    fn test_any_youtube_video_as_last_resort() {
        let videos = vec![
            video("Vimeo", "Trailer", Some(true), "V1"),
            video("YouTube", "Featurette", Some(true), "F1"),
        ];
        assert_eq!(resolve_trailer_key(&videos), Some("F1".to_string()));
    }

    #[test]
    fn test_no_youtube_videos_means_no_trailer() {
        let videos = vec![video("Vimeo", "Trailer", Some(true), "V1")];
        assert_eq!(resolve_trailer_key(&videos), None);
        assert_eq!(resolve_trailer_key(&[]), None);
    }

    #[test]
    fn test_videos_without_keys_never_match() {
        let videos = vec![TmdbVideo {
            key: None,
            site: Some("YouTube".to_string()),
            video_type: Some("Trailer".to_string()),
            official: Some(true),
        }];
        assert_eq!(resolve_trailer_key(&videos), None);
    }

    fn movie_details_json(cast: &[serde_json::Value]) -> String {
        serde_json::json!({
            "id": 603,
            "title": "The Matrix",
            "overview": "A computer hacker learns the truth.",
            "release_date": "1999-03-30",
            "runtime": 136,
            "vote_average": 8.2,
            "vote_count": 24000,
            "genres": [{"id": 28, "name": "Action"}, {"id": 878, "name": "Science Fiction"}],
            "poster_path": "/poster.jpg",
            "backdrop_path": "/backdrop.jpg",
            "tagline": "Free your mind.",
            "status": "Released",
            "budget": 63000000,
            "revenue": 463517383,
            "original_language": "en",
            "production_companies": [{"name": "Warner Bros."}],
            "production_countries": [{"name": "United States of America"}],
            "credits": {"cast": cast, "crew": [
                {"id": 9339, "name": "Lana Wachowski", "job": "Director", "department": "Directing"},
                {"id": 9340, "name": "Lilly Wachowski", "job": "Screenplay", "department": "Writing"}
            ]},
            "videos": {"results": [
                {"key": "m8e-FF8MsqU", "site": "YouTube", "type": "Trailer", "official": true}
            ]},
            "recommendations": {"results": (0..8).map(|i| serde_json::json!({
                "id": 1000 + i,
                "title": format!("Related {}", i),
                "poster_path": "/rec.jpg",
                "vote_average": 7.0
            })).collect::<Vec<_>>()}
        })
        .to_string()
    }

    fn cast_entry(index: i64, with_profile: bool) -> serde_json::Value {
        serde_json::json!({
            "id": index,
            "name": format!("Actor {}", index),
            "character": format!("Role {}", index),
            "profile_path": if with_profile {
                serde_json::json!(format!("/p{}.jpg", index))
            } else {
                serde_json::Value::Null
            }
        })
    }

    #[test]
    fn test_normalize_movie_builds_canonical_shape() {
        let provider = test_provider();
        let cast: Vec<_> = (0..3).map(|i| cast_entry(i, true)).collect();
        let raw: TmdbMovieDetails = serde_json::from_str(&movie_details_json(&cast)).unwrap();
        let videos = raw.videos.results.clone();

        let movie = provider.normalize_movie(raw, &videos);

        assert_eq!(movie.id, 603);
        assert_eq!(movie.release_date, "1999-03-30");
        assert_eq!(movie.release_date_formatted.as_deref(), Some("30-03-1999"));
        assert_eq!(
            movie.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
        assert_eq!(
            movie.backdrop_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/backdrop.jpg")
        );
        assert_eq!(movie.genres.len(), 2);
        assert_eq!(movie.genres[0].name, "Action");
        assert_eq!(movie.directors.len(), 1);
        assert_eq!(movie.directors[0].name, "Lana Wachowski");
        assert_eq!(movie.writers.len(), 1);
        assert_eq!(movie.writers[0].job.as_deref(), Some("Screenplay"));
        assert_eq!(movie.trailer_key.as_deref(), Some("m8e-FF8MsqU"));
        // Related movies are capped at 6 of the 8 supplied
        assert_eq!(movie.recommendations.len(), 6);
        assert_eq!(movie.production_companies, vec!["Warner Bros."]);
    }

    #[test]
    fn test_cast_keeps_ten_members_with_profile_images() {
        let provider = test_provider();
        // 12 entries; entries 3 and 7 lack a profile image
        let cast: Vec<_> = (0..12).map(|i| cast_entry(i, i != 3 && i != 7)).collect();
        let raw: TmdbMovieDetails = serde_json::from_str(&movie_details_json(&cast)).unwrap();

        let movie = provider.normalize_movie(raw, &[]);

        assert_eq!(movie.cast.len(), 10);
        let kept: Vec<i64> = movie.cast.iter().map(|member| member.id).collect();
        assert!(!kept.contains(&3));
        assert!(!kept.contains(&7));
        // Provider order preserved
        assert_eq!(kept, vec![0, 1, 2, 4, 5, 6, 8, 9, 10, 11]);
        assert_eq!(movie.first_cast.as_ref().map(|member| member.id), Some(0));
    }

    #[test]
    fn test_first_cast_is_none_exactly_when_cast_is_empty() {
        let provider = test_provider();
        let cast: Vec<_> = (0..4).map(|i| cast_entry(i, false)).collect();
        let raw: TmdbMovieDetails = serde_json::from_str(&movie_details_json(&cast)).unwrap();

        let movie = provider.normalize_movie(raw, &[]);

        assert!(movie.cast.is_empty());
        assert!(movie.first_cast.is_none());
    }

    #[test]
    fn test_empty_release_date_leaves_formatted_date_absent() {
        let provider = test_provider();
        let raw: TmdbMovieDetails =
            serde_json::from_str(r#"{"id": 1, "title": "Untitled"}"#).unwrap();

        let movie = provider.normalize_movie(raw, &[]);

        assert_eq!(movie.release_date, "");
        assert!(movie.release_date_formatted.is_none());
    }

    #[test]
    fn test_normalize_summary_resolves_genre_ids_on_search_surfaces() {
        let provider = test_provider();
        let item = TmdbMovieListItem {
            id: 603,
            title: "The Matrix".to_string(),
            overview: Some("Hacker".to_string()),
            release_date: Some("1999-03-30".to_string()),
            poster_path: Some("/poster.jpg".to_string()),
            vote_average: Some(8.2),
            original_language: Some("en".to_string()),
            genre_ids: Some(vec![28, 878, 424242]),
            character: None,
        };

        let with_genres = provider.normalize_summary(item.clone(), true);
        assert_eq!(
            with_genres.genres,
            Some(vec!["Action".to_string(), "Science Fiction".to_string()])
        );

        let without = provider.normalize_summary(item, false);
        assert_eq!(without.genres, None);
    }

    #[test]
    fn test_merge_related_dedupes_and_ranks_by_vote_average() {
        let summary = |id: i64, vote: f64| MovieSummary {
            id,
            title: format!("Movie {}", id),
            poster_url: None,
            release_date: String::new(),
            vote_average: vote,
            overview: String::new(),
            original_language: None,
            genres: None,
            character: None,
        };

        let merged = merge_related(
            vec![
                summary(1, 6.0),
                summary(2, 8.5),
                summary(1, 9.9), // duplicate id, first occurrence wins
                summary(3, 7.2),
            ],
            2,
        );

        let ids: Vec<i64> = merged.iter().map(|movie| movie.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_backoff_delay_doubles_from_half_second() {
        assert_eq!(backoff_delay(0), Duration::from_millis(500));
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
    }

    #[test]
    fn test_image_url_absent_path_yields_none() {
        let provider = test_provider();
        assert_eq!(provider.image_url("w500", None), None);
        assert_eq!(
            provider.image_url("w500", Some("/x.jpg")).as_deref(),
            Some("https://image.tmdb.org/t/p/w500/x.jpg")
        );
    }
}
