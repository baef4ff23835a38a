use serde::{Deserialize, Serialize};

use crate::models::MovieSummary;

/// How per-actor candidate queues are combined into one list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// One candidate at a time from each active actor in a fixed rotation
    /// (dedicated recommendations surface)
    RoundRobin,
    /// Each actor's capped queue appended whole, then one global sort by
    /// release date (home surface)
    FlatAccumulate,
}

impl BlendMode {
    /// Stable token used in cache keys
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendMode::RoundRobin => "round_robin",
            BlendMode::FlatAccumulate => "flat",
        }
    }
}

/// Where the result's candidates came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Actor-based blending over the user's history
    Cast,
    /// Popularity list, used when the user has no history
    Popular,
}

/// Final recommendation list for one user
///
/// Holds at most the requested number of movies, free of duplicates, of the
/// user's own history, and of unreleased entries. `degraded` is set only
/// when even the popularity fallback was unavailable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub movies: Vec<MovieSummary>,
    pub source: RecommendationSource,
    pub degraded: bool,
}
