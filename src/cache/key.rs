use std::fmt::Display;

use sha1::{Digest, Sha1};

use crate::models::BlendMode;

/// Cache key built from a fixed per-entity namespace plus canonicalized
/// parameters
///
/// Rendered keys never contain raw free-text: parameterized provider
/// requests carry a digest of the sorted parameter list instead, so two call
/// sites passing the same parameters in different order share an entry and
/// unrelated queries cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Raw provider response for one logical call
    ProviderRequest {
        endpoint: String,
        params: Vec<(String, String)>,
    },
    /// Normalized movie detail
    MovieDetail(i64),
    /// Normalized actor detail
    ActorDetail(i64),
    /// Normalized filmography list
    ActorFilmography(i64),
    /// Final recommendation list for one user
    Recommendations {
        user_id: i64,
        limit: usize,
        mode: BlendMode,
    },
    /// Fully hydrated watchlist for one user
    WatchlistDetails(i64),
}

impl CacheKey {
    /// Prefix matching every recommendation entry of one user, any limit or
    /// blend mode
    ///
    /// Watchlist and viewed-movie mutations delete by this prefix, which is
    /// what keeps both the recommendations surface and the home feed from
    /// serving stale results after a history change.
    pub fn recommendations_prefix(user_id: i64) -> String {
        format!("rec:{}:", user_id)
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::ProviderRequest { endpoint, params } => {
                write!(f, "tmdb:req:{}:{}", endpoint, params_digest(params))
            }
            CacheKey::MovieDetail(id) => write!(f, "tmdb:movie:{}", id),
            CacheKey::ActorDetail(id) => write!(f, "tmdb:actor:{}", id),
            CacheKey::ActorFilmography(id) => write!(f, "tmdb:actor:{}:films", id),
            CacheKey::Recommendations {
                user_id,
                limit,
                mode,
            } => write!(f, "rec:{}:{}:{}", user_id, mode.as_str(), limit),
            CacheKey::WatchlistDetails(user_id) => write!(f, "watchlist:{}:details", user_id),
        }
    }
}

/// Stable digest of a sorted parameter list
fn params_digest(params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut hasher = Sha1::new();
    for (name, value) in sorted {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update(b"&");
    }

    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_param_order_does_not_change_the_key() {
        let a = CacheKey::ProviderRequest {
            endpoint: "search/movie".to_string(),
            params: params(&[("query", "matrix"), ("page", "1")]),
        };
        let b = CacheKey::ProviderRequest {
            endpoint: "search/movie".to_string(),
            params: params(&[("page", "1"), ("query", "matrix")]),
        };

        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_different_params_produce_different_keys() {
        let a = CacheKey::ProviderRequest {
            endpoint: "search/movie".to_string(),
            params: params(&[("query", "matrix"), ("page", "1")]),
        };
        let b = CacheKey::ProviderRequest {
            endpoint: "search/movie".to_string(),
            params: params(&[("query", "matrix"), ("page", "2")]),
        };

        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_free_text_never_appears_in_rendered_key() {
        let key = CacheKey::ProviderRequest {
            endpoint: "search/movie".to_string(),
            params: params(&[("query", "the matrix reloaded")]),
        };

        assert!(!key.to_string().contains("the matrix reloaded"));
    }

    #[test]
    fn test_entity_key_namespaces() {
        assert_eq!(CacheKey::MovieDetail(603).to_string(), "tmdb:movie:603");
        assert_eq!(CacheKey::ActorDetail(6384).to_string(), "tmdb:actor:6384");
        assert_eq!(
            CacheKey::ActorFilmography(6384).to_string(),
            "tmdb:actor:6384:films"
        );
        assert_eq!(
            CacheKey::WatchlistDetails(7).to_string(),
            "watchlist:7:details"
        );
    }

    #[test]
    fn test_recommendation_keys_match_their_invalidation_prefix() {
        for mode in [BlendMode::RoundRobin, BlendMode::FlatAccumulate] {
            let key = CacheKey::Recommendations {
                user_id: 42,
                limit: 20,
                mode,
            };
            assert!(key
                .to_string()
                .starts_with(&CacheKey::recommendations_prefix(42)));
        }
        assert!(!CacheKey::Recommendations {
            user_id: 421,
            limit: 20,
            mode: BlendMode::RoundRobin,
        }
        .to_string()
        .starts_with(&CacheKey::recommendations_prefix(42)));
    }
}
