use serde::{Deserialize, Serialize};

/// A genre tag on a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Cast member retained on a movie detail
///
/// Only cast members with a profile image survive normalization, so
/// `profile_url` is always present here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub id: i64,
    pub name: String,
    pub character: String,
    pub profile_url: String,
}

/// Director or writer credit derived from the crew list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrewCredit {
    pub id: i64,
    pub name: String,
    pub job: Option<String>,
    pub profile_url: Option<String>,
}

/// Provider-supplied related movie embedded in a movie detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelatedMovie {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub vote_average: f64,
}

/// Canonical movie detail, provider-independent
///
/// An ephemeral projection recomputed from provider responses on cache miss;
/// never mutated in place, only replaced wholesale on refetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: String,
    /// ISO `YYYY-MM-DD`, empty when the provider has no date
    pub release_date: String,
    /// `DD-MM-YYYY` display form, present only when `release_date` parses
    pub release_date_formatted: Option<String>,
    pub runtime: i64,
    pub vote_average: f64,
    pub vote_count: i64,
    pub genres: Vec<Genre>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub tagline: String,
    pub status: String,
    pub budget: i64,
    pub revenue: i64,
    pub original_language: String,
    pub production_companies: Vec<String>,
    pub production_countries: Vec<String>,
    /// At most 10 entries, provider order, profile image guaranteed
    pub cast: Vec<CastMember>,
    /// `cast[0]`; `None` exactly when `cast` is empty
    pub first_cast: Option<CastMember>,
    pub directors: Vec<CrewCredit>,
    pub writers: Vec<CrewCredit>,
    pub trailer_key: Option<String>,
    /// At most 6 provider-supplied related movies
    pub recommendations: Vec<RelatedMovie>,
}

/// List-shaped subset of a movie, used for search results, popularity and
/// trending lists, filmography entries, and blended recommendations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    /// Genre names, resolved from ids on search surfaces only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    /// Character played, set on filmography entries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}
