//! Raw TMDB response shapes
//!
//! Deserialization targets for provider payloads. Normalization into the
//! canonical models happens in the provider client; nothing outside
//! `services::providers` should depend on these.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCompany {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCountry {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub job: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbCredits {
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbVideo {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(rename = "type", default)]
    pub video_type: Option<String>,
    #[serde(default)]
    pub official: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbVideoList {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

/// Entry in any movie list payload (popular, trending, search, discover,
/// person credits, recommendations)
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieListItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genre_ids: Option<Vec<i64>>,
    /// Present on person cast credits only
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieList {
    #[serde(default)]
    pub results: Vec<TmdbMovieListItem>,
}

/// Movie detail with `append_to_response=credits,videos,recommendations`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub revenue: Option<i64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub production_companies: Vec<TmdbCompany>,
    #[serde(default)]
    pub production_countries: Vec<TmdbCountry>,
    #[serde(default)]
    pub credits: TmdbCredits,
    #[serde(default)]
    pub videos: TmdbVideoList,
    #[serde(default)]
    pub recommendations: TmdbMovieList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProfileImage {
    pub file_path: String,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub width: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbImageList {
    #[serde(default)]
    pub profiles: Vec<TmdbProfileImage>,
}

/// Person detail with `append_to_response=images`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPersonDetails {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub deathday: Option<String>,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub gender: Option<i64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub images: TmdbImageList,
}

/// Person movie credits (cast and crew entries share the list item shape)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbPersonCredits {
    #[serde(default)]
    pub cast: Vec<TmdbMovieListItem>,
    #[serde(default)]
    pub crew: Vec<TmdbMovieListItem>,
}
