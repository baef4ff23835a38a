use serde::{Deserialize, Serialize};

/// Profile image attached to an actor detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileImage {
    pub url: String,
    pub aspect_ratio: f64,
    pub height: i64,
    pub width: i64,
}

/// Canonical actor detail, provider-independent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub biography: String,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_url: Option<String>,
    pub known_for_department: Option<String>,
    pub gender: Option<i64>,
    pub popularity: Option<f64>,
    /// At most 10 additional profile images
    pub images: Vec<ProfileImage>,
}
