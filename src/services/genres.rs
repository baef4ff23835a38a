//! Static movie genre vocabulary
//!
//! The provider's genre ids are stable, so the mapping ships as a
//! process-wide constant instead of being fetched.

/// The 19 movie genres, id ↔ name
const GENRES: [(i64, &str); 19] = [
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Resolves a genre name to its id; unknown names yield `None`
pub fn genre_id(name: &str) -> Option<i64> {
    GENRES
        .iter()
        .find(|(_, genre_name)| *genre_name == name)
        .map(|(id, _)| *id)
}

/// Resolves a genre id to its name; unknown ids yield `None`
pub fn genre_name(id: i64) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}
