//! Actor-driven movie recommendation core.
//!
//! Blends actor-co-occurrence candidates derived from a user's viewing
//! history and watchlist with popularity fallbacks, sourcing all movie and
//! person facts from a rate-limited external metadata provider behind a
//! retrying, caching client.
//!
//! The crate exposes no network listener; web layers and batch tooling are
//! external callers of [`services::recommendations::RecommendationEngine`]
//! and the [`services::providers::MetadataProvider`] operations.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
