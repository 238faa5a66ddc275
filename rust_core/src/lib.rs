//! Fantasy Core - league data, name matching and score aggregation.
//!
//! This module provides:
//! - Shared league models (metadata, standings, scores, rosters)
//! - Injected lookup tables for teams, positions and lineup slots
//! - Fuzzy player/team name resolution
//! - A single-flight TTL cache for league metadata
//! - Weekly trophies and close-game detection
//! - The league data provider trait with an ESPN implementation

pub mod aggregator;
pub mod clients;
pub mod clock;
pub mod error;
pub mod league_config;
pub mod matching;
pub mod metadata_cache;
pub mod models;
pub mod providers;

pub use clock::{Clock, SystemClock};
pub use error::{ReportError, SourceError};
pub use league_config::LeagueConfig;
pub use matching::NameResolver;
pub use metadata_cache::MetadataCache;
pub use providers::LeagueDataProvider;
