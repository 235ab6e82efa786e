//! Core type definitions for catalog records.
//!
//! Defines the `MediaKind` enum used throughout filmradar to distinguish
//! movies from series. Serialized in lowercase, matching the values stored
//! in the `movies.kind` column and exchanged with API clients.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// A single movie.
    Movie,
    /// A TV series with episodes.
    Series,
}

impl MediaKind {
    /// Recency window, in days, within which a record counts as "fresh":
    /// 7 days for movies, 3 days for series.
    pub fn fresh_window_days(self) -> i64 {
        match self {
            Self::Movie => 7,
            Self::Series => 3,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "series" => Ok(Self::Series),
            other => Err(crate::Error::invalid_input(format!(
                "Unknown media kind: {other}"
            ))),
        }
    }
}
