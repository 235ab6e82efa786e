//! Typed ID wrappers for type safety across filmradar.
//!
//! Newtype wrappers around UUIDs so a `MovieId` can never be passed where an
//! `EpisodeId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a catalog movie or series row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(Uuid);

impl MovieId {
    /// Generate a new random movie ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MovieId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for MovieId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<MovieId> for Uuid {
    fn from(id: MovieId) -> Self {
        id.0
    }
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MovieId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Unique identifier for an episode row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(Uuid);

impl EpisodeId {
    /// Generate a new random episode ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for EpisodeId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<EpisodeId> for Uuid {
    fn from(id: EpisodeId) -> Self {
        id.0
    }
}

impl std::fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(MovieId::new(), MovieId::new());
        assert_ne!(EpisodeId::new(), EpisodeId::new());
    }

    #[test]
    fn movie_id_round_trips_through_string() {
        let id = MovieId::new();
        let parsed: MovieId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn serde_transparent() {
        let id = MovieId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
