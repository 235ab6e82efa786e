//! Shared types for filmradar.
//!
//! Contains the common error type, typed ID wrappers, and core enums used
//! by both the storage layer and the aggregation pipeline.

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::{EpisodeId, MovieId};
pub use types::MediaKind;
