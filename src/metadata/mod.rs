//! Metadata provider system for enriching harvested records.
//!
//! This module defines the [`MetadataProvider`] trait and the enrichment
//! merge logic layered on top of it.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - [`providers`] -- Concrete provider implementations (TMDB).
//! - [`enrichment`] -- Merges provider lookups into harvested records.

pub mod enrichment;
pub mod provider;
pub mod providers;

pub use enrichment::Enricher;
pub use provider::{select_hit, MetadataProvider, SearchHit, TitleDetails};
pub use providers::TmdbProvider;
