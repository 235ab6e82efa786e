//! Query modules for the filmradar catalog tables.

pub mod episodes;
pub mod movies;
