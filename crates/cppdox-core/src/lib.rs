//! cppdox-core: Shared types for the cppdox documentation indexer.

pub mod config;
pub mod database;
pub mod error;
pub mod ids;
pub mod symbols;

pub use config::*;
pub use database::*;
pub use error::*;
pub use ids::*;
pub use symbols::*;
