//! YAML configuration: reference catalogs and parser settings

pub mod loader;
pub mod types;

pub use loader::CatalogLoader;
pub use types::{Catalogs, ParserOptions, Settings, DEFAULT_STAKE_MULTIPLIER};
