pub mod analysis;
pub mod config;
pub mod describer;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod schema;
pub mod sql;
pub mod warehouse;
