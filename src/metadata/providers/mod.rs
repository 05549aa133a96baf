//! Concrete source clients for the upstream metadata providers.

pub mod omdb;
pub mod rpdb;
pub mod tmdb;

pub use omdb::OmdbClient;
pub use rpdb::RpdbClient;
pub use tmdb::TmdbClient;
