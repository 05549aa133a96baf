//! Metadata resolution pipeline.
//!
//! Fetches per-title metadata from the upstream providers, merges it under a
//! fixed precedence policy, and assembles whole catalogs with caching.
//!
//! # Module layout
//!
//! - [`types`] -- Normalized output record and per-source partial records.
//! - [`sources`] -- Trait seams between the resolver and the source clients.
//! - [`providers`] -- Concrete clients (TMDB, OMDb, RPDB).
//! - [`probe`] -- HEAD-based image existence probe.
//! - [`resolver`] -- Per-item concurrent fetch and precedence merge.
//! - [`service`] -- Catalog assembly, caching, and the public surface.

pub mod probe;
pub mod providers;
pub mod resolver;
pub mod service;
pub mod sources;
pub mod types;

pub use probe::HeadImageProbe;
pub use providers::{OmdbClient, RpdbClient, TmdbClient};
pub use resolver::ItemResolver;
pub use service::CatalogService;
pub use sources::{DetailsProvider, EnrichmentProvider, ImageProbe, RatingsProvider};
pub use types::CatalogMeta;
