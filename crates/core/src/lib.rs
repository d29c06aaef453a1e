//! Domain core for the mediashelf catalog.
//!
//! Holds everything that does not know about HTTP or a concrete database:
//! the error taxonomy, the entity capability trait, the position ordering
//! mechanism, the storage port, the cache regions and the generic
//! [`service::CatalogService`] that ties them together.

pub mod cache;
pub mod entity;
pub mod error;
pub mod ordering;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;
