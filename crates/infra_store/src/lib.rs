//! Infrastructure Store Layer
//!
//! This crate provides the data source the pricing engine reads through its
//! ports. The engine treats persistence as an external collaborator, so the
//! adapter here serves an immutable, validated snapshot of reference data.
//!
//! # Snapshot
//!
//! A `PricingSnapshot` is a serde document listing items, price records,
//! employees, conditions, groups, discounts and usage records. Loading
//! validates it for duplicate ids and dangling item references before the
//! `InMemoryStore` indexes it.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::InMemoryStore;
//! use domain_pricing::PricingService;
//!
//! let store = InMemoryStore::from_path("snapshot.json")?;
//! let service = PricingService::new(&store);
//! ```

pub mod error;
pub mod snapshot;
pub mod memory;

pub use error::StoreError;
pub use snapshot::PricingSnapshot;
pub use memory::InMemoryStore;
