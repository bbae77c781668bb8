//! Shared types and consolidation logic for cold-storage inventory
//!
//! This crate contains the pure core used by the backend and, via WASM, by
//! the browser: reception entry, pallet aggregates, price synchronization,
//! availability, placement and order linking. It performs no I/O.

pub mod availability;
pub mod error;
pub mod ids;
pub mod linking;
pub mod models;
pub mod pallet_stats;
pub mod placement;
pub mod pricing;
pub mod reception;
pub mod types;
pub mod validation;
pub mod weight;

pub use availability::*;
pub use error::*;
pub use ids::*;
pub use linking::*;
pub use models::*;
pub use placement::*;
pub use pricing::*;
pub use reception::*;
pub use types::*;
pub use validation::*;
pub use weight::*;
