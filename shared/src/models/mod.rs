//! Domain models for cold-storage inventory

mod pallet;
mod product;
mod reception;
mod store;

pub use pallet::*;
pub use product::*;
pub use reception::*;
pub use store::*;
