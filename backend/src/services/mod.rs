//! Business logic services for the cold-storage consolidation server

pub mod in_flight;
pub mod intake;
pub mod pallets;
pub mod placement;

pub use in_flight::InFlight;
pub use intake::IntakeService;
pub use pallets::PalletService;
pub use placement::PlacementService;
