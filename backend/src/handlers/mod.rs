//! HTTP handlers

pub mod health;
pub mod intake;
pub mod pallets;
pub mod positions;

pub use health::health_check;
