//! Cold storage inventory server
//!
//! Turns raw-material receptions into palletized stock, keeps pallet
//! aggregates consistent while boxes change, places pallets at storage
//! positions and links them to outgoing orders. Persistence is delegated to
//! a remote inventory API; this server holds only in-progress reception
//! drafts.

use axum::{routing::get, Router};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use external::InventoryApi;
use services::intake::DraftStore;
use services::{InFlight, IntakeService, PalletService, PlacementService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn InventoryApi>,
    pub drafts: DraftStore,
    pub in_flight: InFlight,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn InventoryApi>) -> Self {
        Self {
            api,
            drafts: Arc::new(RwLock::new(HashMap::new())),
            in_flight: InFlight::new(),
            config: Arc::new(config),
        }
    }

    pub fn intake(&self) -> IntakeService {
        IntakeService::new(
            self.api.clone(),
            self.drafts.clone(),
            self.in_flight.clone(),
            self.config.intake.clone(),
        )
    }

    pub fn pallets(&self) -> PalletService {
        PalletService::new(self.api.clone(), self.in_flight.clone())
    }

    pub fn placement(&self) -> PlacementService {
        PlacementService::new(self.api.clone(), self.in_flight.clone())
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Cold Storage Inventory API v1"
}
