//! Route definitions for the cold storage inventory server

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - reception drafts
        .nest("/receptions/drafts", draft_routes())
        // Protected routes - stored pallets
        .nest("/pallets", pallet_routes())
        // Protected routes - order candidates
        .nest("/orders", order_routes())
        // Protected routes - storage positions
        .nest("/positions", position_routes())
        // Protected routes - store summaries
        .nest("/stores", store_routes())
}

/// Reception draft routes (protected)
fn draft_routes() -> Router<AppState> {
    use handlers::intake::*;

    Router::new()
        .route("/", post(create_draft))
        .route("/:draft_id", get(get_draft).delete(delete_draft))
        .route("/:draft_id/header", put(update_header))
        .route("/:draft_id/mode", post(request_mode))
        .route("/:draft_id/mode/confirm", post(confirm_mode))
        .route("/:draft_id/mode/cancel", post(cancel_mode))
        .route("/:draft_id/lines", post(add_line))
        .route(
            "/:draft_id/lines/:index",
            put(update_line).delete(remove_line),
        )
        .route("/:draft_id/pallets", post(add_pallet))
        .route("/:draft_id/pallets/:index", delete(remove_pallet))
        .route("/:draft_id/pallets/:index/clone", post(clone_pallet))
        .route("/:draft_id/pallets/:index/boxes", post(add_box))
        .route("/:draft_id/pallets/:index/boxes/split", post(split_boxes))
        .route(
            "/:draft_id/pallets/:index/boxes/:box_id",
            put(edit_box).delete(delete_box),
        )
        .route(
            "/:draft_id/pallets/:index/boxes/:box_id/duplicate",
            post(duplicate_box),
        )
        .route("/:draft_id/prices", put(set_price))
        .route("/:draft_id/totals", get(get_totals))
        .route("/:draft_id/submit", post(submit))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stored pallet routes (protected)
fn pallet_routes() -> Router<AppState> {
    use handlers::pallets::*;

    Router::new()
        .route("/link", post(link_batch))
        .route("/unlink", post(unlink_batch))
        .route("/:pallet_id/availability", get(get_availability))
        .route("/:pallet_id/boxes", post(add_box))
        .route(
            "/:pallet_id/boxes/:box_id",
            put(edit_box).delete(delete_box),
        )
        .route("/:pallet_id/link", post(link))
        .route("/:pallet_id/unlink", post(unlink))
        .route(
            "/:pallet_id/position",
            delete(handlers::positions::unassign_pallet),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Order routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:order_id/available-pallets",
            get(handlers::pallets::available_for_order),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Position routes (protected)
fn position_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/:position_id/pallets",
            post(handlers::positions::assign_pallets),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Store summary routes (protected)
fn store_routes() -> Router<AppState> {
    use handlers::positions::*;

    Router::new()
        .route("/:store_id/species-summary", get(species_summary))
        .route("/:store_id/occupancy", get(occupancy))
        .route_layer(middleware::from_fn(auth_middleware))
}
