//! REST API over the registries and the occupancy ledger.

mod error;
mod ledger;
mod plants;
mod pots;
mod soils;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use plant_tracker_core::Database;

pub use error::{ApiError, ApiResult};

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/api/health", get(health))
        // Plants
        .route(
            "/api/plants",
            get(plants::list_plants).post(plants::create_plant),
        )
        .route(
            "/api/plants/{id}",
            get(plants::get_plant)
                .put(plants::update_plant)
                .delete(plants::remove_plant),
        )
        // Pots: reads are keyed by QR code, writes by id
        .route("/api/pots", get(pots::list_pots).post(pots::create_pot))
        .route(
            "/api/pots/{key}",
            get(pots::get_pot_by_qr)
                .put(pots::update_pot)
                .delete(pots::deactivate_pot),
        )
        .route("/api/pots/{key}/history", get(pots::get_pot_history))
        // Soils
        .route("/api/soils", get(soils::list_soils).post(soils::create_soil))
        .route(
            "/api/soils/{id}",
            get(soils::get_soil)
                .put(soils::update_soil)
                .delete(soils::delete_soil),
        )
        // Occupancy ledger
        .route("/api/move", post(ledger::move_plant))
        .route("/api/history/{plant_id}", get(ledger::get_plant_history))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(db)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
