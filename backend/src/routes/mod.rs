//! Route definitions for the Smart Garden API

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Largest accepted photo upload
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/weather", get(handlers::get_weather))
        .route("/care-tips/:species", get(handlers::get_care_tips))
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .nest("/location", location_routes())
        .nest("/plants", plant_routes())
        .nest("/assistant", assistant_routes())
}

/// Location routes
fn location_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_location).put(handlers::set_location),
        )
        .route("/detect", post(handlers::detect_location))
        .route("/nurseries", get(handlers::find_nurseries))
}

/// Plant management routes
fn plant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_plants).post(handlers::create_plant))
        .route(
            "/:plant_id",
            get(handlers::get_plant)
                .put(handlers::update_plant)
                .delete(handlers::delete_plant),
        )
        .route("/:plant_id/water", post(handlers::water_plant))
        .route("/:plant_id/care", get(handlers::get_plant_care))
}

/// AI botanist routes
fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/identify", post(handlers::identify_plant))
        .route("/diagnose", post(handlers::diagnose_plant))
        .route("/chat", post(handlers::chat))
        .route("/chat/history", get(handlers::chat_history))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
