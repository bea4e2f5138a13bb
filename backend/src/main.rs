//! Smart Garden - Backend Server
//!
//! Tracks houseplants, resolves the garden's city, pulls the local weather and
//! turns it into watering, sunlight and weather-alert advice per plant.

use axum::{routing::get, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod external;
mod handlers;
mod routes;
mod services;

pub use config::Config;

use services::{GardenStore, LocationResolver, NurseryFinder, PlantAssistant, WeatherService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<GardenStore>,
    pub locations: LocationResolver,
    pub nurseries: NurseryFinder,
    pub weather: WeatherService,
    pub assistant: PlantAssistant,
}

impl AppState {
    /// Wire up the services described by the configuration
    pub fn from_config(config: Config) -> error::AppResult<Self> {
        let store = Arc::new(
            GardenStore::new(&config.storage.data_dir).with_max_plants(config.storage.max_plants),
        );
        let locations = LocationResolver::from_config(&config.location)?;
        let nurseries = NurseryFinder::from_config(&config.location)?;
        let weather = WeatherService::from_config(&config.weather)?;
        let assistant = PlantAssistant::from_config(&config.ai, store.clone())?;

        Ok(Self {
            config: Arc::new(config),
            store,
            locations,
            nurseries,
            weather,
            assistant,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smart_garden=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::load()?;

    tracing::info!("Starting Smart Garden Server");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("Data directory: {}", config.storage.data_dir);
    if config.weather.api_key.trim().is_empty() {
        tracing::warn!("OPENWEATHER_API_KEY is not set; weather and care advice are disabled");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    // Create application state
    let state = AppState::from_config(config)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_app(state: AppState) -> Router {
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
    "Smart Garden API v1.0"
}
