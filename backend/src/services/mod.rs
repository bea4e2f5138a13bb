//! Business logic services for the Smart Garden app

pub mod assistant;
pub mod dashboard;
pub mod location;
pub mod nurseries;
pub mod store;
pub mod weather;

pub use assistant::PlantAssistant;
pub use dashboard::{build_dashboard, Dashboard};
pub use location::LocationResolver;
pub use nurseries::NurseryFinder;
pub use store::GardenStore;
pub use weather::WeatherService;
