//! Shared types and models for the Smart Garden app
//!
//! This crate contains the domain model and the pure plant-care decision
//! logic shared between the backend server and the browser (via WASM).

pub mod advice;
pub mod care;
pub mod models;
pub mod types;
pub mod validation;

pub use advice::*;
pub use care::*;
pub use models::*;
pub use types::*;
pub use validation::*;
