//! HTTP request handlers

pub mod assistant;
pub mod dashboard;
pub mod health;
pub mod location;
pub mod plants;
pub mod profile;
pub mod weather;

pub use assistant::*;
pub use dashboard::*;
pub use health::*;
pub use location::*;
pub use plants::*;
pub use profile::*;
pub use weather::*;
