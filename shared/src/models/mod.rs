//! Domain models for the Smart Garden app

mod care;
mod chat;
mod location;
mod plant;
mod profile;
mod weather;

pub use care::*;
pub use chat::*;
pub use location::*;
pub use plant::*;
pub use profile::*;
pub use weather::*;
