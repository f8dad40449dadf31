//! Configuration management for the gateway

mod loader;
mod schema;

pub use loader::ConfigLoader;
pub use schema::*;
