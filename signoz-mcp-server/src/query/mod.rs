//! Query construction
//!
//! Time and step parsing, sub-query naming, payload assembly, the APM
//! metric templates and dashboard resolution.

pub mod apm;
pub mod builder;
pub mod dashboard;
pub mod letters;
mod resolved;
pub mod step;
pub mod time;

pub use resolved::Resolved;
