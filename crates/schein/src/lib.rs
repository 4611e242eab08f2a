//! Pass/fail evaluation of university course certificates ("Scheine").

pub mod config;
pub mod error;
pub mod model;
pub mod scheincriteria;
pub mod telemetry;

pub use error::AppError;
