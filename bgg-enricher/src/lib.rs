//! bgg-enricher library interface
//!
//! Exposes the pipeline services for the binary and for integration testing

pub mod config;
pub mod error;
pub mod services;
pub mod summary;

pub use crate::error::{DocumentParseError, GatewayError, ItemExtractionError};
pub use crate::summary::RunSummary;
