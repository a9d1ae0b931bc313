//! # BGG Common Library
//!
//! Shared code for the BGG data fetcher including:
//! - Catalog record models
//! - Configuration loading
//! - JSON persistence of record lists
//! - Append-only error journal
//! - Utility functions

pub mod config;
pub mod error;
pub mod error_journal;
pub mod human_time;
pub mod models;
pub mod persistence;

pub use error::{Error, Result};
pub use error_journal::ErrorJournal;
pub use models::{BasicRecord, DetailedRecord, PlayerCountRecommendation};
