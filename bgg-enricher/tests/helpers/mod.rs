//! Test Helper Utilities
//!
//! In-memory collaborators for exercising the batch enricher without network
//! or sleeps.

#![allow(dead_code)]

pub mod fakes;

pub use fakes::{
    basic_records, fast_settings, thing_xml, FailingSink, RecordingSink, ScriptedGateway,
    MALFORMED_XML,
};
