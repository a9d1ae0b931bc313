//! Enrichment pipeline services

pub mod batch_enricher;
pub mod bgg_client;
pub mod data_dump_reader;
pub mod xml_parser;

pub use batch_enricher::{
    BatchEnricher, CheckpointSink, EnrichSettings, EnrichmentReport, JsonCheckpointSink,
};
pub use bgg_client::{BggApiClient, DetailGateway};
pub use data_dump_reader::DataDumpReader;
pub use xml_parser::{PayloadParser, XmlPayloadParser};
