pub mod batch_writer;
pub mod deduplicator;
pub mod exporter;
pub mod import_parser;
pub mod transfer_service;

pub use import_parser::ImportFile;
pub use transfer_service::TransferService;
