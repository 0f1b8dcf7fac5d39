//! Persistence implementations for the document collection.
//!
//! Both sinks store the full collection on every write.

pub mod json_file_document_sink;
pub mod sled_document_sink;

pub use json_file_document_sink::JsonFileDocumentSink;
pub use sled_document_sink::SledDocumentSink;
