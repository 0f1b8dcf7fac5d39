pub mod application_service;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod port;
pub mod presentation;
pub mod server;

#[cfg(test)]
pub mod test_utils;

pub use domain::*;
pub use port::*;

pub use application_service::document_service::{DocumentService, DocumentServiceError};
pub use config::ServerConfig;
pub use server::DocumentServer;
