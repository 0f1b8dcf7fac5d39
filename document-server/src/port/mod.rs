//! Port layer - Abstract interfaces for infrastructure dependencies
//!
//! The application layer depends on these traits only, so storage backends
//! can be swapped without touching the upsert logic.

pub mod persistence;

pub use persistence::DocumentSink;
