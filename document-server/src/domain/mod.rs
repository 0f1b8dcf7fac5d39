pub mod credential;
pub mod document;
pub mod identity;
pub mod upsert;

pub use credential::SharedSecret;
pub use document::{Document, DocumentMetadata};
pub use identity::{is_absent, same_identity};
pub use upsert::{reconcile, upsert, UpsertOutcome};
