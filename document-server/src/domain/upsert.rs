use super::document::Document;
use super::identity::{is_absent, same_identity};

/// Result of applying a document to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(String),
    Updated(String),
}

impl UpsertOutcome {
    pub fn is_insert(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }

    /// Message returned to the client.
    pub fn message(&self) -> String {
        match self {
            UpsertOutcome::Inserted(file_name) => format!("Added: {}", file_name),
            UpsertOutcome::Updated(file_name) => format!("Updated: {}", file_name),
        }
    }
}

/// Replacement rule for a single element: the incoming value wins on an id
/// match, anything else passes through unchanged.
pub fn reconcile(incoming: &Document, existing: Document) -> Document {
    if same_identity(incoming, &existing) {
        incoming.clone()
    } else {
        existing
    }
}

/// Insert `incoming` or replace every element that shares its id.
///
/// New documents are appended so prior entries keep their order. Duplicate ids
/// already present in the collection are all rewritten, not just the first.
pub fn upsert(incoming: Document, collection: &mut Vec<Document>) -> UpsertOutcome {
    if is_absent(&incoming, collection) {
        let outcome = UpsertOutcome::Inserted(incoming.file_name.clone());
        collection.push(incoming);
        return outcome;
    }

    for slot in collection.iter_mut() {
        *slot = reconcile(&incoming, std::mem::take(slot));
    }
    UpsertOutcome::Updated(incoming.file_name)
}
