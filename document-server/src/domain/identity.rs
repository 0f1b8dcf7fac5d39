use super::document::Document;

/// Two documents are the same logical document when their ids are equal.
///
/// Comparison is exact: no case folding, no trimming.
pub fn same_identity(a: &Document, b: &Document) -> bool {
    a.id == b.id
}

/// Returns true when no document in `collection` shares `candidate`'s id.
///
/// Linear scan; the collection is expected to stay small.
pub fn is_absent(candidate: &Document, collection: &[Document]) -> bool {
    !collection.iter().any(|doc| same_identity(doc, candidate))
}
