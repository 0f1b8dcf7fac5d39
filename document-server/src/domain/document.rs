use serde::{Deserialize, Serialize};

/// A stored document.
///
/// Only `id`, `file_name` and `content` take part in the upsert logic. The
/// remaining fields are descriptive metadata that is carried through
/// untouched; they default when absent so older collections still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub time_created: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub time_updated: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_synced: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subtitle: String,
    #[serde(
        rename = "abstract",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub belongs_to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub doc_type: String,
    pub content: String,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Document {
    /// Create a document with empty metadata.
    pub fn new(
        id: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            id: self.id.clone(),
            file_name: self.file_name.clone(),
            author: self.author.clone(),
            time_created: self.time_created,
            time_updated: self.time_updated,
            time_synced: self.time_synced,
            tags: self.tags.clone(),
            categories: self.categories.clone(),
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            summary: self.summary.clone(),
            belongs_to: self.belongs_to.clone(),
            doc_type: self.doc_type.clone(),
        }
    }
}

/// Everything about a document except its content payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub id: String,
    pub file_name: String,
    pub author: String,
    pub time_created: u64,
    pub time_updated: u64,
    pub time_synced: Option<u64>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub title: String,
    pub subtitle: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    pub belongs_to: String,
    pub doc_type: String,
}
