use std::collections::BTreeMap;

use serde::Serialize;

/// Attributes read back from a stored object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub filename: String,
    pub size: i64,
    pub content_type: String,
    pub owner_id: String,
}

/// A capability URL plus the headers the client must replay with it.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    pub url: String,
    pub headers: BTreeMap<String, String>,
}

pub fn object_key(owner_id: &str, file_id: &str) -> String {
    format!("{owner_id}/{file_id}")
}
