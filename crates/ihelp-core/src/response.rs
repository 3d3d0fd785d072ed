//! Parsing of backend response bodies
//!
//! The backend is loose about field names, so each fallback chain lives in
//! its own function and reports `MissingField` instead of guessing.

use serde_json::Value;
use tracing::debug;

use crate::document::{DocumentMetadata, DocumentRef};

/// Shown when the backend answers successfully but without any reply text
pub const EMPTY_REPLY: &str = "Sorry, I received an empty response.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("expected field missing from backend response")]
pub struct MissingField;

/// Reply text from `response`, then `message`
pub fn parse_reply(body: &Value) -> Result<String, MissingField> {
    non_empty_str(body, "response")
        .or_else(|| non_empty_str(body, "message"))
        .map(str::to_string)
        .ok_or(MissingField)
}

/// Server-supplied error text from `error`
pub fn parse_error(body: &Value) -> Result<String, MissingField> {
    non_empty_str(body, "error")
        .map(str::to_string)
        .ok_or(MissingField)
}

/// A single entry of the documents list. `document_id` is required.
pub fn parse_document(entry: &Value) -> Result<DocumentRef, MissingField> {
    let id = match entry.get("document_id") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(MissingField),
    };

    let title = non_empty_str(entry, "title")
        .or_else(|| non_empty_str(entry, "name"))
        .map(str::to_string);

    let metadata = entry.get("metadata").and_then(parse_metadata);

    Ok(DocumentRef { id, title, metadata })
}

/// The `documents` array; entries without an id are skipped
pub fn parse_documents(body: &Value) -> Result<Vec<DocumentRef>, MissingField> {
    let entries = body
        .get("documents")
        .and_then(Value::as_array)
        .ok_or(MissingField)?;

    let documents = entries
        .iter()
        .filter_map(|entry| match parse_document(entry) {
            Ok(doc) => Some(doc),
            Err(_) => {
                debug!(?entry, "skipping document without document_id");
                None
            }
        })
        .collect();

    Ok(documents)
}

fn parse_metadata(value: &Value) -> Option<DocumentMetadata> {
    if !value.is_object() {
        return None;
    }

    let file_type = non_empty_str(value, "file_type").map(str::to_string);
    let size = match value.get("size") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };

    Some(DocumentMetadata { file_type, size })
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
