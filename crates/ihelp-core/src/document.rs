use serde::{Deserialize, Serialize};

/// A document the backend can answer questions about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub id: String,
    pub title: Option<String>,
    pub metadata: Option<DocumentMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_type: Option<String>,
    pub size: Option<u64>,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            metadata: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_metadata(mut self, metadata: DocumentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// Short metadata line for the picker, e.g. "pdf, 12.0 KB"
    pub fn summary(&self) -> String {
        let Some(meta) = &self.metadata else {
            return String::new();
        };

        let mut parts = Vec::new();
        if let Some(file_type) = &meta.file_type {
            parts.push(file_type.clone());
        }
        if let Some(size) = meta.size {
            parts.push(format_size(size));
        }
        parts.join(", ")
    }
}

/// Format a byte count for humans
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_falls_back_to_id() {
        let doc = DocumentRef::new("doc123");
        assert_eq!(doc.display_title(), "doc123");

        let doc = doc.with_title("Quarterly Report");
        assert_eq!(doc.display_title(), "Quarterly Report");
    }

    #[test]
    fn test_summary() {
        let doc = DocumentRef::new("a");
        assert_eq!(doc.summary(), "");

        let doc = DocumentRef::new("b").with_metadata(DocumentMetadata {
            file_type: Some("pdf".to_string()),
            size: Some(12 * 1024),
        });
        assert_eq!(doc.summary(), "pdf, 12.0 KB");

        let doc = DocumentRef::new("c").with_metadata(DocumentMetadata {
            file_type: None,
            size: Some(300),
        });
        assert_eq!(doc.summary(), "300 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
