use serde::{Deserialize, Serialize};

/// A retrieved document snippet cited by the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceChunk {
    /// Document source identifier (usually a URI)
    pub source: String,
    /// Human readable title, when the indexer found one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Snippet text
    pub text: String,
    /// Retrieval similarity score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SourceChunk {
    /// Label used when listing the source: the title if present, else the source id.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_chunk_optional_fields() {
        let json = r#"{"source":"s3://docs/a.pdf","text":"snippet"}"#;
        let chunk: SourceChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.source, "s3://docs/a.pdf");
        assert!(chunk.title.is_none());
        assert!(chunk.score.is_none());
        assert_eq!(chunk.label(), "s3://docs/a.pdf");
    }

    #[test]
    fn test_source_chunk_label_prefers_title() {
        let chunk = SourceChunk {
            source: "s3://docs/a.pdf".to_string(),
            title: Some("Annual report".to_string()),
            text: String::new(),
            score: Some(0.82),
        };
        assert_eq!(chunk.label(), "Annual report");
    }

    #[test]
    fn test_source_chunk_skips_none_on_serialize() {
        let chunk = SourceChunk {
            source: "doc".to_string(),
            title: None,
            text: "t".to_string(),
            score: None,
        };
        let json = serde_json::to_string(&chunk).unwrap();
        assert_eq!(json, r#"{"source":"doc","text":"t"}"#);
    }
}
