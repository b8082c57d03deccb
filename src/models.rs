//! Data models shared by the pipelines and the chat orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Which processing pipeline a document went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineType {
    Baseline,
    Enhanced,
}

impl std::fmt::Display for PipelineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineType::Baseline => write!(f, "baseline"),
            PipelineType::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// Lifecycle of a document in the corpus.
///
/// `Complete` is reached once the indexing attempt finishes, even when some
/// per-chunk writes failed; `Failed` only on an unhandled collaborator error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Uploaded,
    Processing,
    Complete,
    Failed,
}

/// A document in the corpus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Document {
    pub filename: String,
    #[serde(default)]
    pub document_url: String,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProcessSummary>,
}

impl Document {
    pub fn new(filename: impl Into<String>, document_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            document_url: document_url.into(),
            status: DocumentStatus::Uploaded,
            uploaded_at: Utc::now(),
            summary: None,
        }
    }

    pub fn mark_processing(&mut self) {
        self.status = DocumentStatus::Processing;
    }

    pub fn mark_complete(&mut self, summary: ProcessSummary) {
        self.status = DocumentStatus::Complete;
        self.summary = Some(summary);
    }

    pub fn mark_failed(&mut self) {
        self.status = DocumentStatus::Failed;
    }
}

/// Result of processing one document through a pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub document_id: String,
    pub chunks: usize,
    pub indexed: usize,
    pub text_length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ProcessSummary {
    /// Summary for a document that yielded no extractable text.
    pub fn empty(document_id: impl Into<String>, metadata: Option<Map<String, Value>>) -> Self {
        Self {
            document_id: document_id.into(),
            chunks: 0,
            indexed: 0,
            text_length: 0,
            metadata,
        }
    }
}

/// Terminal state of a corpus-wide pipeline run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Complete,
    Error,
}

/// Status report for a pipeline run over the corpus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineStatus {
    pub pipeline_type: PipelineType,
    pub status: RunStatus,
    pub documents_processed: usize,
    pub documents_total: usize,
    pub message: String,
}

/// A retrieval result surfaced to the end user alongside an answer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub document_id: String,
    pub chunk_id: String,
    pub score: f32,
    pub snippet: String,
    #[serde(default)]
    pub report_title: String,
    #[serde(default)]
    pub report_number: String,
}

/// A report referenced by one or more citations.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportRef {
    pub title: String,
    pub number: String,
}

/// Cross-citation metadata aggregated for the enhanced chat variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMetadata {
    pub agencies: Vec<String>,
    pub topics: Vec<String>,
    pub reports: Vec<ReportRef>,
    pub has_executive_summary: bool,
}

/// Answer plus supporting citations returned by the chat orchestrator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatReply {
    pub message: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ChatMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_status_transitions() {
        let mut doc = Document::new("report.pdf", "https://corpus.test/report.pdf");
        assert_eq!(doc.status, DocumentStatus::Uploaded);

        doc.mark_processing();
        assert_eq!(doc.status, DocumentStatus::Processing);

        doc.mark_complete(ProcessSummary {
            document_id: "report".into(),
            chunks: 4,
            indexed: 3,
            text_length: 2048,
            metadata: None,
        });
        assert_eq!(doc.status, DocumentStatus::Complete);
        assert_eq!(doc.summary.as_ref().unwrap().indexed, 3);
    }

    #[test]
    fn pipeline_type_serializes_snake_case() {
        let json = serde_json::to_string(&PipelineType::Enhanced).unwrap();
        assert_eq!(json, "\"enhanced\"");
        assert_eq!(PipelineType::Baseline.to_string(), "baseline");
    }
}
