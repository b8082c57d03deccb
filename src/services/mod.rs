//! Capability interfaces consumed by the pipeline and chat orchestrators.
//!
//! Each external collaborator is modeled as a narrow trait so orchestration
//! can be exercised with substitute implementations and no network
//! dependency:
//!
//! * [`Extractor`] — document URL to markdown text plus structured fields.
//! * [`Embedder`] — ordered batch of texts to ordered batch of vectors.
//! * [`SearchIndex`] — index management, chunk upload, hybrid retrieval.
//! * [`Completer`] — grounded answer generation.
//!
//! [`BatchedEmbedder`] adapts any [`Embedder`] to fixed-size batches, and
//! [`InMemoryIndex`] is a reference [`SearchIndex`] used by tests and demos.

pub mod embedding;
pub mod memory;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::chunking::Chunk;
use crate::types::RagError;

pub use embedding::{BatchedEmbedder, EMBED_BATCH_SIZE};
pub use memory::InMemoryIndex;

/// Output of document extraction: markdown text plus optional structured
/// fields produced by a custom analyzer.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Extraction {
    pub text: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Extraction {
    /// Extraction carrying plain text and no structured fields.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: Map::new(),
        }
    }
}

/// Converts a source document into text and structured fields.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, document_url: &Url, analyzer_id: &str)
        -> Result<Extraction, RagError>;

    /// Ensure a custom analyzer exists before first use. Prebuilt analyzers
    /// need no setup, so the default is a no-op.
    async fn ensure_analyzer(&self, _analyzer_id: &str) -> Result<(), RagError> {
        Ok(())
    }
}

/// Produces one embedding vector per input text, order-preserving.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// A chunk paired with its embedding and, for the enhanced pipeline, the
/// per-document metadata replicated onto every record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexRecord {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

/// Per-record result of an index upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexOutcome {
    pub key: String,
    pub succeeded: bool,
}

/// One retrieval result, with enrichment fields when the index carries them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub content: String,
    pub document_id: String,
    pub score: f32,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl SearchHit {
    /// Returns a non-empty string field, if present.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Returns a string-array field as owned strings, skipping non-strings.
    pub fn field_str_list(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Index management, chunk upload, and hybrid keyword+vector retrieval.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Create the named index if it does not exist. `enhanced` selects the
    /// schema carrying metadata fields.
    async fn ensure_index(&self, index_name: &str, enhanced: bool) -> Result<(), RagError>;

    /// Upload records, returning one order-aligned outcome per record.
    /// Partial failure is reported per record, not as an error.
    async fn index_chunks(
        &self,
        index_name: &str,
        records: Vec<IndexRecord>,
    ) -> Result<Vec<IndexOutcome>, RagError>;

    /// Hybrid search: keyword matching always, vector similarity when a
    /// query vector is supplied. Results are ordered best-first.
    async fn search(
        &self,
        index_name: &str,
        query: &str,
        vector: Option<&[f32]>,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, RagError>;
}

/// Generates a text answer from a system prompt and user content.
#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, system_prompt: &str, user_content: &str)
        -> Result<String, RagError>;
}
