//! Pipeline orchestration: extract → chunk → embed → index.
//!
//! Two variants share the same sequencing and differ only in whether
//! extracted document metadata is attached to every indexed record:
//!
//! * [`BaselinePipeline`] — plain text in, chunks out.
//! * [`EnhancedPipeline`] — a custom analyzer also yields structured fields
//!   replicated onto each chunk record.
//!
//! Orchestrators propagate collaborator errors with `?`. Only
//! [`run_corpus`] — the outermost boundary — converts them into a sanitized
//! [`PipelineStatus`] message, logging the details instead of exposing them.

pub mod baseline;
pub mod enhanced;

use async_trait::async_trait;
use tracing::{error, info};
use url::Url;

use crate::chunking::{chunk_text, Chunk, ChunkingConfig};
use crate::models::{PipelineStatus, PipelineType, ProcessSummary, RunStatus};
use crate::services::{Embedder, IndexOutcome, IndexRecord, SearchIndex};
use crate::types::RagError;

pub use baseline::BaselinePipeline;
pub use enhanced::EnhancedPipeline;

/// A per-document processing pipeline.
///
/// Both pipeline variants implement this so corpus-wide runs and tests can
/// treat them uniformly.
#[async_trait]
pub trait DocumentPipeline: Send + Sync {
    fn pipeline_type(&self) -> PipelineType;

    /// One-time setup: create indexes (and analyzers) before first use.
    async fn prepare(&self) -> Result<(), RagError>;

    /// Runs the full pipeline for a single document.
    async fn process_document(
        &self,
        document_url: &Url,
        document_id: &str,
        config: &ChunkingConfig,
    ) -> Result<ProcessSummary, RagError>;
}

/// Chunks `text`, embeds the chunk contents, and uploads the records.
///
/// Returns the chunk count and the number of records the index reported as
/// succeeded. The embed step must return exactly one vector per chunk;
/// anything else is an [`RagError::Embedding`].
pub(crate) async fn chunk_embed_index(
    text: &str,
    document_id: &str,
    config: &ChunkingConfig,
    embedder: &dyn Embedder,
    index: &dyn SearchIndex,
    index_name: &str,
    metadata: Option<&serde_json::Map<String, serde_json::Value>>,
) -> Result<(usize, usize), RagError> {
    let chunks = chunk_text(text, document_id, config)?;
    info!(document_id, chunks = chunks.len(), "chunked document");

    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let vectors = embedder.embed(&texts).await?;
    if vectors.len() != chunks.len() {
        return Err(RagError::Embedding(format!(
            "embedder returned {} vectors for {} chunks",
            vectors.len(),
            chunks.len()
        )));
    }

    let records = build_records(chunks, vectors, metadata);
    let total = records.len();
    let outcomes = index.index_chunks(index_name, records).await?;
    let indexed = count_succeeded(&outcomes);
    info!(document_id, indexed, total, index_name, "indexed chunks");

    Ok((total, indexed))
}

fn build_records(
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    metadata: Option<&serde_json::Map<String, serde_json::Value>>,
) -> Vec<IndexRecord> {
    chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| IndexRecord {
            chunk,
            vector,
            metadata: metadata.cloned(),
        })
        .collect()
}

fn count_succeeded(outcomes: &[IndexOutcome]) -> usize {
    outcomes.iter().filter(|o| o.succeeded).count()
}

/// Runs a pipeline over every document in the corpus, sequentially.
///
/// Collaborator failures are caught here: the run stops, details are logged,
/// and the returned status carries a generic message rather than the raw
/// error.
pub async fn run_corpus(
    pipeline: &dyn DocumentPipeline,
    documents: &[(Url, String)],
    config: &ChunkingConfig,
) -> PipelineStatus {
    let pipeline_type = pipeline.pipeline_type();
    let total = documents.len();

    if documents.is_empty() {
        return PipelineStatus {
            pipeline_type,
            status: RunStatus::Error,
            documents_processed: 0,
            documents_total: 0,
            message: "No documents in corpus. Upload documents first.".into(),
        };
    }

    if let Err(err) = pipeline.prepare().await {
        error!(%pipeline_type, %err, "pipeline preparation failed");
        return PipelineStatus {
            pipeline_type,
            status: RunStatus::Error,
            documents_processed: 0,
            documents_total: total,
            message: "Pipeline services could not be prepared.".into(),
        };
    }

    let mut processed = 0usize;
    for (url, document_id) in documents {
        match pipeline.process_document(url, document_id, config).await {
            Ok(summary) => {
                info!(
                    %pipeline_type,
                    document_id,
                    chunks = summary.chunks,
                    indexed = summary.indexed,
                    "processed document"
                );
                processed += 1;
            }
            Err(err) => {
                error!(%pipeline_type, document_id, %err, "pipeline run failed");
                return PipelineStatus {
                    pipeline_type,
                    status: RunStatus::Error,
                    documents_processed: processed,
                    documents_total: total,
                    message: "An error occurred while running the pipeline.".into(),
                };
            }
        }
    }

    PipelineStatus {
        pipeline_type,
        status: RunStatus::Complete,
        documents_processed: processed,
        documents_total: total,
        message: format!("Processed {processed}/{total} documents."),
    }
}
