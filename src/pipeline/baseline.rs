//! Baseline pipeline: plain-text extraction, no metadata enrichment.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use url::Url;

use super::{chunk_embed_index, DocumentPipeline};
use crate::chunking::ChunkingConfig;
use crate::models::{PipelineType, ProcessSummary};
use crate::services::{Embedder, Extractor, SearchIndex};
use crate::types::RagError;

/// Analyzer used for plain text extraction.
pub const BASELINE_ANALYZER_ID: &str = "prebuilt-document-search";

/// Orchestrates the baseline pipeline for one index.
///
/// Steps per document: extract text, chunk, embed, index. No structured
/// metadata is attached to the records.
pub struct BaselinePipeline {
    extractor: Arc<dyn Extractor>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SearchIndex>,
    index_name: String,
}

impl BaselinePipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SearchIndex>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            index,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Creates the baseline search index if it does not exist.
    pub async fn ensure_index(&self) -> Result<(), RagError> {
        self.index.ensure_index(&self.index_name, false).await?;
        info!(index_name = %self.index_name, "ensured baseline index exists");
        Ok(())
    }

    /// Runs the full baseline pipeline for a single document.
    ///
    /// If extraction yields no text the document is skipped: the summary
    /// reports zero chunks and neither embedding nor indexing is called.
    pub async fn process_document(
        &self,
        document_url: &Url,
        document_id: &str,
        config: &ChunkingConfig,
    ) -> Result<ProcessSummary, RagError> {
        info!(document_id, "extracting text");
        let extraction = self
            .extractor
            .extract(document_url, BASELINE_ANALYZER_ID)
            .await?;

        if extraction.text.trim().is_empty() {
            warn!(document_id, "no text extracted");
            return Ok(ProcessSummary::empty(document_id, None));
        }

        let text_length = extraction.text.chars().count();
        let (chunks, indexed) = chunk_embed_index(
            &extraction.text,
            document_id,
            config,
            self.embedder.as_ref(),
            self.index.as_ref(),
            &self.index_name,
            None,
        )
        .await?;

        Ok(ProcessSummary {
            document_id: document_id.to_string(),
            chunks,
            indexed,
            text_length,
            metadata: None,
        })
    }
}

#[async_trait]
impl DocumentPipeline for BaselinePipeline {
    fn pipeline_type(&self) -> PipelineType {
        PipelineType::Baseline
    }

    async fn prepare(&self) -> Result<(), RagError> {
        self.ensure_index().await
    }

    async fn process_document(
        &self,
        document_url: &Url,
        document_id: &str,
        config: &ChunkingConfig,
    ) -> Result<ProcessSummary, RagError> {
        BaselinePipeline::process_document(self, document_url, document_id, config).await
    }
}
