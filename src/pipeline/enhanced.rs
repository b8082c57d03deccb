//! Enhanced pipeline: a custom analyzer adds structured metadata to every
//! indexed record.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};
use url::Url;

use super::{chunk_embed_index, DocumentPipeline};
use crate::chunking::ChunkingConfig;
use crate::models::{PipelineType, ProcessSummary};
use crate::services::{Embedder, Extractor, SearchIndex};
use crate::types::RagError;

/// Default custom analyzer for the enhanced pipeline.
pub const ENHANCED_ANALYZER_ID: &str = "gao-report-analyzer";

/// Extractor field names mapped onto the enhanced index schema.
const FIELD_MAPPINGS: [(&str, &str); 6] = [
    ("reportTitle", "report_title"),
    ("reportNumber", "report_number"),
    ("topicCategory", "topic_category"),
    ("executiveSummary", "executive_summary"),
    ("publicationDate", "publication_date"),
    ("agencies", "agencies"),
];

/// Orchestrates the metadata-enhanced pipeline for one index.
pub struct EnhancedPipeline {
    extractor: Arc<dyn Extractor>,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SearchIndex>,
    index_name: String,
    analyzer_id: String,
}

impl EnhancedPipeline {
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
            analyzer_id: ENHANCED_ANALYZER_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_analyzer_id(mut self, analyzer_id: impl Into<String>) -> Self {
        self.analyzer_id = analyzer_id.into();
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Creates the enhanced search index if it does not exist.
    pub async fn ensure_index(&self) -> Result<(), RagError> {
        self.index.ensure_index(&self.index_name, true).await?;
        info!(index_name = %self.index_name, "ensured enhanced index exists");
        Ok(())
    }

    /// Creates the custom analyzer if it does not exist.
    pub async fn ensure_analyzer(&self) -> Result<(), RagError> {
        self.extractor.ensure_analyzer(&self.analyzer_id).await?;
        info!(analyzer_id = %self.analyzer_id, "ensured analyzer exists");
        Ok(())
    }

    /// Runs the full enhanced pipeline for a single document.
    ///
    /// Structured fields returned by the analyzer are reported in the
    /// summary verbatim and replicated, renamed to the index schema, onto
    /// every chunk record. An empty extraction short-circuits with zero
    /// chunks but still reports whatever fields were extracted.
    pub async fn process_document(
        &self,
        document_url: &Url,
        document_id: &str,
        config: &ChunkingConfig,
    ) -> Result<ProcessSummary, RagError> {
        info!(document_id, analyzer_id = %self.analyzer_id, "analyzing document");
        let extraction = self
            .extractor
            .extract(document_url, &self.analyzer_id)
            .await?;
        let metadata = extraction.fields;

        if extraction.text.trim().is_empty() {
            warn!(document_id, "no text extracted");
            return Ok(ProcessSummary::empty(document_id, Some(metadata)));
        }

        let text_length = extraction.text.chars().count();
        let record_metadata = index_metadata(&metadata);
        let (chunks, indexed) = chunk_embed_index(
            &extraction.text,
            document_id,
            config,
            self.embedder.as_ref(),
            self.index.as_ref(),
            &self.index_name,
            Some(&record_metadata),
        )
        .await?;

        Ok(ProcessSummary {
            document_id: document_id.to_string(),
            chunks,
            indexed,
            text_length,
            metadata: Some(metadata),
        })
    }
}

/// Renames analyzer fields to the snake_case names the index schema uses,
/// dropping fields the schema does not carry.
fn index_metadata(fields: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (source, target) in FIELD_MAPPINGS {
        if let Some(value) = fields.get(source) {
            out.insert(target.to_string(), value.clone());
        }
    }
    out
}

#[async_trait]
impl DocumentPipeline for EnhancedPipeline {
    fn pipeline_type(&self) -> PipelineType {
        PipelineType::Enhanced
    }

    async fn prepare(&self) -> Result<(), RagError> {
        self.ensure_index().await?;
        self.ensure_analyzer().await
    }

    async fn process_document(
        &self,
        document_url: &Url,
        document_id: &str,
        config: &ChunkingConfig,
    ) -> Result<ProcessSummary, RagError> {
        EnhancedPipeline::process_document(self, document_url, document_id, config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analyzer_fields_are_renamed_to_index_schema() {
        let mut fields = Map::new();
        fields.insert("reportTitle".into(), json!("Cybersecurity Review"));
        fields.insert("agencies".into(), json!(["DHS", "DOD"]));
        fields.insert("unmapped".into(), json!("dropped"));

        let mapped = index_metadata(&fields);
        assert_eq!(mapped.get("report_title"), Some(&json!("Cybersecurity Review")));
        assert_eq!(mapped.get("agencies"), Some(&json!(["DHS", "DOD"])));
        assert!(!mapped.contains_key("unmapped"));
        assert!(!mapped.contains_key("reportTitle"));
    }
}
