//! Retrieval-augmented question answering over an indexed corpus.
//!
//! [`RagChatService`] embeds the question, retrieves the top-k chunks via
//! hybrid search, assembles a delimited context string, and asks the
//! completion collaborator for a grounded answer with citations.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{ChatMetadata, ChatReply, Citation, ReportRef};
use crate::services::{Completer, Embedder, SearchHit, SearchIndex};
use crate::types::RagError;

pub const SYSTEM_PROMPT_BASELINE: &str = "\
You are a helpful assistant that answers questions about GAO (Government Accountability Office) cybersecurity reports.
Use ONLY the provided context to answer. If the context doesn't contain relevant information, say so.
Cite the document ID when referencing specific information.";

pub const SYSTEM_PROMPT_ENHANCED: &str = "\
You are a helpful assistant that answers questions about GAO cybersecurity reports.
You have access to enriched document metadata including report titles, agencies, topic categories, and executive summaries.
Use ONLY the provided context to answer. When available, include:
- The specific report number and title
- Relevant agencies mentioned
- Key findings or recommendations
Cite the document ID when referencing specific information.";

/// Reply used when retrieval returns no results.
pub const NOT_FOUND_MESSAGE: &str =
    "I couldn't find relevant information in the knowledge base.";

/// Separator between context entries handed to the completion collaborator.
const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Number of characters quoted in a citation snippet.
const SNIPPET_CHARS: usize = 200;

/// Default number of chunks retrieved per question.
pub const DEFAULT_TOP_K: usize = 5;

/// RAG chat orchestrator: retrieve, assemble context, answer.
pub struct RagChatService {
    index: Arc<dyn SearchIndex>,
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
}

impl RagChatService {
    pub fn new(
        index: Arc<dyn SearchIndex>,
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
    ) -> Self {
        Self {
            index,
            embedder,
            completer,
        }
    }

    /// Answers a question over the baseline index.
    pub async fn chat_baseline(
        &self,
        message: &str,
        index_name: &str,
    ) -> Result<ChatReply, RagError> {
        self.answer_inner(message, index_name, SYSTEM_PROMPT_BASELINE, DEFAULT_TOP_K, false)
            .await
    }

    /// Answers a question over the enhanced index, aggregating cross-citation
    /// metadata into the reply.
    pub async fn chat_enhanced(
        &self,
        message: &str,
        index_name: &str,
    ) -> Result<ChatReply, RagError> {
        self.answer_inner(message, index_name, SYSTEM_PROMPT_ENHANCED, DEFAULT_TOP_K, true)
            .await
    }

    /// Answers a question with an explicit system prompt and retrieval depth.
    pub async fn answer(
        &self,
        message: &str,
        index_name: &str,
        system_prompt: &str,
        top_k: usize,
    ) -> Result<ChatReply, RagError> {
        self.answer_inner(message, index_name, system_prompt, top_k, false)
            .await
    }

    async fn answer_inner(
        &self,
        message: &str,
        index_name: &str,
        system_prompt: &str,
        top_k: usize,
        aggregate_metadata: bool,
    ) -> Result<ChatReply, RagError> {
        let query = [message.to_string()];
        let vectors = self.embedder.embed(&query).await?;
        let vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("embedder returned no query vector".into()))?;

        let hits = self
            .index
            .search(index_name, message, Some(&vector), top_k)
            .await?;
        debug!(index_name, hits = hits.len(), "retrieved context");

        if hits.is_empty() {
            info!(index_name, "no results for question");
            return Ok(ChatReply {
                message: NOT_FOUND_MESSAGE.to_string(),
                citations: Vec::new(),
                metadata: None,
            });
        }

        let context = hits
            .iter()
            .map(context_entry)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR);
        let citations: Vec<Citation> = hits.iter().map(citation_for).collect();
        let metadata = aggregate_metadata.then(|| aggregate(&hits));

        let user_content = format!("Context:\n{context}\n\nQuestion: {message}");
        let answer = self.completer.complete(system_prompt, &user_content).await?;

        Ok(ChatReply {
            message: answer,
            citations,
            metadata,
        })
    }
}

/// Builds one labeled context entry for a retrieved chunk.
fn context_entry(hit: &SearchHit) -> String {
    let mut header_parts = vec![format!("[{}]", hit.document_id)];
    if let Some(title) = hit.field_str("report_title") {
        header_parts.push(format!("Report: {title}"));
    }
    if let Some(number) = hit.field_str("report_number") {
        header_parts.push(format!("({number})"));
    }
    if let Some(category) = hit.field_str("topic_category") {
        header_parts.push(format!("Category: {category}"));
    }
    let agencies = hit.field_str_list("agencies");
    if !agencies.is_empty() {
        header_parts.push(format!("Agencies: {}", agencies.join(", ")));
    }

    let mut entry = format!("{}\n{}", header_parts.join(" | "), hit.content);
    if let Some(summary) = hit.field_str("executive_summary") {
        entry.push_str("\nExecutive Summary: ");
        entry.push_str(summary);
    }
    entry
}

fn citation_for(hit: &SearchHit) -> Citation {
    Citation {
        document_id: hit.document_id.clone(),
        chunk_id: hit.id.clone(),
        score: hit.score,
        snippet: hit.content.chars().take(SNIPPET_CHARS).collect(),
        report_title: hit
            .field_str("report_title")
            .unwrap_or_default()
            .to_string(),
        report_number: hit
            .field_str("report_number")
            .unwrap_or_default()
            .to_string(),
    }
}

/// Deduplicated cross-citation metadata for the enhanced variant.
fn aggregate(hits: &[SearchHit]) -> ChatMetadata {
    let mut agencies = BTreeSet::new();
    let mut topics = BTreeSet::new();
    let mut reports = BTreeSet::new();
    let mut has_executive_summary = false;

    for hit in hits {
        agencies.extend(hit.field_str_list("agencies"));
        if let Some(topic) = hit.field_str("topic_category") {
            topics.insert(topic.to_string());
        }
        if let Some(title) = hit.field_str("report_title") {
            reports.insert(ReportRef {
                title: title.to_string(),
                number: hit
                    .field_str("report_number")
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        has_executive_summary |= hit.field_str("executive_summary").is_some();
    }

    ChatMetadata {
        agencies: agencies.into_iter().collect(),
        topics: topics.into_iter().collect(),
        reports: reports.into_iter().collect(),
        has_executive_summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn hit_with_fields(fields: Map<String, serde_json::Value>) -> SearchHit {
        SearchHit {
            id: "doc1-0000".into(),
            content: "Chunk content about security controls.".into(),
            document_id: "doc1".into(),
            score: 0.87,
            fields,
        }
    }

    #[test]
    fn context_entry_includes_metadata_when_present() {
        let mut fields = Map::new();
        fields.insert("report_title".into(), json!("IT Modernization"));
        fields.insert("report_number".into(), json!("GAO-24-106583"));
        fields.insert("topic_category".into(), json!("Cybersecurity"));
        fields.insert("agencies".into(), json!(["DHS", "OMB"]));
        fields.insert("executive_summary".into(), json!("Agencies lag on controls."));

        let entry = context_entry(&hit_with_fields(fields));
        assert!(entry.starts_with(
            "[doc1] | Report: IT Modernization | (GAO-24-106583) | Category: Cybersecurity | Agencies: DHS, OMB"
        ));
        assert!(entry.contains("Chunk content about security controls."));
        assert!(entry.ends_with("Executive Summary: Agencies lag on controls."));
    }

    #[test]
    fn context_entry_is_minimal_without_metadata() {
        let entry = context_entry(&hit_with_fields(Map::new()));
        assert_eq!(entry, "[doc1]\nChunk content about security controls.");
    }

    #[test]
    fn snippet_is_truncated_on_char_boundary() {
        let mut hit = hit_with_fields(Map::new());
        hit.content = "é".repeat(300);
        let citation = citation_for(&hit);
        assert_eq!(citation.snippet.chars().count(), 200);
    }

    #[test]
    fn aggregation_dedupes_across_hits() {
        let mut first = Map::new();
        first.insert("agencies".into(), json!(["DHS", "DOD"]));
        first.insert("topic_category".into(), json!("Cybersecurity"));
        first.insert("report_title".into(), json!("Report A"));
        first.insert("report_number".into(), json!("GAO-1"));

        let mut second = Map::new();
        second.insert("agencies".into(), json!(["DHS"]));
        second.insert("topic_category".into(), json!("Cybersecurity"));
        second.insert("report_title".into(), json!("Report A"));
        second.insert("report_number".into(), json!("GAO-1"));
        second.insert("executive_summary".into(), json!("Summary."));

        let hits = vec![hit_with_fields(first), hit_with_fields(second)];
        let metadata = aggregate(&hits);

        assert_eq!(metadata.agencies, vec!["DHS", "DOD"]);
        assert_eq!(metadata.topics, vec!["Cybersecurity"]);
        assert_eq!(metadata.reports.len(), 1);
        assert!(metadata.has_executive_summary);
    }
}
