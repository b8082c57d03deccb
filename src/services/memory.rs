//! In-memory reference implementation of [`SearchIndex`].
//!
//! Intended for tests and demos: it honors the same contract as a hosted
//! search service — upsert-by-key, per-record outcomes, hybrid
//! keyword+vector ranking — without any network dependency.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use super::{IndexOutcome, IndexRecord, SearchHit, SearchIndex};
use crate::types::RagError;

#[derive(Clone, Debug)]
struct StoredRecord {
    id: String,
    content: String,
    document_id: String,
    vector: Vec<f32>,
    fields: Map<String, Value>,
}

#[derive(Debug, Default)]
struct IndexState {
    enhanced: bool,
    records: Vec<StoredRecord>,
}

/// Hybrid keyword+vector index held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    indexes: RwLock<HashMap<String, IndexState>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently stored in the named index.
    pub fn count(&self, index_name: &str) -> usize {
        self.indexes
            .read()
            .get(index_name)
            .map(|state| state.records.len())
            .unwrap_or(0)
    }

    /// Whether the named index was created with the enhanced schema.
    pub fn is_enhanced(&self, index_name: &str) -> bool {
        self.indexes
            .read()
            .get(index_name)
            .map(|state| state.enhanced)
            .unwrap_or(false)
    }
}

#[async_trait]
impl SearchIndex for InMemoryIndex {
    async fn ensure_index(&self, index_name: &str, enhanced: bool) -> Result<(), RagError> {
        let mut indexes = self.indexes.write();
        let state = indexes.entry(index_name.to_string()).or_default();
        state.enhanced = enhanced;
        Ok(())
    }

    async fn index_chunks(
        &self,
        index_name: &str,
        records: Vec<IndexRecord>,
    ) -> Result<Vec<IndexOutcome>, RagError> {
        let mut indexes = self.indexes.write();
        let state = indexes.entry(index_name.to_string()).or_default();

        let mut outcomes = Vec::with_capacity(records.len());
        for record in records {
            let mut fields = record.metadata.unwrap_or_default();
            if let Some(section) = &record.chunk.section_title {
                fields.insert("section_title".into(), Value::String(section.clone()));
            }
            fields.insert(
                "chunk_index".into(),
                Value::Number(record.chunk.chunk_index.into()),
            );

            let stored = StoredRecord {
                id: record.chunk.id.clone(),
                content: record.chunk.content,
                document_id: record.chunk.document_id,
                vector: record.vector,
                fields,
            };
            // Upsert by key, matching hosted-index semantics.
            if let Some(existing) = state.records.iter_mut().find(|r| r.id == stored.id) {
                *existing = stored.clone();
            } else {
                state.records.push(stored.clone());
            }
            outcomes.push(IndexOutcome {
                key: stored.id,
                succeeded: true,
            });
        }
        Ok(outcomes)
    }

    async fn search(
        &self,
        index_name: &str,
        query: &str,
        vector: Option<&[f32]>,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, RagError> {
        let indexes = self.indexes.read();
        let state = indexes
            .get(index_name)
            .ok_or_else(|| RagError::Search(format!("index '{index_name}' does not exist")))?;

        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut scored: Vec<SearchHit> = state
            .records
            .iter()
            .map(|record| {
                let keyword = keyword_score(&record.content, &terms);
                // Dissimilar vectors contribute nothing rather than
                // cancelling out a keyword match.
                let similarity = vector
                    .map(|v| cosine_similarity(v, &record.vector).max(0.0))
                    .unwrap_or(0.0);
                SearchHit {
                    id: record.id.clone(),
                    content: record.content.clone(),
                    document_id: record.document_id.clone(),
                    score: keyword + similarity,
                    fields: record.fields.clone(),
                }
            })
            .filter(|hit| hit.score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Fraction of query terms present in the content, case-insensitive.
fn keyword_score(content: &str, terms: &[String]) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let haystack = content.to_lowercase();
    let matched = terms.iter().filter(|term| haystack.contains(*term)).count();
    matched as f32 / terms.len() as f32
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
