//! Deterministic mock collaborators for tests and offline demos.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use url::Url;

use super::{
    Completer, Embedder, Extraction, Extractor, IndexOutcome, IndexRecord, InMemoryIndex,
    SearchHit, SearchIndex,
};
use crate::types::RagError;

/// Extractor returning canned text and fields, counting invocations.
#[derive(Debug, Default)]
pub struct MockExtractor {
    text: String,
    fields: Map<String, Value>,
    calls: AtomicUsize,
    analyzer_calls: AtomicUsize,
}

impl MockExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields = fields;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn analyzer_calls(&self) -> usize {
        self.analyzer_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(
        &self,
        _document_url: &Url,
        _analyzer_id: &str,
    ) -> Result<Extraction, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Extraction {
            text: self.text.clone(),
            fields: self.fields.clone(),
        })
    }

    async fn ensure_analyzer(&self, _analyzer_id: &str) -> Result<(), RagError> {
        self.analyzer_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Embedder producing deterministic, text-derived vectors.
///
/// The same text always maps to the same unit-length vector, and distinct
/// texts map to distinct vectors with overwhelming probability, which is
/// enough for ranking assertions in tests.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `embed` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in text.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        let mut vector: Vec<f32> = (0..self.dimensions)
            .map(|i| {
                let mixed = hash
                    .wrapping_add(i as u64)
                    .wrapping_mul(0x9e37_79b9_7f4a_7c15);
                ((mixed >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0) as f32
            })
            .collect();
        let magnitude: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for component in &mut vector {
                *component /= magnitude;
            }
        }
        vector
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}

/// [`SearchIndex`] wrapper around [`InMemoryIndex`] that counts calls and can
/// simulate partial upload failure.
#[derive(Default)]
pub struct MockIndex {
    inner: InMemoryIndex,
    index_calls: AtomicUsize,
    search_calls: AtomicUsize,
    /// When set, every n-th record in an upload is reported as failed and not
    /// stored.
    fail_every: Option<usize>,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = Some(n.max(1));
        self
    }

    pub fn index_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn count(&self, index_name: &str) -> usize {
        self.inner.count(index_name)
    }
}

#[async_trait]
impl SearchIndex for MockIndex {
    async fn ensure_index(&self, index_name: &str, enhanced: bool) -> Result<(), RagError> {
        self.inner.ensure_index(index_name, enhanced).await
    }

    async fn index_chunks(
        &self,
        index_name: &str,
        records: Vec<IndexRecord>,
    ) -> Result<Vec<IndexOutcome>, RagError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);

        let Some(n) = self.fail_every else {
            return self.inner.index_chunks(index_name, records).await;
        };

        let mut outcomes = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            let key = record.chunk.id.clone();
            if (position + 1) % n == 0 {
                outcomes.push(IndexOutcome {
                    key,
                    succeeded: false,
                });
            } else {
                let mut stored = self.inner.index_chunks(index_name, vec![record]).await?;
                outcomes.append(&mut stored);
            }
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
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.search(index_name, query, vector, top_k).await
    }
}

/// Completer returning a fixed reply, recording the prompts it received.
#[derive(Debug)]
pub struct MockCompleter {
    reply: String,
    calls: AtomicUsize,
    last_user_content: Arc<Mutex<Option<String>>>,
}

impl MockCompleter {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: AtomicUsize::new(0),
            last_user_content: Arc::new(Mutex::new(None)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_content(&self) -> Option<String> {
        self.last_user_content.lock().clone()
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(
        &self,
        _system_prompt: &str,
        user_content: &str,
    ) -> Result<String, RagError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_content.lock() = Some(user_content.to_string());
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_embeddings_are_deterministic() {
        let embedder = MockEmbedder::new(8);
        let inputs = vec![
            "Hello world".to_string(),
            "Goodbye world".to_string(),
            "Hello world".to_string(),
        ];

        let first = embedder.embed(&inputs).await.unwrap();
        let second = embedder.embed(&inputs).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first[0], first[2], "identical text, identical vector");
        assert_ne!(first[0], first[1], "distinct text, distinct vector");
    }

    #[tokio::test]
    async fn failing_index_reports_alternate_records() {
        let index = MockIndex::new().failing_every(2);
        index.ensure_index("test", false).await.unwrap();

        let records: Vec<IndexRecord> = (0..4)
            .map(|i| IndexRecord {
                chunk: crate::chunking::Chunk {
                    id: format!("doc1-{i:04}"),
                    content: format!("content {i}"),
                    document_id: "doc1".into(),
                    chunk_index: i,
                    page_number: None,
                    section_title: None,
                    metadata: None,
                },
                vector: vec![1.0],
                metadata: None,
            })
            .collect();

        let outcomes = index.index_chunks("test", records).await.unwrap();
        let succeeded = outcomes.iter().filter(|o| o.succeeded).count();
        assert_eq!(succeeded, 2);
        assert_eq!(index.count("test"), 2);
    }
}
