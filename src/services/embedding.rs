//! Batch-size management for embedding calls.

use std::sync::Arc;

use async_trait::async_trait;

use super::Embedder;
use crate::types::RagError;

/// Number of texts sent to the underlying embedder per call. Embedding APIs
/// accept larger batches, but smaller ones keep each request inside token
/// limits.
pub const EMBED_BATCH_SIZE: usize = 16;

/// Wraps an [`Embedder`] and slices its input into fixed-size batches,
/// concatenating the results in order.
pub struct BatchedEmbedder {
    inner: Arc<dyn Embedder>,
    batch_size: usize,
}

impl BatchedEmbedder {
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self {
            inner,
            batch_size: EMBED_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Embeds a single text, typically a retrieval query.
    pub async fn embed_single(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let texts = [text.to_string()];
        let vectors = self.embed(&texts).await?;
        vectors
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("embedder returned no vector".into()))
    }
}

#[async_trait]
impl Embedder for BatchedEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let vectors = self.inner.embed(batch).await?;
            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            all.extend(vectors);
        }
        Ok(all)
    }
}
