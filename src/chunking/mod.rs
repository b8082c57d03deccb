//! Deterministic text chunking for embedding and retrieval.
//!
//! [`chunk_text`] splits extracted document text into bounded, overlapping,
//! ID-stable segments. Paragraph boundaries are preserved where possible;
//! paragraphs longer than the chunk budget fall back to fixed-size character
//! windows. The function is pure: identical inputs always yield identical
//! chunks, and no state survives between calls.

use serde::{Deserialize, Serialize};

use crate::types::RagError;

/// Default target chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap carried between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default paragraph separator.
pub const DEFAULT_SEPARATOR: &str = "\n\n";

/// One retrievable unit of text.
///
/// `id` is always `{document_id}-{chunk_index:04}` so repeated runs over the
/// same document produce the same keys in the search index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub content: String,
    pub document_id: String,
    pub chunk_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Configuration for [`chunk_text`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target maximum characters per chunk. Must be positive.
    pub chunk_size: usize,
    /// Trailing characters repeated at the start of the next chunk.
    /// Clamped to `chunk_size - 1` at runtime.
    pub chunk_overlap: usize,
    /// Delimiter used to split the input into paragraphs.
    pub separator: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl ChunkingConfig {
    /// Convenience constructor for the common size/overlap case.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            ..Self::default()
        }
    }
}

/// Splits `text` into ordered, bounded, overlapping chunks.
///
/// The algorithm is paragraph-greedy with a character-window fallback:
/// paragraphs are accumulated until the next one would push the accumulator
/// past `chunk_size`, at which point the accumulator is finalized and the
/// trailing `chunk_overlap` characters seed the next chunk. A single
/// paragraph longer than `chunk_size` is split into fixed windows advancing
/// by `chunk_size - chunk_overlap` characters; any pending accumulator text,
/// overlap seed included, is emitted as its own chunk first. The windows
/// themselves never inherit overlap from the paragraph accumulator.
///
/// All sizes are measured in `char`s, so multi-byte input never splits
/// inside a code point.
///
/// Empty or whitespace-only input yields an empty vector. The only error is
/// invalid configuration, reported before any iteration begins.
pub fn chunk_text(
    text: &str,
    document_id: &str,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, RagError> {
    if config.chunk_size == 0 {
        return Err(RagError::Config("chunk_size must be positive".into()));
    }
    if config.separator.is_empty() {
        return Err(RagError::Config("separator must be non-empty".into()));
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    // Clamp so the window step `chunk_size - overlap` is always >= 1.
    let overlap = config.chunk_overlap.min(config.chunk_size - 1);
    let sep_len = config.separator.chars().count();

    let paragraphs: Vec<&str> = text
        .split(config.separator.as_str())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut chunks: Vec<Chunk> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for para in paragraphs {
        let para_len = para.chars().count();

        if !current.is_empty() && current_len + sep_len + para_len > config.chunk_size {
            let finalized = finalize(&mut chunks, document_id, &current);
            current.clear();
            current_len = 0;
            // Seed the next accumulator with the trailing overlap. The seed
            // is dropped only when the upcoming paragraph fits in a chunk by
            // itself but not beside the seed; keeping it would break the
            // size budget, and the seed text is already covered by the
            // finalized chunk. An oversized paragraph keeps the seed: the
            // windowing branch below flushes it as its own chunk first.
            if overlap > 0 && finalized.chars().count() > overlap {
                let fits_beside_seed = overlap + sep_len + para_len <= config.chunk_size;
                if fits_beside_seed || para_len > config.chunk_size {
                    current = tail_chars(&finalized, overlap);
                    current_len = overlap;
                }
            }
        }

        if para_len > config.chunk_size {
            // Oversized paragraph: any pending accumulator text, overlap
            // seed included, becomes its own chunk before windowing. The
            // windows themselves never extend past the paragraph.
            if !current.trim().is_empty() {
                finalize(&mut chunks, document_id, &current);
            }
            current.clear();
            current_len = 0;

            let step = config.chunk_size - overlap;
            let para_chars: Vec<char> = para.chars().collect();
            let mut start = 0usize;
            while start < para_chars.len() {
                let end = (start + config.chunk_size).min(para_chars.len());
                let window: String = para_chars[start..end].iter().collect();
                if !window.trim().is_empty() {
                    finalize(&mut chunks, document_id, &window);
                }
                start += step;
            }
        } else if current.is_empty() {
            current.push_str(para);
            current_len = para_len;
        } else {
            current.push_str(&config.separator);
            current.push_str(para);
            current_len += sep_len + para_len;
        }
    }

    if !current.trim().is_empty() {
        finalize(&mut chunks, document_id, &current);
    }

    Ok(chunks)
}

/// Trims `content`, appends it as the next chunk, and returns the trimmed text.
fn finalize(chunks: &mut Vec<Chunk>, document_id: &str, content: &str) -> String {
    let trimmed = content.trim().to_string();
    debug_assert!(!trimmed.is_empty(), "finalize called with blank content");
    let chunk_index = chunks.len();
    chunks.push(Chunk {
        id: format!("{document_id}-{chunk_index:04}"),
        content: trimmed.clone(),
        document_id: document_id.to_string(),
        chunk_index,
        page_number: None,
        section_title: None,
        metadata: None,
    });
    trimmed
}

fn tail_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    if count <= n {
        s.to_string()
    } else {
        s.chars().skip(count - n).collect()
    }
}
