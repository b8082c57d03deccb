//! ```text
//! Document URL ──► services::Extractor ──► markdown text (+ fields)
//!                                │
//!                   chunking::chunk_text ──► bounded, overlapping chunks
//!                                │
//!                  services::Embedder ──► order-aligned vectors
//!                                │
//!                 services::SearchIndex ──► indexed records
//!
//! Question ──► chat::RagChatService ──► hybrid retrieval ──► context
//!                                └──► services::Completer ──► answer + citations
//! ```
//!
//! Two pipeline variants share the sequencing above: the baseline pipeline
//! indexes plain chunks, while the enhanced pipeline replicates
//! analyzer-extracted document metadata onto every record so retrieval can
//! surface titles, agencies, and summaries alongside the text.

pub mod chat;
pub mod chunking;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod types;

pub use chat::{RagChatService, NOT_FOUND_MESSAGE, SYSTEM_PROMPT_BASELINE, SYSTEM_PROMPT_ENHANCED};
pub use chunking::{chunk_text, Chunk, ChunkingConfig};
pub use config::Settings;
pub use models::{
    ChatMetadata, ChatReply, Citation, Document, DocumentStatus, PipelineStatus,
    PipelineType, ProcessSummary, ReportRef, RunStatus,
};
pub use pipeline::{run_corpus, BaselinePipeline, DocumentPipeline, EnhancedPipeline};
pub use services::{
    BatchedEmbedder, Completer, Embedder, Extraction, Extractor, InMemoryIndex, IndexOutcome,
    IndexRecord, SearchHit, SearchIndex,
};
pub use types::RagError;
