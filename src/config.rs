//! Application settings loaded from environment variables.
//!
//! `.env` files are honored via `dotenvy`. Every field has a development
//! default; only malformed numeric values produce an error.

use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::chunking::ChunkingConfig;
use crate::types::RagError;

#[derive(Clone, Debug)]
pub struct Settings {
    /// Endpoint of the document extraction service.
    pub extraction_endpoint: String,
    pub extraction_key: String,

    /// Endpoint and key for the hosted search service.
    pub search_endpoint: String,
    pub search_api_key: String,
    pub search_index_baseline: String,
    pub search_index_enhanced: String,

    /// Model deployment names.
    pub embedding_deployment: String,
    pub chat_deployment: String,

    /// Chunking defaults applied when a caller does not override them.
    pub chunk_size: usize,
    pub chunk_overlap: usize,

    pub environment: String,
}

impl Settings {
    /// Loads settings from the process environment, after attempting to read
    /// a `.env` file from the working directory.
    pub fn from_env() -> Result<Self, RagError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            extraction_endpoint: env_or("EXTRACTION_ENDPOINT", ""),
            extraction_key: env_or("EXTRACTION_KEY", ""),
            search_endpoint: env_or("SEARCH_ENDPOINT", ""),
            search_api_key: env_or("SEARCH_API_KEY", ""),
            search_index_baseline: env_or("SEARCH_INDEX_BASELINE", "baseline-index"),
            search_index_enhanced: env_or("SEARCH_INDEX_ENHANCED", "enhanced-index"),
            embedding_deployment: env_or("EMBEDDING_DEPLOYMENT", "text-embedding-3-small"),
            chat_deployment: env_or("CHAT_DEPLOYMENT", "gpt-4o"),
            chunk_size: env_parse("CHUNK_SIZE", crate::chunking::DEFAULT_CHUNK_SIZE)?,
            chunk_overlap: env_parse("CHUNK_OVERLAP", crate::chunking::DEFAULT_CHUNK_OVERLAP)?,
            environment: env_or("RAGMILL_ENV", "development"),
        })
    }

    /// Chunking configuration derived from the loaded settings.
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig::new(self.chunk_size, self.chunk_overlap)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T, RagError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| RagError::Config(format!("invalid {key} '{raw}': {err}"))),
        Err(_) => Ok(default),
    }
}
