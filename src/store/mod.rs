//! Document store abstraction and its backends.
//!
//! Generators only ever upsert. Each backend reports failures as a
//! [`StoreError`] so the caller can tell a hiccup from a misconfiguration.

pub mod local;
pub mod memory;
pub mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use local::LocalStore;
pub use memory::MemoryStore;
pub use rest::{RestStore, StoreConfig};

/// Couchbase common flag for JSON documents
pub const FLAGS_JSON: u32 = 0x0200_0006;
/// Couchbase common flag for UTF-8 string documents
pub const FLAGS_UTF8: u32 = 0x0400_0000;

/// Encoding the document is stored with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    #[default]
    Json,
    Utf8,
}

impl DocumentFormat {
    pub fn flags(self) -> u32 {
        match self {
            DocumentFormat::Json => FLAGS_JSON,
            DocumentFormat::Utf8 => FLAGS_UTF8,
        }
    }
}

/// Per-write options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpsertOptions {
    /// Expiry in seconds. `Some(0)` never expires, `None` keeps the bucket default.
    pub ttl: Option<u32>,
    pub format: DocumentFormat,
}

impl UpsertOptions {
    pub fn json() -> Self {
        Self::default()
    }

    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid store configuration: {0}")]
    Config(String),

    #[error("store unreachable: {0}")]
    Unavailable(String),

    #[error("store request timed out")]
    Timeout,

    #[error("store rejected document ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("local store error: {0}")]
    Local(#[from] rocksdb::Error),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl StoreError {
    /// Whether the same write could plausibly succeed if tried again later.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable(_) | StoreError::Timeout => true,
            StoreError::Rejected { status, .. } => *status == 429 || *status >= 500,
            StoreError::Config(_)
            | StoreError::Encode(_)
            | StoreError::Local(_)
            | StoreError::Http(_) => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StoreError::Timeout
        } else if err.is_connect() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Http(err)
        }
    }
}

/// Anything documents can be upserted into
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn upsert(
        &self,
        key: &str,
        value: &serde_json::Value,
        options: UpsertOptions,
    ) -> Result<(), StoreError>;
}
