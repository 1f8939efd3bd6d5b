//! docqa-core
//!
//! Shared domain types, the error taxonomy, capability traits, configuration,
//! document loading and the chunker.

pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod traits;
pub mod types;

pub use chunker::{Chunker, ChunkingConfig};
pub use error::{Error, Result};
pub use types::{Chunk, ChunkId, Document, Page, ScoredChunk};
