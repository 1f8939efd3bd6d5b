//! docqa-embed
//!
//! Embedding backends behind `docqa_core::traits::Embedder`: a candle BERT
//! sentence-transformer and a model-free hashing embedder.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use docqa_core::config::{resolve_with_base, EmbeddingBackend, EmbeddingSettings};
use docqa_core::traits::Embedder;

pub mod device;
pub mod hash;
pub mod minilm;
pub mod pool;
pub mod tokenize;

pub use hash::HashEmbedder;
pub use minilm::MiniLmEmbedder;
pub use pool::masked_mean_l2;

/// Builds the configured backend. Relative model directories resolve against `base_dir`.
pub fn get_default_embedder(settings: &EmbeddingSettings, base_dir: &Path) -> Result<Arc<dyn Embedder>> {
    match settings.backend {
        EmbeddingBackend::Hash => {
            tracing::info!(dim = settings.dim, "using hash embedder");
            Ok(Arc::new(HashEmbedder::new(settings.dim)))
        }
        EmbeddingBackend::MiniLm => {
            let model_dir = resolve_with_base(base_dir, &settings.model_dir);
            Ok(Arc::new(MiniLmEmbedder::new(&model_dir, settings.max_len)?))
        }
    }
}
