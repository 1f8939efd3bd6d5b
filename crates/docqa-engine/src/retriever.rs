use std::sync::Arc;

use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::{Chunk, ScoredChunk};
use docqa_vector::VectorIndex;

/// Embeds a question and looks up its nearest chunks.
pub struct Retriever {
    index: VectorIndex,
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(index: VectorIndex, embedder: Arc<dyn Embedder>) -> Self { Self { index, embedder } }

    /// Chunks most similar to `question`, best first, without scores.
    pub fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Chunk>> {
        Ok(self.retrieve_scored(question, k)?.into_iter().map(|hit| hit.chunk).collect())
    }

    pub fn retrieve_scored(&self, question: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let query = self
            .embedder
            .embed(question)
            .map_err(|e| Error::Embedding(format!("{e:#}")))?;
        let hits = self.index.search(&query, k)?;
        tracing::debug!(k, hits = hits.len(), top_score = hits.first().map(|h| h.score), "retrieved chunks");
        Ok(hits)
    }

    pub fn index(&self) -> &VectorIndex { &self.index }
}
