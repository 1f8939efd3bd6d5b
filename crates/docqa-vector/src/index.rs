use docqa_core::error::{Error, Result};
use docqa_core::traits::Embedder;
use docqa_core::types::Chunk;

use crate::similarity::normalized;

/// One stored chunk and its unit-length vector.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Flat in-memory index: every search scans all entries, so results are the
/// exact top-k under cosine similarity. Immutable once built.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    pub(crate) dim: usize,
    pub(crate) entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// An index with no entries; every search returns nothing.
    pub fn empty(dim: usize) -> Self { Self { dim, entries: Vec::new() } }

    /// Embeds `chunks` in batches of `batch_size` and stores them in order.
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder, batch_size: usize) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::IndexBuild("no chunks to index".to_string()));
        }
        let batch_size = batch_size.max(1);
        tracing::info!(chunks = chunks.len(), batch_size, "building vector index");

        let mut vectors = Vec::with_capacity(chunks.len());
        for (batch_no, batch) in chunks.chunks(batch_size).enumerate() {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = embedder
                .embed_batch(&texts)
                .map_err(|e| Error::IndexBuild(format!("embedding batch {batch_no} failed: {e:#}")))?;
            if embedded.len() != texts.len() {
                return Err(Error::IndexBuild(format!(
                    "embedder returned {} vectors for {} chunks",
                    embedded.len(),
                    texts.len()
                )));
            }
            vectors.extend(embedded);
            tracing::debug!(batch = batch_no, done = vectors.len(), "embedded chunk batch");
        }

        let index = Self::from_vectors(chunks.into_iter().zip(vectors))?;
        tracing::info!(entries = index.len(), dim = index.dim, "vector index ready");
        Ok(index)
    }

    /// Builds from precomputed vectors, normalising each one.
    pub fn from_vectors<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Chunk, Vec<f32>)>,
    {
        let mut dim = None;
        let mut entries = Vec::new();
        for (chunk, vector) in pairs {
            if vector.is_empty() {
                return Err(Error::IndexBuild(format!("chunk {} has an empty vector", chunk.id)));
            }
            let expected = *dim.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(Error::IndexBuild(format!(
                    "chunk {} has a {}-dimensional vector, expected {}",
                    chunk.id,
                    vector.len(),
                    expected
                )));
            }
            entries.push(IndexEntry { vector: normalized(&vector), chunk });
        }
        match dim {
            Some(dim) => Ok(Self { dim, entries }),
            None => Err(Error::IndexBuild("no chunks to index".to_string())),
        }
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn dim(&self) -> usize { self.dim }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.entries.iter().map(|e| &e.chunk)
    }
}
