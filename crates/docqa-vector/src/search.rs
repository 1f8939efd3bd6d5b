use std::cmp::Ordering;

use docqa_core::error::{Error, Result};
use docqa_core::types::ScoredChunk;

use crate::index::VectorIndex;
use crate::similarity::{dot, normalized};

impl VectorIndex {
    /// Top `k` chunks by cosine similarity to `query`, best first. Equal
    /// scores keep insertion order (lower chunk id first). Asking for more
    /// than the index holds returns everything.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredChunk>> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }

        let query = normalized(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let score = dot(&query, &entry.vector);
                (i, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        let by_rank = |a: &(usize, f32), b: &(usize, f32)| -> Ordering {
            b.1.total_cmp(&a.1)
                .then_with(|| self.entries[a.0].chunk.id.cmp(&self.entries[b.0].chunk.id))
        };
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, by_rank);
            scored.truncate(k);
        }
        scored.sort_by(by_rank);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk { chunk: self.entries[i].chunk.clone(), score })
            .collect())
    }
}
