//! Domain types shared by the chunker, the vector index and the engine.

use serde::{Deserialize, Serialize};
use std::ops::Range;

pub type ChunkId = usize;
pub type PageNumber = u32;

/// One page of a loaded document. Numbers are 1-based, as printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: PageNumber,
    pub text: String,
}

/// A document as an ordered list of pages. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pages: Vec<Page>,
}

impl Document {
    /// Separator inserted between pages when the document is read as one text.
    pub const PAGE_SEPARATOR: &'static str = "\n\n";

    pub fn new(pages: Vec<Page>) -> Self { Self { pages } }

    /// Numbers the given page texts from 1.
    pub fn from_pages<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pages = texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| Page { number: (i + 1) as PageNumber, text: text.into() })
            .collect();
        Self { pages }
    }

    pub fn from_text(text: impl Into<String>) -> Self { Self::from_pages([text]) }

    pub fn pages(&self) -> &[Page] { &self.pages }

    pub fn page_count(&self) -> usize { self.pages.len() }

    /// True when no page holds any non-whitespace text.
    pub fn is_blank(&self) -> bool { self.pages.iter().all(|p| p.text.trim().is_empty()) }
}

/// A chunk of the source document that is independently embedded and retrieved.
///
/// - `id`: insertion order within the index, starting at 0
/// - `text`: the chunk payload
/// - `source_page`: page on which the chunk starts
/// - `char_span`: range in chars over the concatenated document text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub source_page: PageNumber,
    pub char_span: Range<usize>,
}

impl Chunk {
    pub fn char_len(&self) -> usize { self.char_span.end - self.char_span.start }
}

/// A search result. `score` is cosine similarity, higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}
