//! Overlapping fixed-size chunking.
//!
//! Pages are joined with [`Document::PAGE_SEPARATOR`] and the resulting text is
//! cut into windows of at most `chunk_size` chars. Each window ends on the
//! latest natural boundary found within `boundary_window` chars of the hard
//! cut (paragraph break, then sentence end, then whitespace) and the next
//! window starts exactly `overlap` chars before that end.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, Document, PageNumber};

/// Chunking parameters. Every size is counted in chars (Unicode scalar
/// values), never bytes or model tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
    pub boundary_window: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, overlap: 150, boundary_window: 100 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunking.chunk_size must be greater than zero".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunking.overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Word,
    Sentence,
    Paragraph,
}

#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChunkingConfig { &self.config }

    /// Splits `document` into chunks numbered from 0. A blank document yields
    /// no chunks; any other document shorter than `chunk_size` yields one.
    pub fn split(&self, document: &Document) -> Vec<Chunk> {
        if document.is_blank() {
            return Vec::new();
        }
        let (text, page_starts) = concat_pages(document);
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let hard_end = (start + self.config.chunk_size).min(len);
            let end = if hard_end == len {
                len
            } else {
                self.find_boundary(&chars, start, hard_end).unwrap_or(hard_end)
            };
            chunks.push(Chunk {
                id: chunks.len(),
                text: chars[start..end].iter().collect(),
                source_page: page_at(&page_starts, start),
                char_span: start..end,
            });
            if end == len {
                break;
            }
            // end > start + overlap, so the window always moves forward
            start = end - self.config.overlap;
        }
        tracing::debug!(chunks = chunks.len(), chars = len, "split document");
        chunks
    }

    fn find_boundary(&self, chars: &[char], start: usize, hard_end: usize) -> Option<usize> {
        let lowest = hard_end
            .saturating_sub(self.config.boundary_window)
            .max(start + self.config.overlap + 1);
        let mut best: Option<(Boundary, usize)> = None;
        for pos in (lowest..=hard_end).rev() {
            let Some(kind) = boundary_before(chars, pos) else { continue };
            if kind == Boundary::Paragraph {
                return Some(pos);
            }
            if best.map_or(true, |(found, _)| kind > found) {
                best = Some((kind, pos));
            }
        }
        best.map(|(_, pos)| pos)
    }
}

/// Convenience wrapper: validate `config` and split in one call.
pub fn split(document: &Document, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    Ok(Chunker::new(config.clone())?.split(document))
}

/// Classifies the cut position `pos` (exclusive end of a chunk).
fn boundary_before(chars: &[char], pos: usize) -> Option<Boundary> {
    let prev = *chars.get(pos.checked_sub(1)?)?;
    let before_prev = pos.checked_sub(2).and_then(|i| chars.get(i)).copied();
    if prev == '\n' && before_prev == Some('\n') {
        Some(Boundary::Paragraph)
    } else if prev == '\n' || (prev.is_whitespace() && matches!(before_prev, Some('.' | '!' | '?'))) {
        Some(Boundary::Sentence)
    } else if prev.is_whitespace() {
        Some(Boundary::Word)
    } else {
        None
    }
}

fn concat_pages(document: &Document) -> (String, Vec<(usize, PageNumber)>) {
    let separator_len = Document::PAGE_SEPARATOR.chars().count();
    let mut text = String::new();
    let mut starts = Vec::with_capacity(document.page_count());
    let mut offset = 0usize;
    for (i, page) in document.pages().iter().enumerate() {
        if i > 0 {
            text.push_str(Document::PAGE_SEPARATOR);
            offset += separator_len;
        }
        starts.push((offset, page.number));
        text.push_str(&page.text);
        offset += page.text.chars().count();
    }
    (text, starts)
}

fn page_at(starts: &[(usize, PageNumber)], pos: usize) -> PageNumber {
    starts
        .iter()
        .take_while(|(offset, _)| *offset <= pos)
        .last()
        .map_or(1, |&(_, number)| number)
}
