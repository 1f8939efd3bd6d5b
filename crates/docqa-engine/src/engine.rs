use std::path::Path;
use std::sync::Arc;

use docqa_core::config::EngineConfig;
use docqa_core::document::load_document;
use docqa_core::error::Result;
use docqa_core::traits::{Embedder, Generator};
use docqa_core::types::{Chunk, Document, ScoredChunk};
use docqa_core::Chunker;
use docqa_vector::VectorIndex;

use crate::prompt::PromptComposer;
use crate::retriever::Retriever;

/// Everything produced while answering one question.
#[derive(Debug, Clone)]
pub struct Answer {
    /// Chunks placed in the prompt, best first.
    pub retrieved: Vec<ScoredChunk>,
    pub prompt: String,
    /// Model output, or a message starting with `Error:` if generation failed.
    pub text: String,
    pub generation_failed: bool,
}

impl Answer {
    pub fn is_error(&self) -> bool { self.generation_failed }
}

/// Owns the index built from one document and answers questions against it.
/// The document is chunked and embedded exactly once, in the constructor.
pub struct QueryEngine {
    retriever: Retriever,
    composer: PromptComposer,
    generator: Box<dyn Generator>,
    top_k: usize,
}

impl QueryEngine {
    /// Loads `source` and builds the engine. Configuration is checked before
    /// the document is touched.
    pub fn initialize(
        source: &Path,
        config: &EngineConfig,
        embedder: Arc<dyn Embedder>,
        generator: Box<dyn Generator>,
    ) -> Result<Self> {
        config.validate()?;
        let document = load_document(source)?;
        Self::from_document(&document, config, embedder, generator)
    }

    pub fn from_document(
        document: &Document,
        config: &EngineConfig,
        embedder: Arc<dyn Embedder>,
        generator: Box<dyn Generator>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = Chunker::new(config.chunking.clone())?;
        let chunks = chunker.split(document);

        let index = if chunks.is_empty() {
            tracing::warn!("document has no text; every answer will fall back");
            VectorIndex::empty(embedder.dim())
        } else {
            VectorIndex::build(chunks, embedder.as_ref(), config.retrieval.batch_size)?
        };
        tracing::info!(pages = document.page_count(), chunks = index.len(), "query engine initialized");

        Ok(Self {
            retriever: Retriever::new(index, embedder),
            composer: PromptComposer::from_settings(&config.prompt),
            generator,
            top_k: config.retrieval.top_k,
        })
    }

    /// Answers `question`; never fails, errors come back as answer text.
    pub fn query(&self, question: &str) -> String { self.answer(question).text }

    pub fn answer(&self, question: &str) -> Answer {
        tracing::info!(question, "received query");

        let retrieved = match self.retriever.retrieve_scored(question, self.top_k) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(error = %e, "retrieval failed; answering without context");
                Vec::new()
            }
        };
        let chunks: Vec<Chunk> = retrieved.iter().map(|hit| hit.chunk.clone()).collect();
        if tracing::enabled!(tracing::Level::DEBUG) {
            let ids: Vec<usize> = chunks.iter().map(|c| c.id).collect();
            let preview: String = chunks.first().map(|c| c.text.chars().take(500).collect()).unwrap_or_default();
            tracing::debug!(?ids, %preview, "retrieved context");
        }

        let prompt = self.composer.compose(question, &chunks);
        let (text, generation_failed) = match self.generator.complete(&prompt) {
            Ok(text) => (text, false),
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::error!(error = %reason, "generation failed");
                (format!("Error: {reason}"), true)
            }
        };
        tracing::info!(answer = %text, "generated answer");

        Answer { retrieved, prompt, text, generation_failed }
    }

    pub fn index(&self) -> &VectorIndex { self.retriever.index() }

    pub fn retriever(&self) -> &Retriever { &self.retriever }

    pub fn top_k(&self) -> usize { self.top_k }
}
