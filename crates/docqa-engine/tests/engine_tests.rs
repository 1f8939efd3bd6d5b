use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use docqa_core::config::{EngineConfig, PromptSettings, RetrievalSettings};
use docqa_core::traits::{Embedder, Generator};
use docqa_core::{ChunkingConfig, Document, Error};
use docqa_embed::HashEmbedder;
use docqa_engine::prompt::EMPTY_CONTEXT;
use docqa_engine::{QueryEngine, FALLBACK_PHRASE};

const PAGES: [&str; 3] = [
    "Project Nova Brief\n\n\
     Project Nova is a rebuild of the customer portal for Acme Logistics.\n\n\
     Project lead: Evelyn Reed. Backend lead: David Chen.\n\n\
     Frontend lead: Priya Singh. QA lead: Marcus Webb.",
    "The backend codename is Orion and is written in Rust.\n\n\
     The frontend codename is Lyra and is built with React.",
    "Design phase ends in March. Go-live target is December 1, 2025.\n\n\
     Key risk: vendor delays could affect integration testing.",
];

fn nova() -> Document { Document::from_pages(PAGES) }

fn config() -> EngineConfig {
    EngineConfig {
        chunking: ChunkingConfig { chunk_size: 120, overlap: 20, boundary_window: 100 },
        retrieval: RetrievalSettings { top_k: 3, batch_size: 2 },
        prompt: PromptSettings { subject: "Project Nova".to_string() },
    }
}

struct FnGenerator<F>(F);

impl<F> Generator for FnGenerator<F>
where
    F: Fn(&str) -> anyhow::Result<String> + Send + Sync,
{
    fn complete(&self, prompt: &str) -> anyhow::Result<String> { (self.0)(prompt) }
}

fn context_of(prompt: &str) -> &str {
    let start = prompt.find("CONTEXT:\n---\n").map(|i| i + "CONTEXT:\n---\n".len()).unwrap_or(0);
    let end = prompt.rfind("\n---\n\nQUESTION:").unwrap_or(prompt.len());
    &prompt[start..end]
}

fn question_of(prompt: &str) -> &str {
    prompt.split("QUESTION: ").nth(1).and_then(|rest| rest.lines().next()).unwrap_or_default()
}

/// Answers only from facts visible in the prompt's context block.
fn grounded() -> Box<dyn Generator> {
    const FACTS: &[(&str, &str, &str)] = &[
        ("lead", "Evelyn Reed", "The project lead is Evelyn Reed."),
        ("backend", "Orion", "The backend codename is Orion."),
        ("budget", "budget", "The budget is in the document."),
    ];
    Box::new(FnGenerator(|prompt: &str| -> anyhow::Result<String> {
        let question = question_of(prompt).to_lowercase();
        let context = context_of(prompt);
        let reply = FACTS
            .iter()
            .find(|(topic, needle, _)| question.contains(topic) && context.contains(needle))
            .map_or(FALLBACK_PHRASE, |&(_, _, reply)| reply);
        Ok(reply.to_string())
    }))
}

struct Counting {
    inner: HashEmbedder,
    batches: AtomicUsize,
    texts: AtomicUsize,
    fail: AtomicBool,
}

impl Counting {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: HashEmbedder::new(512),
            batches: AtomicUsize::new(0),
            texts: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        })
    }
}

impl Embedder for Counting {
    fn dim(&self) -> usize { self.inner.dim() }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("embedding service unavailable");
        }
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.texts.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

fn hash_engine(generator: Box<dyn Generator>) -> QueryEngine {
    QueryEngine::from_document(&nova(), &config(), Arc::new(HashEmbedder::new(512)), generator).expect("engine")
}

#[test]
fn answers_from_retrieved_context() {
    let engine = hash_engine(grounded());
    let answer = engine.answer("Who is the project lead?");

    assert_eq!(answer.retrieved.len(), 3);
    assert!(answer.retrieved.iter().any(|hit| hit.chunk.text.contains("Evelyn Reed")));
    assert!(answer.prompt.contains("expert assistant for 'Project Nova'"));
    assert!(answer.text.contains("Evelyn Reed"));
    assert!(!answer.is_error());
}

#[test]
fn best_chunk_comes_first() {
    let engine = hash_engine(grounded());
    let answer = engine.answer("What is the backend codename?");
    assert!(answer.retrieved[0].chunk.text.contains("Orion"));
    for pair in answer.retrieved.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert_eq!(answer.text, "The backend codename is Orion.");
}

#[test]
fn unanswerable_question_falls_back() {
    let engine = hash_engine(grounded());
    let answer = engine.answer("What is the total budget for Project Nova?");

    assert!(answer.retrieved.iter().all(|hit| !hit.chunk.text.to_lowercase().contains("budget")));
    assert!(answer.prompt.contains(FALLBACK_PHRASE));
    assert_eq!(engine.query("What is the total budget for Project Nova?"), FALLBACK_PHRASE);
}

#[test]
fn blank_document_answers_without_context() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let generator = Box::new(FnGenerator(move |_prompt: &str| -> anyhow::Result<String> {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(FALLBACK_PHRASE.to_string())
    }));

    let engine = QueryEngine::from_document(
        &Document::from_pages(["   ", "\n\n"]),
        &config(),
        Arc::new(HashEmbedder::new(64)),
        generator,
    )
    .expect("blank documents still build");

    assert!(engine.index().is_empty());
    let answer = engine.answer("Who is the project lead?");
    assert!(answer.retrieved.is_empty());
    assert!(answer.prompt.contains(EMPTY_CONTEXT));
    assert_eq!(answer.text, FALLBACK_PHRASE);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn document_is_embedded_once_across_queries() {
    let embedder = Counting::new();
    let engine =
        QueryEngine::from_document(&nova(), &config(), embedder.clone(), grounded()).expect("engine");

    let chunks = engine.index().len();
    assert!(chunks > 3, "small chunks should split the brief, got {chunks}");
    assert_eq!(embedder.texts.load(Ordering::SeqCst), chunks);
    assert_eq!(embedder.batches.load(Ordering::SeqCst), chunks.div_ceil(2));

    for question in ["Who is the project lead?", "What is the backend codename?", "When is go-live?"] {
        engine.query(question);
    }
    assert_eq!(embedder.texts.load(Ordering::SeqCst), chunks + 3);
    assert_eq!(engine.index().len(), chunks);
}

#[test]
fn generation_failure_becomes_error_answer() {
    let generator = Box::new(FnGenerator(|_prompt: &str| -> anyhow::Result<String> {
        anyhow::bail!("API connection failed: connection refused")
    }));
    let engine = hash_engine(generator);

    let answer = engine.answer("Who is the project lead?");
    assert!(answer.is_error());
    assert!(answer.generation_failed);
    assert!(answer.text.starts_with("Error: "));
    assert!(answer.text.contains("connection refused"));
    assert_eq!(answer.retrieved.len(), 3);
}

#[test]
fn model_text_starting_with_error_is_not_a_failure() {
    let generator = Box::new(FnGenerator(|_prompt: &str| -> anyhow::Result<String> {
        Ok("Error: budget figures are not in the brief.".to_string())
    }));
    let answer = hash_engine(generator).answer("What is the total budget?");
    assert!(!answer.is_error());
    assert!(!answer.generation_failed);
    assert!(answer.text.starts_with("Error:"));
}

#[test]
fn query_embedding_failure_degrades_to_empty_context() {
    let embedder = Counting::new();
    let engine =
        QueryEngine::from_document(&nova(), &config(), embedder.clone(), grounded()).expect("engine");

    embedder.fail.store(true, Ordering::SeqCst);
    let answer = engine.answer("Who is the project lead?");
    assert!(answer.retrieved.is_empty());
    assert!(answer.prompt.contains(EMPTY_CONTEXT));
    assert_eq!(answer.text, FALLBACK_PHRASE);

    let direct = engine.retriever().retrieve("Who is the project lead?", 3).unwrap_err();
    assert!(matches!(direct, Error::Embedding(_)));
}

#[test]
fn bad_config_is_rejected_before_loading() {
    let mut bad = config();
    bad.retrieval.top_k = 0;
    let err = QueryEngine::initialize(
        std::path::Path::new("/definitely/not/here.pdf"),
        &bad,
        Arc::new(HashEmbedder::new(32)),
        grounded(),
    )
    .err();
    assert!(matches!(err, Some(Error::Config(_))));

    let mut bad = config();
    bad.chunking.overlap = bad.chunking.chunk_size;
    assert!(matches!(
        QueryEngine::from_document(&nova(), &bad, Arc::new(HashEmbedder::new(32)), grounded()),
        Err(Error::Config(_))
    ));
}

#[test]
fn missing_document_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = QueryEngine::initialize(
        &dir.path().join("project_nova_brief.pdf"),
        &config(),
        Arc::new(HashEmbedder::new(32)),
        grounded(),
    )
    .err()
    .expect("missing file must fail");
    assert!(matches!(err, Error::DocumentLoad { .. }));
    assert!(err.is_fatal());
}

#[test]
fn initializes_from_text_file_with_page_breaks() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nova.txt");
    std::fs::write(&path, PAGES.join("\u{c}")).expect("write");

    let engine =
        QueryEngine::initialize(&path, &config(), Arc::new(HashEmbedder::new(512)), grounded()).expect("engine");
    let mut pages: Vec<u32> = engine.index().chunks().map(|c| c.source_page).collect();
    pages.dedup();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(engine.query("What is the backend codename?"), "The backend codename is Orion.");
}

#[test]
fn concurrent_queries_share_one_engine() {
    let engine = hash_engine(grounded());
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.query("Who is the project lead?")))
            .collect();
        for h in handles {
            assert_eq!(h.join().expect("thread"), "The project lead is Evelyn Reed.");
        }
    });
}
