//! docqa-engine
//!
//! Retrieval, prompt assembly, the chat-completions client and the query
//! engine that ties them to a built index.

pub mod engine;
pub mod generation;
pub mod prompt;
pub mod retriever;

pub use engine::{Answer, QueryEngine};
pub use generation::ChatCompletionsClient;
pub use prompt::{PromptComposer, FALLBACK_PHRASE};
pub use retriever::Retriever;
