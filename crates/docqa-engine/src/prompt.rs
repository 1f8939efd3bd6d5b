//! Grounded prompt assembly.
//!
//! The template confines the model to the retrieved context and tells it to
//! reply with [`FALLBACK_PHRASE`] verbatim when the context has no answer.
//! Evaluation matches on that exact text, so it is never reworded here.

use docqa_core::config::PromptSettings;
use docqa_core::types::Chunk;

pub const FALLBACK_PHRASE: &str = "I do not have information on this topic based on the provided document.";

/// Placed between consecutive chunk texts.
pub const CONTEXT_SEPARATOR: &str = "\n\n* * *\n\n";

/// Stands in for the context block when nothing was retrieved.
pub const EMPTY_CONTEXT: &str = "(no relevant context was found in the document)";

#[derive(Debug, Clone)]
pub struct PromptComposer {
    subject: String,
}

impl Default for PromptComposer {
    fn default() -> Self { Self::from_settings(&PromptSettings::default()) }
}

impl PromptComposer {
    pub fn new(subject: impl Into<String>) -> Self { Self { subject: subject.into() } }

    pub fn from_settings(settings: &PromptSettings) -> Self { Self::new(settings.subject.clone()) }

    pub fn compose(&self, question: &str, chunks: &[Chunk]) -> String {
        let context = if chunks.is_empty() {
            EMPTY_CONTEXT.to_string()
        } else {
            chunks.iter().map(|c| c.text.trim()).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
        };
        format!(
            "You are an expert assistant for '{subject}'. Your task is to answer questions accurately based ONLY on the provided context.\n\
             If the answer is not available in the context, clearly state \"{FALLBACK_PHRASE}\" Do not make up information.\n\
             \n\
             CONTEXT:\n\
             ---\n\
             {context}\n\
             ---\n\
             \n\
             QUESTION: {question}\n\
             \n\
             ANSWER:\n",
            subject = self.subject,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(id: usize, text: &str) -> Chunk {
        Chunk { id, text: text.to_string(), source_page: 1, char_span: 0..text.len() }
    }

    #[test]
    fn joins_chunks_in_order_and_appends_question() {
        let composer = PromptComposer::new("Project Nova");
        let prompt = composer.compose(
            "Who is the project lead?",
            &[chunk(4, "Project lead: Evelyn Reed."), chunk(1, "Backend lead: David Chen.")],
        );
        assert!(prompt.contains("expert assistant for 'Project Nova'"));
        assert!(prompt.contains(&format!("Project lead: Evelyn Reed.{CONTEXT_SEPARATOR}Backend lead: David Chen.")));
        assert!(prompt.contains("QUESTION: Who is the project lead?\n"));
        assert!(prompt.trim_end().ends_with("ANSWER:"));
        let context_at = prompt.find("CONTEXT:").unwrap_or(usize::MAX);
        let question_at = prompt.find("QUESTION:").unwrap_or(0);
        assert!(context_at < question_at);
    }

    #[test]
    fn unrelated_context_still_carries_fallback_instruction() {
        let prompt = PromptComposer::default().compose(
            "What is the total budget?",
            &[chunk(0, "The Lyra frontend uses React and TypeScript.")],
        );
        assert!(prompt.contains(&format!("\"{FALLBACK_PHRASE}\"")));
        assert!(prompt.contains("based ONLY on the provided context"));
    }

    #[test]
    fn empty_context_is_still_a_valid_prompt() {
        let prompt = PromptComposer::default().compose("Is the project ahead of schedule?", &[]);
        assert!(prompt.contains(EMPTY_CONTEXT));
        assert!(prompt.contains(FALLBACK_PHRASE));
        assert!(prompt.contains("QUESTION: Is the project ahead of schedule?"));
    }

    #[test]
    fn question_is_kept_verbatim() {
        let question = "  What's the go-live date?? ";
        let prompt = PromptComposer::default().compose(question, &[]);
        assert!(prompt.contains(&format!("QUESTION: {question}\n")));
    }
}
