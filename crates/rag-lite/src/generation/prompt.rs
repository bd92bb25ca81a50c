//! Prompt templates for grounded answers

/// Separator placed between retrieved excerpts
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// Sentence the model is told to use when the excerpts lack the answer
pub const NOT_FOUND_ANSWER: &str =
    "I couldn't find information about that in the provided documents.";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// System instruction restricting the model to the supplied excerpts
    pub fn system_prompt() -> String {
        format!(
            "You are a helpful assistant. Answer the user's question based *only* on the provided \
             document excerpts. If the answer is not found in the excerpts, say '{}'",
            NOT_FOUND_ANSWER
        )
    }

    /// Join retrieved chunks into one context block
    pub fn build_context(contexts: &[String]) -> String {
        contexts.join(CONTEXT_SEPARATOR)
    }

    /// User message: the excerpts followed by the question
    pub fn build_user_prompt(query: &str, contexts: &[String]) -> String {
        format!(
            r#"Document Excerpts:
---
{context}
---

Question: {query}"#,
            context = Self::build_context(contexts),
            query = query
        )
    }
}
