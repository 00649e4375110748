//! Generative-model integration: answer synthesis and summarization.

mod answerer;
mod client;
mod summarizer;

pub use answerer::{answer, answer_with_sources, NO_CONTEXT_ANSWER, NO_CONTEXT_ANSWER_MULTI};
pub use client::{GeminiClient, GenAiError};
pub use summarizer::{summarize, SummaryStyle};
