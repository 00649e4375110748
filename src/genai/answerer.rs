//! Answer synthesis from retrieved passages.

use crate::rag::RetrievedContext;

use super::client::GeminiClient;

/// Fixed answer when single-document retrieval finds nothing.
pub const NO_CONTEXT_ANSWER: &str =
    "I could not find relevant context in the document to answer that question.";

/// Fixed answer when multi-document retrieval finds nothing.
pub const NO_CONTEXT_ANSWER_MULTI: &str =
    "I could not find relevant context in the selected documents to answer that question.";

/// Passages are joined with this delimiter inside the prompt.
const CONTEXT_DELIMITER: &str = "\n---\n";

/// Answer a question from retrieved passages.
///
/// With no passages the fixed no-context answer is returned without
/// contacting the model. A failed model call is reported in-band as text,
/// never as an error: callers receive a success-shaped answer either way.
pub async fn answer(
    client: &GeminiClient,
    contexts: &[RetrievedContext],
    question: &str,
) -> String {
    if contexts.is_empty() {
        return NO_CONTEXT_ANSWER.to_string();
    }

    let context_text = contexts
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER);

    log::info!(
        "Sending {} chunks to the generative model for question: {}",
        contexts.len(),
        question
    );

    let prompt = format!(
        r#"You are a helpful document analysis assistant. Analyze the following document content and answer the user's question.

DOCUMENT CONTENT:
{context_text}

USER QUESTION: {question}

INSTRUCTIONS:
1. Carefully read and analyze the document content provided
2. Answer the question based SOLELY on the information in the document content
3. If the document contains relevant information, provide a comprehensive answer
4. If the document doesn't directly answer the question but contains related information, share what you can infer
5. Be helpful and provide as much useful information as possible from the document
6. Only say you cannot find the answer if the document content is completely irrelevant

Please provide a helpful answer based on the document content:"#
    );

    match client.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Generative model call failed: {}", e);
            format!("Error: the AI service failed to generate a response: {}", e)
        }
    }
}

/// Answer a question across passages from several documents, with
/// per-document source attribution.
///
/// `groups` pairs each document identifier with its passages, in
/// retrieval order. Same failure policy as [`answer`].
pub async fn answer_with_sources(
    client: &GeminiClient,
    groups: &[(String, Vec<RetrievedContext>)],
    question: &str,
) -> String {
    if groups.iter().all(|(_, contexts)| contexts.is_empty()) {
        return NO_CONTEXT_ANSWER_MULTI.to_string();
    }

    let mut context_text = String::new();
    for (document_id, contexts) in groups {
        context_text.push_str(&format!("\n--- DOCUMENT: {} ---\n", document_id));
        for (i, context) in contexts.iter().enumerate() {
            context_text.push_str(&format!("[Source {}]: {}\n\n", i + 1, context.content));
        }
    }

    let prompt = format!(
        r#"You are an expert document analysis assistant. Answer the question based ONLY on the provided context from multiple documents.

IMPORTANT:
- Cite which document each piece of information comes from using the source labels
- If information comes from multiple documents, mention this
- If documents contradict each other, point this out
- Only use information from the provided contexts

CONTEXT FROM MULTIPLE DOCUMENTS:
{context_text}

QUESTION: {question}

Provide a comprehensive answer that synthesizes information from all relevant documents, with clear source attribution."#
    );

    match client.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Generative model call failed: {}", e);
            format!("Error: the AI service failed to generate a response: {}", e)
        }
    }
}
