use anyhow::Result;

use docqa::genai;
use docqa::rag::retriever;
use docqa::AppState;

use crate::OutputFormat;

pub async fn run(
    state: &AppState,
    document_id: &str,
    question: &str,
    format: &OutputFormat,
) -> Result<()> {
    let contexts = retriever::retrieve(
        &state.index,
        state.embedder.as_ref(),
        question,
        document_id,
        state.config.retrieval.k,
    )
    .await;

    let answer = genai::answer(&state.genai, &contexts, question).await;

    match format {
        OutputFormat::Json => {
            let sources: Vec<serde_json::Value> = contexts
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "chunk_index": c.metadata.chunk_index,
                        "similarity": c.similarity,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "answer": answer,
                    "document_id": document_id,
                    "sources_used": sources,
                }))?
            );
        }
        OutputFormat::Plain => {
            println!("{}", answer);
            if !contexts.is_empty() {
                println!();
                println!("Supported by {} chunks:", contexts.len());
                for context in &contexts {
                    println!(
                        "  chunk {:<4} similarity {:.2}",
                        context.metadata.chunk_index, context.similarity
                    );
                }
            }
        }
    }

    Ok(())
}
