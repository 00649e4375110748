use anyhow::Result;

use docqa::genai::{summarize, SummaryStyle};
use docqa::AppState;

use crate::OutputFormat;

pub async fn run(
    state: &AppState,
    document_id: &str,
    style: &str,
    format: &OutputFormat,
) -> Result<()> {
    let style = SummaryStyle::parse(style)
        .ok_or_else(|| anyhow::anyhow!("Unknown summary style: {}", style))?;

    let chunks = {
        let index = state.index.lock().await;
        index.get_chunks(document_id)?
    };
    if chunks.is_empty() {
        anyhow::bail!("Document {} not found or has no content", document_id);
    }

    let texts: Vec<String> = chunks.into_iter().map(|c| c.content).collect();
    let summary = summarize(&state.genai, &texts, style).await;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "document_id": document_id,
                    "summary_type": style.tag(),
                    "ai_summary": summary,
                }))?
            );
        }
        OutputFormat::Plain => {
            println!("{}", summary);
        }
    }

    Ok(())
}
