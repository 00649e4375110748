use std::path::Path;

use anyhow::Result;

use docqa::ingest;
use docqa::AppState;

use crate::OutputFormat;

pub async fn run(state: &AppState, file: &Path, format: &OutputFormat) -> Result<()> {
    let data = std::fs::read(file)?;
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");

    let outcome =
        ingest::ingest_document(&state.index, state.embedder.as_ref(), &data, filename).await?;

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "document_id": outcome.document_id,
                    "filename": filename,
                    "total_chunks_indexed": outcome.total_chunks,
                }))?
            );
        }
        OutputFormat::Plain => {
            println!("Indexed {} as {}", filename, outcome.document_id);
            println!("{} chunks stored", outcome.total_chunks);
        }
    }

    Ok(())
}
