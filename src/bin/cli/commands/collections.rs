use anyhow::Result;

use docqa::AppState;

use crate::OutputFormat;

pub async fn run(state: &AppState, format: &OutputFormat) -> Result<()> {
    let collections = {
        let index = state.index.lock().await;
        index.list_collections()?
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&collections)?);
        }
        OutputFormat::Plain => {
            if collections.is_empty() {
                println!("No documents indexed.");
                return Ok(());
            }

            println!("{:<38} {}", "Document", "Chunks");
            println!("{} {}", "\u{2500}".repeat(38), "\u{2500}".repeat(6));
            for collection in &collections {
                println!(
                    "{:<38} {}",
                    collection.document_id, collection.chunk_count
                );
            }
            println!("\n{} collections", collections.len());
        }
    }

    Ok(())
}
