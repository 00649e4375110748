mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docqa::config::AppConfig;
use docqa::AppState;

#[derive(Parser)]
#[command(name = "docqa-cli", about = "Document QA service CLI", version)]
struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Parse, chunk, embed, and index a document file
    Index {
        /// Path to a .pdf, .docx, or .txt file
        file: PathBuf,
    },

    /// Ask a question against an indexed document
    Ask {
        /// Document identifier returned at indexing time
        document_id: String,
        /// The question to answer
        question: String,
    },

    /// Generate a summary of an indexed document
    Summarize {
        /// Document identifier returned at indexing time
        document_id: String,
        /// Summary style: overview, key_points, executive, or detailed
        #[arg(long, default_value = "overview")]
        style: String,
    },

    /// List indexed collections
    Collections,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let state = AppState::new(config)?;

    match cli.command {
        Command::Index { file } => commands::index::run(&state, &file, &cli.format).await,
        Command::Ask {
            document_id,
            question,
        } => commands::ask::run(&state, &document_id, &question, &cli.format).await,
        Command::Summarize { document_id, style } => {
            commands::summarize::run(&state, &document_id, &style, &cli.format).await
        }
        Command::Collections => commands::collections::run(&state, &cli.format).await,
    }
}
