use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ragcore::{default_doc_paths, existing_paths, RagConfig, RagStore};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query the local BM25 retrieval index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from files and directories (defaults to the project docs)
    Build {
        /// Files or directories to index
        paths: Vec<PathBuf>,
        /// Output index file (defaults to RAG_INDEX_PATH or data/rag_index.json)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Chunk size in characters
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Overlap between chunks in characters
        #[arg(long)]
        overlap: Option<usize>,
        /// Project root used to find the default doc paths
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Print the top hits for a query as JSON lines
    Query {
        text: String,
        #[arg(long)]
        index: Option<PathBuf>,
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Print index statistics as JSON
    Stats {
        #[arg(long)]
        index: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let config = RagConfig::from_env();

    match cli.command {
        Commands::Build { paths, output, chunk_size, overlap, root } => {
            let candidates = if paths.is_empty() { default_doc_paths(&root) } else { paths };
            let output = output.unwrap_or(config.index_path.clone());
            build(
                candidates,
                output,
                chunk_size.unwrap_or(config.chunk_size),
                overlap.unwrap_or(config.overlap),
            )
        }
        Commands::Query { text, index, top_k } => {
            let mut store = RagStore::new(index.unwrap_or(config.index_path.clone()));
            if !store.load()? {
                bail!("no index at {}; run `indexer build` first", store.index_path().display());
            }
            for hit in store.query(&text, top_k.unwrap_or(config.top_k))? {
                println!("{}", serde_json::to_string(&hit)?);
            }
            Ok(())
        }
        Commands::Stats { index } => {
            let mut store = RagStore::new(index.unwrap_or(config.index_path.clone()));
            if !store.load()? {
                bail!("no index at {}", store.index_path().display());
            }
            if let Some(index) = store.index() {
                println!("{}", serde_json::to_string_pretty(&index.stats())?);
            }
            Ok(())
        }
    }
}

fn build(candidates: Vec<PathBuf>, output: PathBuf, chunk_size: usize, overlap: usize) -> Result<()> {
    let existing = existing_paths(&candidates);
    if existing.is_empty() {
        tracing::warn!(candidates = candidates.len(), "no doc paths found to index");
        return Ok(());
    }

    let mut store = RagStore::new(&output);
    store.build_from_paths(&existing, chunk_size, overlap);
    store.save()?;

    let total_docs = store.index().map(|i| i.total_docs).unwrap_or(0);
    tracing::info!(output = %output.display(), total_docs, "index build complete");
    println!("RAG index saved to {} with {} chunks.", output.display(), total_docs);
    Ok(())
}
