use anyhow::Result;
use axum::Router;
use clap::Parser;
use ragcore::RagConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Index file path (defaults to RAG_INDEX_PATH or data/rag_index.json)
    #[arg(long)]
    index: Option<PathBuf>,
    /// Default number of hits per query (defaults to RAG_TOP_K or 4)
    #[arg(long)]
    top_k: Option<usize>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let mut config = RagConfig::from_env();
    if let Some(index) = args.index {
        config.index_path = index;
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
