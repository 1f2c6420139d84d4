//! Quiz RAG server binary
//!
//! Run with: cargo run -p quiz-rag --bin quiz-rag-server -- [config.toml]

use std::path::PathBuf;

use anyhow::Context;
use quiz_rag::{config::RagConfig, server::QuizServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quiz_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration: CLI argument first, then QUIZ_RAG_CONFIG
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("QUIZ_RAG_CONFIG").map(PathBuf::from));

    let mut config = match &config_path {
        Some(path) => RagConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => RagConfig::default(),
    };

    if config.llm.gemini.api_key.is_none() {
        config.llm.gemini.api_key = std::env::var("GEMINI_API_KEY").ok();
    }
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        "Configuration loaded from {}",
        config_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );
    tracing::info!("  - LLM backend: {:?}", config.llm.provider);
    tracing::info!("  - Embedding model: {}", config.llm.embed_model);
    tracing::info!("  - Chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!("  - Quiz format: {:?}", config.generation.quiz_format);
    tracing::info!("  - Answer threshold: {}", config.answer_check.similarity_threshold);

    let server = QuizServer::new(config)?;

    // Collaborators may come up after the server; only warn here
    let state = server.state();
    for (name, healthy) in [
        (
            state.embedding_provider().name().to_string(),
            state.embedding_provider().health_check().await.unwrap_or(false),
        ),
        (
            state.llm_provider().name().to_string(),
            state.llm_provider().health_check().await.unwrap_or(false),
        ),
    ] {
        if healthy {
            tracing::info!("{} is reachable", name);
        } else {
            tracing::warn!("{} is not reachable yet; /ready will report 503", name);
        }
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
