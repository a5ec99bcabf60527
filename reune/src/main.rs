use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reune::api::{create_router, AppState};
use reune::config::Config;
use reune::db::{Database, LibSqlBackend};
use reune::llm::LlmProvider;
use reune::rpc::{EventPlanRpc, HttpRpcClient};

#[derive(Parser)]
#[command(name = "reune")]
#[command(about = "Conversational planning core for ReUNE events")]
struct Args {
    /// Bind address, overrides REUNE_HOST
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides REUNE_PORT
    #[arg(long)]
    port: Option<u16>,

    /// Skip the chat model and analyze messages with keyword rules only
    #[arg(long)]
    heuristic_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.heuristic_only {
        config.conversation.enable_llm_analysis = false;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "reune=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.server.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if config.server.api_keys.is_empty() {
        tracing::warn!("REUNE_API_KEYS is not set, every protected route will answer 401");
    }

    tracing::info!("Initializing database...");
    let db = Database::new(&config.database).await?;
    let backend = Arc::new(LibSqlBackend::new(db));

    if let Some(llm_config) = &config.llm {
        tracing::info!("Initializing LLM provider: {}...", llm_config.model);
    }
    let llm = LlmProvider::new(config.llm.as_ref());
    if !llm.is_available() {
        tracing::warn!("LLM unavailable - messages will be analyzed with keyword rules");
    } else if !config.conversation.enable_llm_analysis {
        tracing::info!("LLM analysis disabled - messages will be analyzed with keyword rules");
    }

    let rpc = HttpRpcClient::new(config.rpc.as_ref())?;
    if !rpc.is_available() {
        tracing::warn!("RPC_BASE_URL is not set - event plans will not be read or written");
    }

    let state = AppState::new(config.clone(), backend, llm, Arc::new(rpc));
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("ReUNE starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
