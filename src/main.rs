use anyhow::Result;
use clap::Parser;
use little_language_lessons::ai::{GeminiModelAdapter, RetryPolicy, Retrying};
use little_language_lessons::config::Config;
use little_language_lessons::server::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "little-language-lessons")]
#[command(about = "Serve contextual language lessons generated by Gemini")]
struct CliArgs {
    /// Address to listen on, overriding BIND_ADDRESS.
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "little_language_lessons=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;
    let bind = args.bind.unwrap_or(config.bind_address);

    info!(
        "Using text model {} and vision model {}",
        config.gemini_model, config.gemini_vision_model
    );
    let adapter = Retrying::new(
        GeminiModelAdapter::from_config(&config),
        RetryPolicy::new(config.max_attempts),
    );
    let state = AppState::from_config(&config, Arc::new(adapter))?;
    let pruner = state.limiter.spawn_pruning(Duration::from_secs(60));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Little Language Lessons API listening on {}", listener.local_addr()?);

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    pruner.abort();
    Ok(())
}
