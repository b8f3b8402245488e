mod config;
mod error;
mod render;
mod search;
mod server;
mod suggest;
mod timer;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tracing::info;
use tracing_subscriber::EnvFilter;

use detail_common::api::{DetailApi, HttpDetailApi};
use detail_common::config::ApiConfig;

use config::Config;
use search::SearchController;
use server::DetailLibraryServer;
use suggest::SuggestController;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting detail-library MCP server");

    let api_config = ApiConfig::from_env();
    info!(
        base_url = %api_config.base_url,
        max_error_body_bytes = api_config.max_error_body_bytes,
        "detail api configured"
    );
    let api: Arc<dyn DetailApi> = Arc::new(HttpDetailApi::new(api_config)?);

    let config = Config::from_env()?;
    info!(
        debounce_ms = config.debounce.as_millis(),
        min_autocomplete_chars = config.min_autocomplete_chars,
        blur_grace_ms = config.blur_grace.as_millis(),
        "controller timings loaded"
    );

    let search = SearchController::new(Arc::clone(&api), config);
    let suggest = SuggestController::new(Arc::clone(&api));

    // Initial listing, as shown when the page first opens. A failure is kept
    // in the search state rather than aborting startup.
    search.load_all().await;

    let server = DetailLibraryServer::new(api, search, suggest);

    info!("MCP server ready, serving on stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "MCP server error");
    })?;

    service.waiting().await?;
    info!("MCP server shut down");
    Ok(())
}
