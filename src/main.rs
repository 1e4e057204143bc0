use tracing_subscriber::EnvFilter;

use storefront_search::api;
use storefront_search::config::Config;
use storefront_search::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!(
        "Search index: {} (collection {})",
        config.typesense.base_url,
        config.typesense.collection
    );
    if config.llm.is_enabled() {
        tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.base_url);
    } else {
        tracing::info!("LLM provider disabled; suggestions use index terms only");
    }

    let state = AppState::new(config.clone())?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
