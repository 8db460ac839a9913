mod config;
mod errors;
mod llm_client;
mod multipart;
mod routes;
mod state;
mod styling;
mod wardrobe;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::styling::advisor::{Advisor, DisabledAdvisor, LlmAdvisor};
use crate::wardrobe::images::LocalImageStore;
use crate::wardrobe::store::WardrobeStore;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Stylist API v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("Cannot create data dir {}", config.data_dir.display()))?;
    let store = Arc::new(WardrobeStore::new(&config.data_dir));
    info!("Wardrobe data in {}", config.data_dir.display());

    let images = LocalImageStore::open(&config.upload_dir)
        .await
        .with_context(|| format!("Cannot open upload dir {}", config.upload_dir.display()))?;
    info!("Uploads stored in {}", config.upload_dir.display());

    let advisor: Arc<dyn Advisor> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!(
                "Advisor enabled (model: {}, timeout: {:?})",
                llm_client::MODEL,
                config.advisor_timeout
            );
            Arc::new(LlmAdvisor(llm))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set, outfits are composed locally");
            Arc::new(DisabledAdvisor)
        }
    };

    let state = AppState {
        store,
        images: Arc::new(images),
        advisor,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
