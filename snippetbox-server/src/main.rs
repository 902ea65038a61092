mod server;

use std::error::Error;

use snippetbox_axum::{AppState, app_router};

use server::{ServerConfig, init_tracing, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Install default CryptoProvider for rustls
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default CryptoProvider")?;

    dotenvy::dotenv().ok();
    init_tracing("snippetbox_server");

    let config = ServerConfig::from_env()?;
    let state = AppState::from_env().await?;
    let app = app_router(state);

    serve(config, app).await
}
