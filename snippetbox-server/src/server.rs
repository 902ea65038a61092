use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::error::Error;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "0.0.0.0:4000";

pub(crate) struct ServerConfig {
    addr: SocketAddr,
    tls: Option<(String, String)>,
}

impl ServerConfig {
    /// Read `SNIPPETBOX_ADDR`, `SNIPPETBOX_TLS_CERT` and `SNIPPETBOX_TLS_KEY`.
    ///
    /// TLS is used only when both the certificate and the key are given.
    pub(crate) fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let addr = std::env::var("SNIPPETBOX_ADDR")
            .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| format!("Invalid SNIPPETBOX_ADDR: {e}"))?;

        let tls = match (
            std::env::var("SNIPPETBOX_TLS_CERT"),
            std::env::var("SNIPPETBOX_TLS_KEY"),
        ) {
            (Ok(cert), Ok(key)) => Some((cert, key)),
            (Ok(_), Err(_)) | (Err(_), Ok(_)) => {
                tracing::warn!("Only one of SNIPPETBOX_TLS_CERT and SNIPPETBOX_TLS_KEY set, serving plain HTTP");
                None
            }
            _ => None,
        };

        Ok(Self { addr, tls })
    }
}

pub(crate) async fn serve(config: ServerConfig, app: Router) -> Result<(), Box<dyn Error + Send + Sync>> {
    match config.tls {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            tracing::info!("HTTPS server listening on {}", config.addr);
            axum_server::bind_rustls(config.addr, tls)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!("HTTP server listening on {}", config.addr);
            axum_server::bind(config.addr)
                .serve(app.into_make_service())
                .await?;
        }
    }
    Ok(())
}

pub(crate) fn init_tracing(app_name: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        #[cfg(debug_assertions)]
        {
            format!(
                "snippetbox_axum=debug,snippetbox=debug,{}=debug,tower_http=debug,info",
                app_name
            )
            .into()
        }

        #[cfg(not(debug_assertions))]
        {
            "info".into()
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    #[cfg(debug_assertions)]
    tracing::info!("Debug build - showing detailed logs by default");
    tracing::info!("Set RUST_LOG to change verbosity, e.g. RUST_LOG=debug");
}
