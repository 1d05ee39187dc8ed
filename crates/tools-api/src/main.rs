//! # Hexa Tools
//!
//! Storefront backend for the Hexa Tools shop.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export ACCESS_TOKEN_SECRET=...
//! export STRIPE_SECRET_KEY=sk_test_...
//! export DB_USER=... DB_PASS=... DB_CLUSTER=cluster0.example.mongodb.net
//!
//! # Run the server
//! hexa-tools
//! ```

use tools_api::{routes, state::AppConfig, state::AppState};
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let config = AppConfig::from_env()?;
    let addr = config.socket_addr()?;
    let is_prod = config.is_production();

    let state = AppState::from_config(config).await?;
    let store = state.store.clone();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.payments.provider_name());

    let app = routes::create_router(state);

    info!("🔧 Hexa Tools starting on http://{}", addr);
    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("💳 Payments: POST http://{}/create-payment-intent", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped, closing record store");
    if let Err(e) = store.close().await {
        error!("Failed to close record store: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
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
                error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  🔧 Hexa Tools 🔧
  ━━━━━━━━━━━━━━━━━━━━━━━
  Storefront backend
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
