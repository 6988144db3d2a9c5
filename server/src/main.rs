//! Einstiegspunkt des Lauscher-Servers

use lauscher_server::config::{LoggingEinstellungen, ServerConfig};
use lauscher_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let pfad = std::env::var("LAUSCHER_CONFIG")
        .unwrap_or_else(|_| "lauscher-server.toml".to_string());
    let config = ServerConfig::laden(&pfad)?;

    logging_initialisieren(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %pfad,
        "Lauscher-Server startet"
    );

    Server::neu(config).starten().await
}

/// Initialisiert das Logging gemaess Konfiguration
///
/// `RUST_LOG` hat Vorrang vor dem konfigurierten Level.
fn logging_initialisieren(logging: &LoggingEinstellungen) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
