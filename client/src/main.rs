//! Einstiegspunkt des Lauscher-Clients

use lauscher_client::config::{ClientConfig, LoggingEinstellungen};
use lauscher_client::Client;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let pfad = std::env::var("LAUSCHER_CONFIG")
        .unwrap_or_else(|_| "lauscher-client.toml".to_string());
    let config = ClientConfig::laden(&pfad)?;

    logging_initialisieren(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %pfad,
        server = %config.server.adresse,
        "Lauscher-Client startet"
    );

    Client::neu(config).starten().await
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
