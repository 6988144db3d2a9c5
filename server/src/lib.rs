//! Lauscher-Server – Sniffer und Relay-Verteiler
//!
//! Bindet einen UDP-Socket, ueber den beides laeuft: eingehend die
//! Registrierungen und Pings der Empfaenger, ausgehend die
//! Relay-Datagramme des Fan-outs. Die blockierende Capture-Schleife und
//! die Registrierungs-Schleife laufen auf eigenen Threads; der
//! tokio-Haupt-Task wartet nur noch auf Strg+C. Teardown ist
//! Prozess-Ende, die Threads werden nicht einzeln abgebaut.

pub mod config;
pub mod registrierung;

use std::sync::Arc;

use anyhow::Context;

use lauscher_sniffer::{Broadcaster, ListenerRegistry, Sniffer, SnifferConfig};

use crate::config::ServerConfig;

/// Der Tunnel-Server
pub struct Server {
    config: ServerConfig,
}

impl Server {
    /// Erstellt einen Server mit der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Subsysteme und laeuft bis Strg+C
    pub async fn starten(self) -> anyhow::Result<()> {
        let bind_adresse = self.config.relay_bind_adresse();
        let socket = std::net::UdpSocket::bind(&bind_adresse)
            .with_context(|| format!("Relay-Socket '{bind_adresse}' nicht bindbar"))?;
        tracing::info!(adresse = %bind_adresse, "Relay-Socket gebunden");

        let registry = ListenerRegistry::neu();

        // Der Broadcaster sendet ueber einen Klon desselben Sockets, damit
        // die Relay-Datagramme vom Port kommen den die Empfaenger kennen
        let broadcaster = Arc::new(Broadcaster::neu(
            socket.try_clone().context("Relay-Socket nicht klonbar")?,
        ));

        let sniffer_config = SnifferConfig {
            interface: self.config.capture.interface.clone(),
            voice_port: self.config.capture.voice_port,
        };
        tracing::info!(
            interface = %sniffer_config.interface,
            voice_port = sniffer_config.voice_port,
            "Starte Capture"
        );

        let sniffer = Sniffer::neu(sniffer_config, registry.clone(), broadcaster);
        std::thread::Builder::new()
            .name("capture".into())
            .spawn(move || {
                if let Err(e) = sniffer.starten() {
                    tracing::error!(fehler = %e, "Capture-Schleife abgebrochen");
                }
            })
            .context("Capture-Thread nicht startbar")?;

        let passwort = self.config.zugang.passwort.clone();
        std::thread::Builder::new()
            .name("registrierung".into())
            .spawn(move || {
                registrierung::registrierungs_loop(&socket, &passwort, &registry);
            })
            .context("Registrierungs-Thread nicht startbar")?;

        tracing::info!("Server laeuft, beenden mit Strg+C");
        tokio::signal::ctrl_c()
            .await
            .context("Signal-Handler fehlgeschlagen")?;
        tracing::info!("Shutdown-Signal empfangen, Server beendet sich");

        Ok(())
    }
}
