//! Lauscher-Client – Empfaenger und Abspieler
//!
//! Registriert sich per Passwort beim Tunnel-Server, haelt die
//! Registrierung mit periodischen Pings am Leben und laesst die
//! Relay-Empfangs-Schleife auf demselben Socket laufen. Dekodiertes PCM
//! landet im Playback-Puffer, den der cpal-Stream entleert. Ohne
//! Audio-Ausgabe (Konfiguration) laeuft der Client kopflos weiter und
//! pflegt nur Sessions und Zaehler.

pub mod config;

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::UdpSocket;

use lauscher_audio::{playback_stream_oeffnen, PlaybackBuffer};
use lauscher_core::SessionId;
use lauscher_protocol::PING_NACHRICHT;
use lauscher_receiver::{DecodeSink, RelayReceiver, SessionTabelle};

use crate::config::ClientConfig;

/// Abstand zwischen zwei Keep-alive-Pings
const PING_INTERVALL: Duration = Duration::from_secs(2);

/// Abstand zwischen zwei Diagnose-Logzeilen
const STATISTIK_INTERVALL: Duration = Duration::from_secs(10);

/// Der Empfaenger-Client
pub struct Client {
    config: ClientConfig,
    sessions: SessionTabelle,
}

impl Client {
    /// Erstellt einen Client mit der gegebenen Konfiguration
    pub fn neu(config: ClientConfig) -> Self {
        Self {
            config,
            sessions: SessionTabelle::neu(),
        }
    }

    /// Session-Tabelle des Clients, z.B. zum Stummschalten einzelner
    /// Sessions vor oder waehrend des Laufs
    pub fn sessions(&self) -> &SessionTabelle {
        &self.sessions
    }

    /// Schaltet die Wiedergabe einer Session an oder aus
    pub fn session_aktivieren(&self, id: SessionId, aktiviert: bool) -> anyhow::Result<()> {
        self.sessions
            .aktivieren(id, aktiviert)
            .context("Session nicht umschaltbar")
    }

    /// Registriert sich beim Server und laeuft bis Strg+C
    pub async fn starten(self) -> anyhow::Result<()> {
        let server_adresse = adresse_aufloesen(&self.config.server.adresse)?;

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("Empfangs-Socket nicht bindbar")?;
        let socket = Arc::new(socket);

        registrieren(&socket, server_adresse, &self.config.server.passwort).await?;

        let puffer = PlaybackBuffer::neu();

        // Der Stream muss bis zum Prozessende am Leben bleiben, sonst
        // stoppt cpal die Wiedergabe
        let _stream = if self.config.audio.aktiviert {
            Some(playback_stream_oeffnen(puffer.clone()).context("Audio-Ausgabe nicht startbar")?)
        } else {
            tracing::info!("Audio-Ausgabe deaktiviert, Client laeuft kopflos");
            None
        };

        let sink = Arc::new(DecodeSink::neu(puffer));
        let receiver = Arc::new(RelayReceiver::neu(
            Arc::clone(&socket),
            self.sessions.clone(),
            Arc::clone(&sink),
        ));

        ping_task_starten(Arc::clone(&socket), server_adresse);
        statistik_task_starten(
            Arc::clone(&sink),
            self.sessions.clone(),
            Arc::clone(&receiver),
        );

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let empfangs_receiver = Arc::clone(&receiver);
        let empfangs_task = tokio::spawn(async move {
            empfangs_receiver.empfangs_loop_starten(shutdown_rx).await;
        });

        tracing::info!("Client laeuft, beenden mit Strg+C");
        tokio::signal::ctrl_c()
            .await
            .context("Signal-Handler fehlgeschlagen")?;
        tracing::info!("Shutdown-Signal empfangen");

        let _ = shutdown_tx.send(());
        empfangs_task
            .await
            .context("Empfangs-Schleife nicht sauber beendet")?;

        let statistik = sink.statistik();
        tracing::info!(
            dekodierte_frames = statistik.dekodierte_frames,
            dekodierte_bytes = statistik.dekodierte_bytes,
            dekodier_fehler = statistik.dekodier_fehler,
            sessions = self.sessions.anzahl(),
            "Client beendet"
        );

        Ok(())
    }
}

/// Loest "host:port" in eine Socket-Adresse auf
fn adresse_aufloesen(adresse: &str) -> anyhow::Result<SocketAddr> {
    adresse
        .to_socket_addrs()
        .with_context(|| format!("Server-Adresse '{adresse}' nicht aufloesbar"))?
        .next()
        .with_context(|| format!("Server-Adresse '{adresse}' ergab keinen Endpunkt"))
}

/// Sendet das Passwort an den Relay-Port
///
/// Der Server bestaetigt nicht; ab jetzt sollten Relay-Datagramme auf
/// diesem Socket eintreffen.
async fn registrieren(
    socket: &UdpSocket,
    server_adresse: SocketAddr,
    passwort: &str,
) -> anyhow::Result<()> {
    socket
        .send_to(passwort.as_bytes(), server_adresse)
        .await
        .with_context(|| format!("Registrierung bei {server_adresse} nicht sendbar"))?;
    tracing::info!(server = %server_adresse, "Registrierung gesendet");
    Ok(())
}

/// Periodischer Keep-alive gegen ablaufende NAT-Bindings
fn ping_task_starten(socket: Arc<UdpSocket>, server_adresse: SocketAddr) {
    tokio::spawn(async move {
        let mut intervall = tokio::time::interval(PING_INTERVALL);
        // Der erste Tick feuert sofort, direkt nach der Registrierung
        loop {
            intervall.tick().await;
            if let Err(e) = socket.send_to(PING_NACHRICHT, server_adresse).await {
                tracing::warn!(fehler = %e, server = %server_adresse, "Ping nicht sendbar");
            }
        }
    });
}

/// Periodische Diagnose-Zeile mit den Empfangs- und Dekodier-Zaehlern
fn statistik_task_starten(
    sink: Arc<DecodeSink>,
    sessions: SessionTabelle,
    receiver: Arc<RelayReceiver>,
) {
    tokio::spawn(async move {
        let mut intervall = tokio::time::interval(STATISTIK_INTERVALL);
        intervall.tick().await;
        loop {
            intervall.tick().await;
            let statistik = sink.statistik();
            tracing::info!(
                dekodierte_frames = statistik.dekodierte_frames,
                dekodierte_bytes = statistik.dekodierte_bytes,
                dekodier_fehler = statistik.dekodier_fehler,
                fehlerhafte_datagramme = receiver.fehlerhafte_datagramm_anzahl(),
                sessions = sessions.anzahl(),
                "Empfangs-Statistik"
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
