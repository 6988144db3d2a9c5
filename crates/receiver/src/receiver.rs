//! Relay-Receiver – die Dispatch-Schleife des Empfaengers
//!
//! Eine einzelne Schleife auf einem UDP-Socket: jedes eintreffende
//! Relay-Datagramm wird dekodiert, ueber die Session-Tabelle der
//! richtigen Session zugeordnet und an die Dekodier-Senke gereicht.
//! Kaputte Datagramme werden gezaehlt und verworfen; kein Fehler in
//! dieser Schleife beendet den Prozess.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::UdpSocket;

use lauscher_protocol::relay::RelayDatagramm;

use crate::sink::DecodeSink;
use crate::session::SessionTabelle;

/// Maximale Relay-Datagramm-Groesse (Header 10 + u16-Nutzdaten)
const UDP_PUFFER_GROESSE: usize = 10 + u16::MAX as usize;

/// Empfangs-Schleife fuer Relay-Datagramme
pub struct RelayReceiver {
    socket: Arc<UdpSocket>,
    sessions: SessionTabelle,
    sink: Arc<DecodeSink>,
    fehlerhafte_datagramme: AtomicU64,
}

impl RelayReceiver {
    /// Erstellt einen Receiver auf einem bereits gebundenen Socket
    pub fn neu(socket: Arc<UdpSocket>, sessions: SessionTabelle, sink: Arc<DecodeSink>) -> Self {
        Self {
            socket,
            sessions,
            sink,
            fehlerhafte_datagramme: AtomicU64::new(0),
        }
    }

    /// Anzahl verworfener, nicht parsbarer Datagramme
    pub fn fehlerhafte_datagramm_anzahl(&self) -> u64 {
        self.fehlerhafte_datagramme.load(Ordering::Relaxed)
    }

    /// Startet die Empfangs-Schleife (laeuft bis zum Shutdown-Signal)
    ///
    /// Diese Methode blockiert die aufrufende Task bis `shutdown_rx`
    /// ausloest.
    pub async fn empfangs_loop_starten(
        &self,
        mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
    ) {
        let mut buf = vec![0u8; UDP_PUFFER_GROESSE];

        tracing::info!("Relay-Empfangs-Schleife gestartet");

        loop {
            tokio::select! {
                result = self.socket.recv_from(&mut buf) => {
                    match result {
                        Ok((laenge, _absender)) => {
                            self.datagramm_verarbeiten(&buf[..laenge]);
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "UDP-Empfangsfehler");
                            // Kurze Pause gegen Busy-Loop bei persistentem Fehler
                            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
                        }
                    }
                }

                _ = &mut shutdown_rx => {
                    tracing::info!("Relay-Receiver: Shutdown-Signal empfangen");
                    break;
                }
            }
        }

        tracing::info!("Relay-Empfangs-Schleife beendet");
    }

    /// Verarbeitet ein einzelnes Datagramm
    ///
    /// Hot Path: kaputte Datagramme frueh verwerfen, keine Session-Mutation
    /// bei Parse-Fehlern.
    fn datagramm_verarbeiten(&self, daten: &[u8]) {
        let datagramm = match RelayDatagramm::dekodieren(daten) {
            Ok(d) => d,
            Err(e) => {
                self.fehlerhafte_datagramme.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(fehler = %e, laenge = daten.len(), "Relay-Datagramm verworfen");
                return;
            }
        };

        let ergebnis = self.sessions.mit_session(datagramm.session_id, |session, _| {
            self.sink.verarbeiten(session, &datagramm.nutzdaten);
        });

        if let Err(e) = ergebnis {
            // Decoder fuer eine neue Session nicht erzeugbar – Datagramm
            // verwerfen, die naechste Sichtung versucht es erneut
            tracing::warn!(
                session_id = %datagramm.session_id,
                fehler = %e,
                "Session nicht anlegbar"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
