//! Relay-Broadcaster – Fan-out eines Voice-Frames an alle Empfaenger
//!
//! Baut pro mitgeschnittenem Voice-Frame genau ein Relay-Datagramm und
//! sendet es als eigenstaendigen UDP-Unicast an jeden registrierten
//! Endpunkt (kein Multicast). Sende-Fehler zu einem Empfaenger blockieren
//! die Zustellung an die uebrigen nicht.

use std::net::UdpSocket;
use std::sync::atomic::{AtomicU64, Ordering};

use lauscher_protocol::dissect::VoiceFrame;
use lauscher_protocol::relay::RelayDatagramm;

use crate::registry::ListenerEndpoint;

/// Sendet Relay-Datagramme an registrierte Empfaenger
pub struct Broadcaster {
    socket: UdpSocket,
    sende_fehler: AtomicU64,
}

impl Broadcaster {
    /// Erstellt einen Broadcaster auf einem bereits gebundenen Socket
    pub fn neu(socket: UdpSocket) -> Self {
        Self {
            socket,
            sende_fehler: AtomicU64::new(0),
        }
    }

    /// Uebertraegt einen Voice-Frame an alle uebergebenen Endpunkte
    ///
    /// Wird von der Capture-Schleife unter dem Registry-Lock aufgerufen.
    /// Gibt die Anzahl erfolgreich versendeter Datagramme zurueck.
    pub fn uebertragen(&self, frame: &VoiceFrame<'_>, empfaenger: &[ListenerEndpoint]) -> usize {
        if empfaenger.is_empty() {
            return 0;
        }

        let datagramm = RelayDatagramm::neu(frame.session_id, frame.nutzdaten.to_vec());
        let bytes = match datagramm.kodieren() {
            Ok(b) => b,
            Err(e) => {
                // Nutzdaten aus einem Ethernet-Frame passen immer in u16;
                // falls nicht, ist der Frame selbst nicht vertrauenswuerdig
                tracing::debug!(fehler = %e, "Relay-Datagramm nicht kodierbar, Frame verworfen");
                return 0;
            }
        };

        let mut zugestellt = 0usize;
        for endpunkt in empfaenger {
            match self.socket.send_to(&bytes, endpunkt.0) {
                Ok(_) => zugestellt += 1,
                Err(e) => {
                    self.sende_fehler.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        fehler = %e,
                        ziel = %endpunkt,
                        session_id = %frame.session_id,
                        "Relay-Zustellung fehlgeschlagen"
                    );
                }
            }
        }

        zugestellt
    }

    /// Anzahl der bisher fehlgeschlagenen Sende-Versuche
    pub fn sende_fehler_anzahl(&self) -> u64 {
        self.sende_fehler.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
