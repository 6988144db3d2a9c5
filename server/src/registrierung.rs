//! Registrierungs-Schleife auf dem Relay-Socket
//!
//! Empfaenger melden sich an indem sie das Passwort als UDP-Datagramm an
//! den Relay-Port senden; die Absender-Adresse wird dann in die Registry
//! aufgenommen. Danach halten sie mit periodischen "ping"-Datagrammen
//! etwaige NAT-Bindings offen – der Server verwirft die Pings einfach.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use lauscher_protocol::PING_NACHRICHT;
use lauscher_sniffer::ListenerRegistry;

/// Groesster akzeptierter Registrierungs-/Ping-Inhalt
const NACHRICHT_PUFFER: usize = 512;

/// Ausgang der Verarbeitung eines eingehenden Datagramms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrierungsErgebnis {
    /// Neuer Empfaenger aufgenommen
    Registriert,
    /// Endpunkt war schon bekannt
    BereitsRegistriert,
    /// Keep-alive, nichts zu tun
    Ping,
    /// Falsches Passwort
    Abgelehnt,
}

/// Verarbeitet ein einzelnes Datagramm vom Relay-Socket
pub fn nachricht_verarbeiten(
    daten: &[u8],
    absender: SocketAddr,
    passwort: &str,
    registry: &ListenerRegistry,
) -> RegistrierungsErgebnis {
    if daten == PING_NACHRICHT {
        tracing::trace!(absender = %absender, "Ping");
        return RegistrierungsErgebnis::Ping;
    }

    if daten == passwort.as_bytes() {
        if registry.registrieren(absender) {
            RegistrierungsErgebnis::Registriert
        } else {
            RegistrierungsErgebnis::BereitsRegistriert
        }
    } else {
        // Inhalt nicht loggen, es koennte ein fast richtiges Passwort sein
        tracing::warn!(
            absender = %absender,
            laenge = daten.len(),
            "Registrierung abgelehnt: falsches Passwort"
        );
        RegistrierungsErgebnis::Abgelehnt
    }
}

/// Blockierende Empfangs-Schleife fuer Registrierungen und Pings
///
/// Laeuft bis zum Prozessende; gehoert auf einen eigenen Thread.
pub fn registrierungs_loop(socket: &UdpSocket, passwort: &str, registry: &ListenerRegistry) {
    let mut buf = [0u8; NACHRICHT_PUFFER];

    tracing::info!("Registrierungs-Schleife gestartet");

    loop {
        match socket.recv_from(&mut buf) {
            Ok((laenge, absender)) => {
                nachricht_verarbeiten(&buf[..laenge], absender, passwort, registry);
            }
            Err(e) => {
                tracing::error!(fehler = %e, "Fehler am Registrierungs-Socket");
                // Kurze Pause gegen Busy-Loop bei persistentem Fehler
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
