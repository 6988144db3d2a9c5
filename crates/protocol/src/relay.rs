//! Relay-Wire-Format (UDP, big-endian)
//!
//! Ein Relay-Datagramm transportiert genau einen Voice-Frame fuer genau
//! eine Session vom Sniffer zu einem Empfaenger. Kein Batching.
//!
//! ## Datagramm-Aufbau (Header = 10 Bytes, kein serde)
//!
//! ```text
//! Offset  Len  Beschreibung
//! ------  ---  -----------
//!  0       2   Nutzdaten-Laenge (big-endian)
//!  2       8   SessionId (big-endian)
//! 10       N   Codec-Nutzdaten (N == Nutzdaten-Laenge; darf 0 sein)
//! ```
//!
//! Leere Nutzdaten sind kein Fehler – sie signalisieren dem Empfaenger
//! einen verlorenen Frame (Loss-Concealment-Trigger).

use thiserror::Error;

use lauscher_core::SessionId;

/// Relay-Header-Laenge in Bytes
pub const RELAY_HEADER_LAENGE: usize = 10;

/// Keep-alive-Nachricht der Empfaenger an den Relay-Port
///
/// Kein Relay-Datagramm: wird vom Empfaenger periodisch roh gesendet um
/// NAT-Bindings offen zu halten, der Relay verwirft sie kommentarlos.
pub const PING_NACHRICHT: &[u8] = b"ping";

/// Maximale Nutzdaten-Laenge (durch das u16-Laengenfeld begrenzt)
pub const MAX_NUTZDATEN_LAENGE: usize = u16::MAX as usize;

/// Fehler beim Kodieren oder Dekodieren eines Relay-Datagramms
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayFehler {
    #[error("Datagramm zu kurz: {laenge} Bytes (Header braucht {RELAY_HEADER_LAENGE})")]
    DatagrammZuKurz { laenge: usize },

    #[error("Nutzdaten unvollstaendig: {deklariert} deklariert, {vorhanden} vorhanden")]
    NutzdatenUnvollstaendig { deklariert: usize, vorhanden: usize },

    #[error("Nutzdaten zu lang: {laenge} Bytes (Maximum {MAX_NUTZDATEN_LAENGE})")]
    NutzdatenZuLang { laenge: usize },
}

/// Ein Relay-Datagramm: Session-ID plus Codec-Nutzdaten
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayDatagramm {
    /// Session-ID aus dem mitgeschnittenen Voice-Header
    pub session_id: SessionId,
    /// Codec-Nutzdaten, unveraendert durchgereicht (leer = Frame-Verlust)
    pub nutzdaten: Vec<u8>,
}

impl RelayDatagramm {
    /// Erstellt ein neues Datagramm
    pub fn neu(session_id: SessionId, nutzdaten: Vec<u8>) -> Self {
        Self {
            session_id,
            nutzdaten,
        }
    }

    /// Serialisiert das Datagramm in einen Byte-Vec
    ///
    /// # Fehler
    /// `NutzdatenZuLang` wenn die Nutzdaten nicht in das u16-Laengenfeld passen
    pub fn kodieren(&self) -> Result<Vec<u8>, RelayFehler> {
        if self.nutzdaten.len() > MAX_NUTZDATEN_LAENGE {
            return Err(RelayFehler::NutzdatenZuLang {
                laenge: self.nutzdaten.len(),
            });
        }

        let mut buf = Vec::with_capacity(RELAY_HEADER_LAENGE + self.nutzdaten.len());
        buf.extend_from_slice(&(self.nutzdaten.len() as u16).to_be_bytes());
        buf.extend_from_slice(&self.session_id.inner().to_be_bytes());
        buf.extend_from_slice(&self.nutzdaten);
        Ok(buf)
    }

    /// Deserialisiert ein Datagramm aus einem Byte-Slice
    ///
    /// # Fehler
    /// - `DatagrammZuKurz` wenn nicht einmal der Header vollstaendig ist
    /// - `NutzdatenUnvollstaendig` wenn weniger Bytes folgen als deklariert
    pub fn dekodieren(buf: &[u8]) -> Result<Self, RelayFehler> {
        if buf.len() < RELAY_HEADER_LAENGE {
            return Err(RelayFehler::DatagrammZuKurz { laenge: buf.len() });
        }

        let deklariert = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        let session_id = u64::from_be_bytes([
            buf[2], buf[3], buf[4], buf[5], buf[6], buf[7], buf[8], buf[9],
        ]);

        let vorhanden = buf.len() - RELAY_HEADER_LAENGE;
        if vorhanden < deklariert {
            return Err(RelayFehler::NutzdatenUnvollstaendig {
                deklariert,
                vorhanden,
            });
        }

        Ok(Self {
            session_id: SessionId(session_id),
            nutzdaten: buf[RELAY_HEADER_LAENGE..RELAY_HEADER_LAENGE + deklariert].to_vec(),
        })
    }

    /// Gesamtgroesse des kodierten Datagramms in Bytes
    pub fn groesse(&self) -> usize {
        RELAY_HEADER_LAENGE + self.nutzdaten.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
