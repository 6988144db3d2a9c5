//! Capture-Schleife – treibt die blockierende pcap-Schleife
//!
//! Oeffnet ein Live-Capture auf dem konfigurierten Interface
//! (nicht-promiskuitiv, 200 ms Lese-Timeout), installiert den Filter
//! `udp port <N>` und reicht jeden Frame an den Dissektor weiter. Erkannte
//! Voice-Frames werden unter dem Registry-Lock an alle Empfaenger verteilt.
//!
//! Die Schleife blockiert und gehoert deshalb auf einen eigenen Thread.
//! Geraet- und Filter-Fehler sind fatal und werden dem Aufrufer gemeldet;
//! fehlerhafte Einzel-Frames werden still verworfen.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use pcap::{Capture, Error as PcapError};

use lauscher_protocol::dissect;

use crate::broadcast::Broadcaster;
use crate::error::{CaptureFehler, CaptureResult};
use crate::registry::ListenerRegistry;

/// pcap-Lese-Timeout in Millisekunden
const LESE_TIMEOUT_MS: i32 = 200;

/// Konfiguration der Capture-Schleife
#[derive(Debug, Clone)]
pub struct SnifferConfig {
    /// Name des Capture-Interfaces (z.B. "eth0")
    pub interface: String,
    /// UDP-Port des fremden Voice-Servers
    pub voice_port: u16,
}

impl SnifferConfig {
    /// Der Filter-Ausdruck der auf dem Capture-Handle installiert wird
    pub fn filter_ausdruck(&self) -> String {
        format!("udp port {}", self.voice_port)
    }
}

/// Die Capture-Schleife samt Fan-out
pub struct Sniffer {
    config: SnifferConfig,
    registry: ListenerRegistry,
    broadcaster: Arc<Broadcaster>,
    voice_frames: AtomicU64,
}

impl Sniffer {
    /// Erstellt einen neuen Sniffer
    pub fn neu(
        config: SnifferConfig,
        registry: ListenerRegistry,
        broadcaster: Arc<Broadcaster>,
    ) -> Self {
        Self {
            config,
            registry,
            broadcaster,
            voice_frames: AtomicU64::new(0),
        }
    }

    /// Anzahl der bisher erkannten Voice-Frames
    pub fn voice_frame_anzahl(&self) -> u64 {
        self.voice_frames.load(Ordering::Relaxed)
    }

    /// Oeffnet das Capture-Geraet, installiert den Filter und laeuft bis
    /// zu einem nicht behebbaren Capture-Fehler
    ///
    /// Blockiert den aufrufenden Thread. Ein Neustart nach Fehler ist
    /// Sache des aufrufenden Prozesses.
    pub fn starten(&self) -> CaptureResult<()> {
        let mut capture = Capture::from_device(self.config.interface.as_str())
            .and_then(|c| c.promisc(false).timeout(LESE_TIMEOUT_MS).open())
            .map_err(|quelle| CaptureFehler::GeraetOeffnen {
                geraet: self.config.interface.clone(),
                quelle,
            })?;

        tracing::info!(geraet = %self.config.interface, "Capture-Geraet geoeffnet");

        let filter = self.config.filter_ausdruck();
        capture
            .filter(&filter, true)
            .map_err(|quelle| CaptureFehler::FilterInstallieren {
                filter: filter.clone(),
                quelle,
            })?;

        tracing::info!(filter = %filter, "Capture-Filter installiert");

        loop {
            match capture.next_packet() {
                Ok(paket) => self.frame_verarbeiten(paket.data),
                // Timeout ist der normale Leerlauf-Fall bei 200 ms Lesefenster
                Err(PcapError::TimeoutExpired) => continue,
                Err(e) => {
                    tracing::error!(fehler = %e, "Capture-Schleife abgebrochen");
                    return Err(CaptureFehler::Schleife(e));
                }
            }
        }
    }

    /// Verarbeitet einen mitgeschnittenen Frame
    ///
    /// Hot Path: fehlerhafte und fremde Frames werden mit early-return
    /// verworfen, Fan-out laeuft synchron unter dem Registry-Lock.
    fn frame_verarbeiten(&self, daten: &[u8]) {
        let voice = match dissect::zerlegen(daten) {
            Ok(Some(v)) => v,
            Ok(None) => return,
            Err(e) => {
                tracing::debug!(fehler = %e, caplen = daten.len(), "Frame verworfen");
                return;
            }
        };

        self.voice_frames.fetch_add(1, Ordering::Relaxed);

        // Lock -> iterieren -> an alle senden -> Unlock
        let empfaenger = self.registry.sperren();
        let zugestellt = self.broadcaster.uebertragen(&voice, &empfaenger);
        drop(empfaenger);

        tracing::trace!(
            session_id = %voice.session_id,
            quelle = %voice.quelle,
            bytes = voice.nutzdaten.len(),
            zugestellt,
            "Voice-Frame verteilt"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use lauscher_protocol::relay::RelayDatagramm;
    use std::net::{Ipv4Addr, UdpSocket};
    use std::time::Duration;

    fn test_socket() -> UdpSocket {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(500)))
            .unwrap();
        socket
    }

    /// Kompakter Frame-Builder fuer den Fan-out-Test (Voice-Typ 0x01)
    fn voice_frame_bytes(session_id: u64, nutzdaten: &[u8]) -> Vec<u8> {
        let ip_total = 20 + 8 + 10 + nutzdaten.len();
        let mut frame = vec![0u8; 14];
        frame[12] = 0x08; // EtherType IPv4
        frame.push(0x45);
        frame.push(0x00);
        frame.extend_from_slice(&(ip_total as u16).to_be_bytes());
        frame.extend_from_slice(&[0u8; 8]);
        frame[23] = 17; // Protokoll UDP
        frame.extend_from_slice(&[10, 0, 0, 1]);
        frame.extend_from_slice(&[10, 0, 0, 2]);
        frame.extend_from_slice(&[0u8; 8]); // UDP-Header (Inhalt egal)
        frame.push(dissect::VOICE_TYP_STIMME);
        frame.push(0x00);
        frame.extend_from_slice(&session_id.to_be_bytes());
        frame.extend_from_slice(nutzdaten);
        frame
    }

    fn sniffer_mit_registry(registry: ListenerRegistry) -> Sniffer {
        let config = SnifferConfig {
            interface: "lo".into(),
            voice_port: 9987,
        };
        Sniffer::neu(config, registry, Arc::new(Broadcaster::neu(test_socket())))
    }

    #[test]
    fn filter_ausdruck_enthaelt_port() {
        let config = SnifferConfig {
            interface: "eth0".into(),
            voice_port: 9987,
        };
        assert_eq!(config.filter_ausdruck(), "udp port 9987");
    }

    #[test]
    fn voice_frame_wird_an_alle_empfaenger_verteilt() {
        let registry = ListenerRegistry::neu();
        let empfaenger1 = test_socket();
        let empfaenger2 = test_socket();
        registry.registrieren(empfaenger1.local_addr().unwrap());
        registry.registrieren(empfaenger2.local_addr().unwrap());

        let sniffer = sniffer_mit_registry(registry);
        let nutzdaten = vec![0xCD; 30];
        sniffer.frame_verarbeiten(&voice_frame_bytes(77, &nutzdaten));

        assert_eq!(sniffer.voice_frame_anzahl(), 1);

        // Genau zwei ausgehende Relay-Datagramme, je Laengenfeld 30
        for empfaenger in [&empfaenger1, &empfaenger2] {
            let mut buf = [0u8; 1500];
            let (laenge, _) = empfaenger.recv_from(&mut buf).expect("Datagramm erwartet");
            assert_eq!(u16::from_be_bytes([buf[0], buf[1]]), 30);
            let datagramm = RelayDatagramm::dekodieren(&buf[..laenge]).unwrap();
            assert_eq!(datagramm.session_id.inner(), 77);
            assert_eq!(datagramm.nutzdaten, nutzdaten);
        }
    }

    #[test]
    fn fremde_und_kaputte_frames_zaehlen_nicht() {
        let registry = ListenerRegistry::neu();
        let empfaenger = test_socket();
        registry.registrieren(empfaenger.local_addr().unwrap());

        let sniffer = sniffer_mit_registry(registry);

        // Fremder Pakettyp
        let mut fremd = voice_frame_bytes(1, &[0xAA; 10]);
        fremd[42] = 0x09;
        sniffer.frame_verarbeiten(&fremd);

        // Abgeschnittener Frame
        sniffer.frame_verarbeiten(&[0u8; 20]);

        assert_eq!(sniffer.voice_frame_anzahl(), 0);
        assert!(
            empfaenger.recv_from(&mut [0u8; 64]).is_err(),
            "es darf kein Datagramm ankommen"
        );
    }
}
