//! lauscher-sniffer – Capture-Seite des Voice-Tunnels
//!
//! Schneidet die UDP-Voice-Pakete eines fremden Voice-Servers auf
//! Link-Layer-Ebene mit (der Server-Prozess selbst wird nicht angefasst),
//! extrahiert die Codec-Nutzdaten und verteilt sie als Relay-Datagramme
//! an alle registrierten Empfaenger.
//!
//! ## Architektur
//!
//! ```text
//! pcap (udp port N, blocking)          Registrierung (externer Kontext)
//!     |                                        |
//!     v                                        v
//! dissect::zerlegen()              ListenerRegistry (Mutex<Vec<_>>)
//!     |                                        |
//!     +----> Broadcaster::uebertragen() <- Lock halten
//!                 |
//!                 +--> je Listener ein UDP-Unicast (RelayDatagramm)
//! ```

pub mod broadcast;
pub mod capture;
pub mod error;
pub mod registry;

pub use broadcast::Broadcaster;
pub use capture::{Sniffer, SnifferConfig};
pub use error::CaptureFehler;
pub use registry::{ListenerEndpoint, ListenerRegistry};
