//! lauscher-protocol – Reine Parsing-Logik, kein I/O
//!
//! Zwei Wire-Formate:
//! - `dissect`: zerlegt rohe Link-Layer-Frames (Ethernet/IPv4/UDP/Voice-Header)
//!   und extrahiert die Opus-Nutzdaten samt Session-ID.
//! - `relay`: das eigene UDP-Relay-Format, mit dem ein Voice-Frame vom
//!   Sniffer zu den registrierten Empfaengern transportiert wird.

pub mod dissect;
pub mod relay;

pub use dissect::{DissectFehler, VoiceFrame};
pub use relay::{RelayDatagramm, RelayFehler, PING_NACHRICHT};
