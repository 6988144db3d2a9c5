//! lauscher-receiver – Empfaenger-Seite des Voice-Tunnels
//!
//! Nimmt Relay-Datagramme vom Sniffer entgegen, demultiplext sie nach
//! Session-ID (ein Opus-Decoder pro Session, lazy erzeugt) und schreibt
//! das dekodierte PCM in den Playback-Puffer.
//!
//! ## Architektur
//!
//! ```text
//! UDP Socket (recv_from, eine Dispatch-Schleife)
//!     |
//!     v
//! RelayDatagramm::dekodieren()   <- Validierung, kaputte Datagramme raus
//!     |
//!     v
//! SessionTabelle                 <- Session suchen oder lazy anlegen
//!     |
//!     v
//! DecodeSink                     <- Opus -> PCM (oder PLC bei leeren
//!     |                             Nutzdaten), Zaehler pflegen
//!     v
//! PlaybackBuffer                 <- vom cpal-Callback entleert
//! ```

pub mod receiver;
pub mod session;
pub mod sink;

pub use receiver::RelayReceiver;
pub use session::{SessionTabelle, VoiceSession};
pub use sink::{DecodeSink, DecodeStatistik};
