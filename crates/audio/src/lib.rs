//! lauscher-audio – Dekodierung und Wiedergabe auf der Empfaenger-Seite
//!
//! `codec` kapselt den Opus-Decoder (ein Decoder pro Voice-Session, der
//! Zustand traegt die Loss-Concealment-Historie), `playback` den begrenzten
//! PCM-Puffer zwischen Dekodier-Pfad und dem cpal-Ausgabegeraet.

pub mod codec;
pub mod error;
pub mod playback;

pub use codec::{VoiceDecoder, ABTASTRATE, FRAME_SAMPLES};
pub use error::{AudioError, AudioResult};
pub use playback::{playback_stream_oeffnen, PlaybackBuffer, PlaybackStream};
