//! Opus-Decoder Wrapper
//!
//! Kapselt audiopus hinter einer i16-PCM-API, fest auf das Tunnel-Format
//! eingestellt: mono, 48 kHz, 960 Samples pro Frame (20 ms). Der Decoder
//! traegt Zustand ueber Frames hinweg (Loss Concealment) und darf deshalb
//! weder geteilt noch pro Paket neu gebaut werden – genau eine Instanz
//! pro Voice-Session.

use audiopus::{coder::Decoder, Channels, SampleRate};
use tracing::debug;

use crate::error::{AudioError, AudioResult};

/// Abtastrate des Tunnels in Hz
pub const ABTASTRATE: u32 = 48_000;

/// Samples pro dekodiertem Frame (20 ms bei 48 kHz, mono)
pub const FRAME_SAMPLES: usize = 960;

/// Opus-Decoder fuer genau eine Voice-Session
pub struct VoiceDecoder {
    decoder: Decoder,
}

impl VoiceDecoder {
    /// Erstellt einen neuen Decoder (mono, 48 kHz)
    pub fn neu() -> AudioResult<Self> {
        let decoder = Decoder::new(SampleRate::Hz48000, Channels::Mono)
            .map_err(|e| AudioError::CodecFehler(e.to_string()))?;

        debug!("VoiceDecoder erstellt: 48kHz mono, frame_size={}", FRAME_SAMPLES);

        Ok(Self { decoder })
    }

    /// Dekodiert einen Opus-Frame zu i16-PCM
    ///
    /// # Fehler
    /// `CodecFehler` wenn der Codec die Nutzdaten ablehnt – der
    /// Decoder-Zustand bleibt dabei brauchbar, der naechste Frame kann
    /// normal dekodiert werden.
    pub fn dekodieren(&mut self, opus_daten: &[u8]) -> AudioResult<Vec<i16>> {
        let mut output = vec![0i16; FRAME_SAMPLES];
        let dekodiert = self
            .decoder
            .decode(Some(opus_daten), &mut output, false)
            .map_err(|e| AudioError::CodecFehler(e.to_string()))?;

        output.truncate(dekodiert);
        Ok(output)
    }

    /// Erzeugt einen Ersatz-Frame per Loss Concealment (kein Paket empfangen)
    ///
    /// Nutzt den inneren Decoder-Zustand um eine plausible Fortsetzung zu
    /// synthetisieren statt eine hoerbare Luecke zu lassen.
    pub fn verlust_verschleiern(&mut self) -> AudioResult<Vec<i16>> {
        let mut output = vec![0i16; FRAME_SAMPLES];
        let dekodiert = self
            .decoder
            .decode(None::<&[u8]>, &mut output, false)
            .map_err(|e| AudioError::CodecFehler(e.to_string()))?;

        output.truncate(dekodiert);
        Ok(output)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
