//! Dekodier-Senke – Opus-Nutzdaten in den Playback-Puffer
//!
//! Verarbeitet die demultiplexten Nutzdaten einer Session: normaler
//! Opus-Frame wird dekodiert, leere Nutzdaten (Frame-Verlust-Signal)
//! laufen durch das Loss Concealment, damit der Verbrauchs-Takt des
//! Ausgabegeraets keine Luecke sieht. Dekodier-Fehler werden gezaehlt
//! und verworfen – sie sind nie fatal, weder fuer die Session noch fuer
//! den Prozess.

use std::sync::atomic::{AtomicU64, Ordering};

use lauscher_audio::PlaybackBuffer;

use crate::session::VoiceSession;

/// Read-only Momentaufnahme der Dekodier-Zaehler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeStatistik {
    /// Erfolgreich dekodierte Frames (inklusive Concealment-Frames)
    pub dekodierte_frames: u64,
    /// Dabei erzeugte PCM-Bytes
    pub dekodierte_bytes: u64,
    /// Vom Codec abgelehnte Frames
    pub dekodier_fehler: u64,
}

/// Senke fuer demultiplexte Voice-Nutzdaten
pub struct DecodeSink {
    puffer: PlaybackBuffer,
    dekodierte_frames: AtomicU64,
    dekodierte_bytes: AtomicU64,
    dekodier_fehler: AtomicU64,
}

impl DecodeSink {
    /// Erstellt eine Senke die in den gegebenen Puffer schreibt
    pub fn neu(puffer: PlaybackBuffer) -> Self {
        Self {
            puffer,
            dekodierte_frames: AtomicU64::new(0),
            dekodierte_bytes: AtomicU64::new(0),
            dekodier_fehler: AtomicU64::new(0),
        }
    }

    /// Verarbeitet die Nutzdaten eines Relay-Datagramms fuer eine Session
    ///
    /// Deaktivierte Sessions werden uebersprungen (stumm); ihr Decoder
    /// bleibt unveraendert stehen.
    pub fn verarbeiten(&self, session: &mut VoiceSession, nutzdaten: &[u8]) {
        if !session.aktiviert {
            return;
        }

        let ergebnis = if nutzdaten.is_empty() {
            // Frame-Verlust: Concealment statt Luecke
            session.decoder.verlust_verschleiern()
        } else {
            session.decoder.dekodieren(nutzdaten)
        };

        let pcm = match ergebnis {
            Ok(pcm) => pcm,
            Err(e) => {
                self.dekodier_fehler.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    session_id = %session.id,
                    fehler = %e,
                    bytes = nutzdaten.len(),
                    "Frame nicht dekodierbar, verworfen"
                );
                return;
            }
        };

        self.dekodierte_frames.fetch_add(1, Ordering::Relaxed);
        self.dekodierte_bytes
            .fetch_add((pcm.len() * 2) as u64, Ordering::Relaxed);

        let verworfen = self.puffer.schreiben(&pcm);
        if verworfen > 0 {
            tracing::trace!(
                session_id = %session.id,
                verworfen,
                "Playback-Puffer lief ueber"
            );
        }
    }

    /// Momentaufnahme der Zaehler
    pub fn statistik(&self) -> DecodeStatistik {
        DecodeStatistik {
            dekodierte_frames: self.dekodierte_frames.load(Ordering::Relaxed),
            dekodierte_bytes: self.dekodierte_bytes.load(Ordering::Relaxed),
            dekodier_fehler: self.dekodier_fehler.load(Ordering::Relaxed),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionTabelle;
    use audiopus::{coder::Encoder, Application, Channels, SampleRate};
    use lauscher_audio::FRAME_SAMPLES;
    use lauscher_core::SessionId;

    fn opus_frame() -> Vec<u8> {
        let mut encoder =
            Encoder::new(SampleRate::Hz48000, Channels::Mono, Application::Voip).unwrap();
        let pcm: Vec<i16> = (0..FRAME_SAMPLES)
            .map(|i| ((i as f32 * 0.03).sin() * 6000.0) as i16)
            .collect();
        let mut out = vec![0u8; 4000];
        let n = encoder.encode(&pcm, &mut out).unwrap();
        out.truncate(n);
        out
    }

    fn sink_mit_puffer(kapazitaet: usize) -> (DecodeSink, PlaybackBuffer) {
        let puffer = PlaybackBuffer::mit_kapazitaet(kapazitaet);
        (DecodeSink::neu(puffer.clone()), puffer)
    }

    #[test]
    fn normaler_frame_landet_im_puffer() {
        let (sink, puffer) = sink_mit_puffer(FRAME_SAMPLES * 4);
        let tabelle = SessionTabelle::neu();

        tabelle
            .mit_session(SessionId(1), |session, _| {
                sink.verarbeiten(session, &opus_frame());
            })
            .unwrap();

        assert_eq!(puffer.fuellstand(), FRAME_SAMPLES);
        let statistik = sink.statistik();
        assert_eq!(statistik.dekodierte_frames, 1);
        assert_eq!(statistik.dekodierte_bytes, (FRAME_SAMPLES * 2) as u64);
        assert_eq!(statistik.dekodier_fehler, 0);
    }

    #[test]
    fn leere_nutzdaten_ergeben_concealment_frame() {
        let (sink, puffer) = sink_mit_puffer(FRAME_SAMPLES * 4);
        let tabelle = SessionTabelle::neu();

        tabelle
            .mit_session(SessionId(1), |session, _| {
                sink.verarbeiten(session, &[]);
            })
            .unwrap();

        // Genau ein Frame Ersatz-PCM, kein Fehler-Inkrement
        assert_eq!(puffer.fuellstand(), FRAME_SAMPLES);
        let statistik = sink.statistik();
        assert_eq!(statistik.dekodierte_frames, 1);
        assert_eq!(statistik.dekodier_fehler, 0);
    }

    #[test]
    fn deaktivierte_session_schreibt_nichts() {
        let (sink, puffer) = sink_mit_puffer(FRAME_SAMPLES * 4);
        let tabelle = SessionTabelle::neu();
        tabelle.aktivieren(SessionId(1), false).unwrap();

        tabelle
            .mit_session(SessionId(1), |session, _| {
                sink.verarbeiten(session, &opus_frame());
            })
            .unwrap();

        assert_eq!(puffer.fuellstand(), 0, "stumme Session darf nichts schreiben");
        assert_eq!(sink.statistik().dekodierte_frames, 0);

        // Wieder aktivieren: der naechste normale Frame spielt sofort
        tabelle.aktivieren(SessionId(1), true).unwrap();
        tabelle
            .mit_session(SessionId(1), |session, _| {
                sink.verarbeiten(session, &opus_frame());
            })
            .unwrap();
        assert_eq!(puffer.fuellstand(), FRAME_SAMPLES);
    }

    #[test]
    fn kaputte_nutzdaten_erhoehen_nur_den_fehlerzaehler() {
        let (sink, puffer) = sink_mit_puffer(FRAME_SAMPLES * 4);
        let tabelle = SessionTabelle::neu();

        tabelle
            .mit_session(SessionId(1), |session, _| {
                // Laenger als jedes gueltige Opus-Paket
                sink.verarbeiten(session, &[0xFF; 2000]);
                // Session verarbeitet danach normal weiter
                sink.verarbeiten(session, &opus_frame());
            })
            .unwrap();

        let statistik = sink.statistik();
        assert_eq!(statistik.dekodier_fehler, 1);
        assert_eq!(statistik.dekodierte_frames, 1);
        assert_eq!(puffer.fuellstand(), FRAME_SAMPLES);
    }

    #[test]
    fn puffer_ueberlauf_ist_kein_fehler() {
        // Kapazitaet: ein Frame – der zweite verdraengt den ersten
        let (sink, puffer) = sink_mit_puffer(FRAME_SAMPLES);
        let tabelle = SessionTabelle::neu();

        tabelle
            .mit_session(SessionId(1), |session, _| {
                sink.verarbeiten(session, &opus_frame());
                sink.verarbeiten(session, &opus_frame());
            })
            .unwrap();

        assert_eq!(puffer.fuellstand(), FRAME_SAMPLES);
        assert_eq!(sink.statistik().dekodierte_frames, 2);
        assert_eq!(sink.statistik().dekodier_fehler, 0);
    }
}
