//! Playback-Puffer und cpal-Ausgabestream
//!
//! Der `PlaybackBuffer` ist die einzige Producer/Consumer-Grenze des
//! Empfaengers: der Dekodier-Pfad schreibt PCM hinein, der cpal-Callback
//! entnimmt in seinem eigenen Takt. Begrenzt auf wenige Codec-Frames um
//! Jitter zu schlucken ohne Latenz aufzubauen.
//!
//! Ueberlauf-Politik: drop-oldest. Ist der Puffer voll, weicht das
//! aelteste ungespielte Audio – der Schreib-Pfad blockiert nie.

use std::collections::VecDeque;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::codec::{ABTASTRATE, FRAME_SAMPLES};
use crate::error::{AudioError, AudioResult};

/// Puffer-Kapazitaet in Samples: vier Codec-Frames
pub const PUFFER_KAPAZITAET: usize = FRAME_SAMPLES * 4;

/// Begrenzter PCM-Puffer zwischen Dekodierer und Ausgabegeraet
///
/// Clones teilen denselben inneren Puffer (Arc). Der Lock wird nur fuer
/// eine begrenzte Kopie gehalten, nie ueber einen Systemaufruf hinweg.
#[derive(Clone)]
pub struct PlaybackBuffer {
    inner: Arc<Mutex<VecDeque<i16>>>,
    kapazitaet: usize,
}

impl PlaybackBuffer {
    /// Erstellt einen Puffer mit der Standard-Kapazitaet (4 Frames)
    pub fn neu() -> Self {
        Self::mit_kapazitaet(PUFFER_KAPAZITAET)
    }

    /// Erstellt einen Puffer mit expliziter Kapazitaet in Samples
    pub fn mit_kapazitaet(kapazitaet: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(kapazitaet))),
            kapazitaet,
        }
    }

    /// Haengt PCM-Samples an; bei Ueberlauf weicht das aelteste Audio
    ///
    /// Gibt die Anzahl verworfener Samples zurueck (0 im Normalfall).
    pub fn schreiben(&self, samples: &[i16]) -> usize {
        let mut puffer = self.inner.lock();

        // Mehr neue Samples als Kapazitaet: nur das juengste Ende behalten
        let samples = if samples.len() > self.kapazitaet {
            &samples[samples.len() - self.kapazitaet..]
        } else {
            samples
        };

        let frei = self.kapazitaet - puffer.len();
        let verworfen = samples.len().saturating_sub(frei);
        for _ in 0..verworfen {
            puffer.pop_front();
        }
        puffer.extend(samples.iter().copied());

        if verworfen > 0 {
            trace!(verworfen, "Playback-Puffer voll, aeltestes Audio verworfen");
        }
        verworfen
    }

    /// Entnimmt bis zu `ziel.len()` Samples, Rest wird mit Stille gefuellt
    ///
    /// Gibt die Anzahl tatsaechlich entnommener Samples zurueck. Laeuft im
    /// cpal-Callback-Thread.
    pub fn entnehmen(&self, ziel: &mut [i16]) -> usize {
        let mut puffer = self.inner.lock();
        let mut gelesen = 0;
        for slot in ziel.iter_mut() {
            match puffer.pop_front() {
                Some(sample) => {
                    *slot = sample;
                    gelesen += 1;
                }
                None => *slot = 0,
            }
        }
        gelesen
    }

    /// Aktueller Fuellstand in Samples
    pub fn fuellstand(&self) -> usize {
        self.inner.lock().len()
    }

    /// Kapazitaet in Samples
    pub fn kapazitaet(&self) -> usize {
        self.kapazitaet
    }
}

impl Default for PlaybackBuffer {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// cpal-Ausgabestream
// ---------------------------------------------------------------------------

/// Laufender Audio-Ausgabestream; beim Drop stoppt die Wiedergabe
pub struct PlaybackStream {
    _stream: Stream,
}

/// Oeffnet das Standard-Ausgabegeraet und laesst es den Puffer entleeren
///
/// Der Stream laeuft mono mit 48 kHz; fehlen Samples, spielt das Geraet
/// Stille (der Verbrauchs-Takt des Geraets bleibt unberuehrt).
pub fn playback_stream_oeffnen(puffer: PlaybackBuffer) -> AudioResult<PlaybackStream> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::KeinStandardAusgabegeraet)?;

    let stream_config = StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(ABTASTRATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let err_fn = |err| error!("Playback-Fehler: {}", err);

    let supported = device
        .supported_output_configs()
        .map_err(|e| AudioError::StreamFehler(e.to_string()))?
        .find(|c| {
            c.min_sample_rate().0 <= ABTASTRATE
                && c.max_sample_rate().0 >= ABTASTRATE
                && c.channels() >= 1
        });

    let sample_format = supported
        .map(|c| c.sample_format())
        .unwrap_or(SampleFormat::I16);

    let stream = match sample_format {
        SampleFormat::I16 => {
            let puffer = puffer.clone();
            device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [i16], _| {
                        puffer.entnehmen(data);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| AudioError::StreamFehler(e.to_string()))?
        }
        SampleFormat::F32 => {
            let puffer = puffer.clone();
            // Scratch-Puffer lebt im Closure; im Callback darf nicht pro
            // Quantum alloziert werden
            let mut scratch: Vec<i16> = Vec::new();
            device
                .build_output_stream(
                    &stream_config,
                    move |data: &mut [f32], _| {
                        f32_callback_fuellen(&puffer, &mut scratch, data);
                    },
                    err_fn,
                    None,
                )
                .map_err(|e| AudioError::StreamFehler(e.to_string()))?
        }
        _ => {
            return Err(AudioError::StreamFehler(format!(
                "Nicht unterstuetztes Sample-Format: {:?}",
                sample_format
            )))
        }
    };

    stream
        .play()
        .map_err(|e| AudioError::StreamFehler(e.to_string()))?;

    debug!("Playback-Stream geoeffnet: {}Hz mono", ABTASTRATE);

    Ok(PlaybackStream { _stream: stream })
}

/// Entnimmt PCM fuer einen f32-Callback und konvertiert in Gleitkomma
///
/// `scratch` waechst hoechstens bis zur groessten bisher gesehenen
/// Quantum-Groesse und wird danach wiederverwendet.
fn f32_callback_fuellen(puffer: &PlaybackBuffer, scratch: &mut Vec<i16>, data: &mut [f32]) {
    if scratch.len() < data.len() {
        scratch.resize(data.len(), 0);
    }
    let pcm = &mut scratch[..data.len()];
    puffer.entnehmen(pcm);
    for (out, sample) in data.iter_mut().zip(pcm.iter()) {
        *out = *sample as f32 / i16::MAX as f32;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
