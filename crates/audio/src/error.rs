//! Fehlertypen fuer die Audio-Seite

use thiserror::Error;

use lauscher_core::LauscherError;

/// Alle moeglichen Fehler der Audio-Seite
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Kein Standard-Ausgabegeraet verfuegbar")]
    KeinStandardAusgabegeraet,

    #[error("Stream-Fehler: {0}")]
    StreamFehler(String),

    #[error("Codec-Fehler: {0}")]
    CodecFehler(String),
}

pub type AudioResult<T> = Result<T, AudioError>;

impl From<AudioError> for LauscherError {
    fn from(fehler: AudioError) -> Self {
        LauscherError::Audio(fehler.to_string())
    }
}
