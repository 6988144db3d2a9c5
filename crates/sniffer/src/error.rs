//! Fehlertypen fuer die Capture-Seite

use thiserror::Error;

use lauscher_core::LauscherError;

/// Fehler der Capture-Schleife – alle Varianten sind fatal fuer die
/// Schleife; ob neu gestartet wird, entscheidet der aufrufende Prozess
#[derive(Debug, Error)]
pub enum CaptureFehler {
    #[error("Capture-Geraet '{geraet}' konnte nicht geoeffnet werden: {quelle}")]
    GeraetOeffnen {
        geraet: String,
        #[source]
        quelle: pcap::Error,
    },

    #[error("Filter '{filter}' konnte nicht uebersetzt oder installiert werden: {quelle}")]
    FilterInstallieren {
        filter: String,
        #[source]
        quelle: pcap::Error,
    },

    #[error("Capture-Schleife abgebrochen: {0}")]
    Schleife(#[from] pcap::Error),
}

pub type CaptureResult<T> = Result<T, CaptureFehler>;

impl From<CaptureFehler> for LauscherError {
    fn from(fehler: CaptureFehler) -> Self {
        LauscherError::Capture(fehler.to_string())
    }
}
