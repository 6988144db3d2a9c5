//! Fehlertypen fuer Lauscher
//!
//! Zentraler Fehler-Enum der alle moeglichen Fehlerzustaende abdeckt.
//! Untermodule definieren eigene Fehler und konvertieren sie hierher.

use thiserror::Error;

/// Globaler Result-Alias fuer Lauscher
pub type Result<T> = std::result::Result<T, LauscherError>;

/// Alle moeglichen Fehler im Lauscher-System
#[derive(Debug, Error)]
pub enum LauscherError {
    // --- Capture ---
    #[error("Capture-Fehler: {0}")]
    Capture(String),

    // --- Netzwerk ---
    #[error("Netzwerkfehler: {0}")]
    Netzwerk(String),

    // --- Audio ---
    #[error("Audiofehler: {0}")]
    Audio(String),

    // --- Konfiguration ---
    #[error("Konfigurationsfehler: {0}")]
    Konfiguration(String),

    // --- Intern ---
    #[error("Interner Fehler: {0}")]
    Intern(String),

    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl LauscherError {
    /// Erstellt einen internen Fehler aus einer beliebigen Nachricht
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }
}
