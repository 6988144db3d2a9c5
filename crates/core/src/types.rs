//! Gemeinsame Identifikationstypen fuer Lauscher
//!
//! Die Session-ID stammt aus dem mitgeschnittenen Voice-Header des fremden
//! Protokolls. Das Newtype-Pattern verhindert Verwechslungen mit anderen
//! 64-Bit-Werten zur Compilezeit.

use serde::{Deserialize, Serialize};

/// 64-Bit Voice-Session-Kennung aus dem mitgeschnittenen Voice-Header
///
/// Identifiziert einen logischen Sprach-Stream (z.B. einen sprechenden
/// Teilnehmer). Der Wert wird nicht interpretiert, nur durchgereicht.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Gibt den inneren u64-Wert zurueck
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl From<u64> for SessionId {
    fn from(wert: u64) -> Self {
        Self(wert)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}
