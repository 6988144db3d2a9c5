//! Session-Multiplexer – Decoder-Zustand pro Voice-Session
//!
//! Jede Session-ID bekommt beim ersten Sichten lazy einen eigenen
//! Opus-Decoder; der traegt Loss-Concealment-Zustand und wird deshalb nie
//! pro Paket neu gebaut. Sessions leben bis zum Prozessende – das ist eine
//! bewusste Vereinfachung des Originals. Als Haken fuer eine externe
//! Eviction-Politik existiert `entfernen_wenn`; von sich aus raeumt die
//! Tabelle nichts weg.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use lauscher_audio::{AudioResult, VoiceDecoder};
use lauscher_core::SessionId;

/// Zustand einer Voice-Session auf der Empfaenger-Seite
pub struct VoiceSession {
    /// Session-ID aus dem Relay-Header
    pub id: SessionId,
    /// Wird diese Session hoerbar abgespielt?
    pub aktiviert: bool,
    /// Der Decoder dieser Session – genau eine Instanz, nie geteilt
    pub decoder: VoiceDecoder,
}

impl VoiceSession {
    fn neu(id: SessionId, aktiviert: bool) -> AudioResult<Self> {
        Ok(Self {
            id,
            aktiviert,
            decoder: VoiceDecoder::neu()?,
        })
    }
}

/// Tabelle aller bekannten Voice-Sessions
///
/// Grober Mutex: geschrieben wird aus genau zwei Kontexten (Dispatch-
/// Schleife und externe Session-Steuerung), gelesen im Dispatch-Takt.
/// Clones teilen denselben inneren Zustand (Arc).
#[derive(Clone, Default)]
pub struct SessionTabelle {
    inner: Arc<Mutex<HashMap<SessionId, VoiceSession>>>,
}

impl SessionTabelle {
    /// Erstellt eine leere Tabelle
    pub fn neu() -> Self {
        Self::default()
    }

    /// Fuehrt `f` auf der Session aus; legt sie bei Bedarf vorher an
    ///
    /// Neue Sessions starten aktiviert (hoerbar). `f` erhaelt zusaetzlich
    /// ob die Session gerade erst erzeugt wurde.
    ///
    /// # Fehler
    /// `CodecFehler` wenn der Decoder fuer eine neue Session nicht
    /// erzeugbar ist – die Tabelle bleibt dann unveraendert.
    pub fn mit_session<F, R>(&self, id: SessionId, f: F) -> AudioResult<R>
    where
        F: FnOnce(&mut VoiceSession, bool) -> R,
    {
        use std::collections::hash_map::Entry;

        let mut tabelle = self.inner.lock();
        let (session, neu) = match tabelle.entry(id) {
            Entry::Occupied(eintrag) => (eintrag.into_mut(), false),
            Entry::Vacant(eintrag) => {
                let session = VoiceSession::neu(id, true)?;
                tracing::info!(session_id = %id, "Neue Voice-Session");
                (eintrag.insert(session), true)
            }
        };
        Ok(f(session, neu))
    }

    /// Schaltet die Wiedergabe einer Session an oder aus
    ///
    /// Der Decoder-Zustand bleibt unberuehrt – Deaktivieren stummt nur,
    /// damit das Wieder-Aktivieren nicht hoerbar glitcht. Ist die Session
    /// noch nie gesichtet worden, wird sie im gewuenschten Zustand
    /// angelegt.
    pub fn aktivieren(&self, id: SessionId, aktiviert: bool) -> AudioResult<()> {
        let mut tabelle = self.inner.lock();
        match tabelle.get_mut(&id) {
            Some(session) => {
                session.aktiviert = aktiviert;
            }
            None => {
                tabelle.insert(id, VoiceSession::neu(id, aktiviert)?);
                tracing::debug!(
                    session_id = %id,
                    aktiviert,
                    "Session vor erstem Sichten angelegt"
                );
            }
        }
        tracing::debug!(session_id = %id, aktiviert, "Session-Wiedergabe umgeschaltet");
        Ok(())
    }

    /// Gibt den Aktivierungszustand zurueck, falls die Session bekannt ist
    pub fn ist_aktiviert(&self, id: SessionId) -> Option<bool> {
        self.inner.lock().get(&id).map(|s| s.aktiviert)
    }

    /// Alle bekannten Session-IDs (fuer Diagnose/Anzeige)
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.inner.lock().keys().copied().collect()
    }

    /// Anzahl bekannter Sessions
    pub fn anzahl(&self) -> usize {
        self.inner.lock().len()
    }

    /// Eviction-Haken: entfernt alle Sessions auf die das Praedikat passt
    ///
    /// Wird von der Tabelle selbst nie aufgerufen; eine Eviction-Politik
    /// muss von aussen kommen. Gibt die Anzahl entfernter Sessions zurueck.
    pub fn entfernen_wenn<F>(&self, mut praedikat: F) -> usize
    where
        F: FnMut(&VoiceSession) -> bool,
    {
        let mut tabelle = self.inner.lock();
        let vorher = tabelle.len();
        tabelle.retain(|_, session| !praedikat(session));
        vorher - tabelle.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
