//! Listener-Registry – geteilte Liste der registrierten Empfaenger
//!
//! Ein grober Mutex um eine geordnete Liste: der Registrierungs-Pfad haengt
//! Eintraege an, die Capture-Schleife iteriert fuer den Fan-out unter
//! demselben Lock. Contention ist niedrig (ein Schreiber, seltene Appends,
//! genau eine Capture-Schleife) – Lock-freie Strukturen lohnen hier nicht.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// Netzwerk-Endpunkt eines registrierten Empfaengers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerEndpoint(pub SocketAddr);

impl std::fmt::Display for ListenerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geteilte, Mutex-geschuetzte Liste der Empfaenger-Endpunkte
///
/// Clones teilen denselben inneren Zustand (Arc).
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Vec<ListenerEndpoint>>>,
}

impl ListenerRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Registriert einen Empfaenger-Endpunkt
    ///
    /// Gibt `false` zurueck wenn der Endpunkt bereits registriert war –
    /// doppelte Eintraege wuerden jeden Frame doppelt zustellen.
    pub fn registrieren(&self, endpunkt: SocketAddr) -> bool {
        let mut liste = self.inner.lock();
        if liste.iter().any(|e| e.0 == endpunkt) {
            tracing::debug!(endpunkt = %endpunkt, "Endpunkt bereits registriert");
            return false;
        }
        liste.push(ListenerEndpoint(endpunkt));
        tracing::info!(endpunkt = %endpunkt, anzahl = liste.len(), "Empfaenger registriert");
        true
    }

    /// Sperrt die Registry fuer einen vollstaendigen Fan-out-Durchlauf
    ///
    /// Disziplin: Lock nehmen -> iterieren -> an alle senden -> Lock
    /// freigeben. Der Guard darf nicht ueber den Durchlauf hinaus gehalten
    /// werden.
    pub fn sperren(&self) -> MutexGuard<'_, Vec<ListenerEndpoint>> {
        self.inner.lock()
    }

    /// Anzahl der registrierten Empfaenger
    pub fn anzahl(&self) -> usize {
        self.inner.lock().len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
