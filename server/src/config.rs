//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! Standardwerte, der Server ist also auch ohne Konfigurationsdatei
//! lauffaehig.

use serde::{Deserialize, Serialize};

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Capture-Einstellungen (pcap)
    pub capture: CaptureEinstellungen,
    /// Netzwerk-Einstellungen (Relay-Socket)
    pub netzwerk: NetzwerkEinstellungen,
    /// Zugangs-Einstellungen
    pub zugang: ZugangEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Capture-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureEinstellungen {
    /// Name des Capture-Interfaces (z.B. "eth0")
    pub interface: String,
    /// UDP-Port des belauschten Voice-Servers
    pub voice_port: u16,
}

impl Default for CaptureEinstellungen {
    fn default() -> Self {
        Self {
            interface: "eth0".into(),
            voice_port: 9987,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den Relay-Socket
    pub bind_adresse: String,
    /// Port fuer Registrierung (eingehend) und Relay-Versand (ausgehend)
    pub relay_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            relay_port: 9988,
        }
    }
}

/// Zugangs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZugangEinstellungen {
    /// Passwort das ein Empfaenger zur Registrierung senden muss
    pub passwort: String,
}

impl Default for ZugangEinstellungen {
    fn default() -> Self {
        Self {
            passwort: "lauscher".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei
    ///
    /// Fehlt die Datei, kommt die Standardkonfiguration zurueck (mit
    /// Warnung); eine vorhandene aber kaputte Datei ist ein Fehler.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Vollstaendige Bind-Adresse des Relay-Sockets
    pub fn relay_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.relay_port)
    }
}
