//! Client-Konfiguration
//!
//! Gleiches Muster wie beim Server: TOML-Datei mit Standardwerten fuer
//! jede Sektion.

use serde::{Deserialize, Serialize};

/// Vollstaendige Client-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Verbindung zum Tunnel-Server
    pub server: ServerEinstellungen,
    /// Audio-Ausgabe
    pub audio: AudioEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Verbindungs-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Adresse des Relay-Ports, "host:port"
    pub adresse: String,
    /// Passwort fuer die Registrierung
    pub passwort: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            adresse: "127.0.0.1:9988".into(),
            passwort: "lauscher".into(),
        }
    }
}

/// Audio-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioEinstellungen {
    /// Wiedergabe auf dem Standard-Ausgabegeraet; ausgeschaltet laeuft der
    /// Client kopflos und pflegt nur Sessions und Zaehler
    pub aktiviert: bool,
}

impl Default for AudioEinstellungen {
    fn default() -> Self {
        Self { aktiviert: true }
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

impl ClientConfig {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config_ist_valide() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.server.adresse, "127.0.0.1:9988");
        assert!(cfg.audio.aktiviert);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn config_aus_toml_string() {
        let toml = r#"
            [server]
            adresse = "relay.example.net:9988"
            passwort = "geheim"

            [audio]
            aktiviert = false
        "#;
        let cfg: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server.adresse, "relay.example.net:9988");
        assert_eq!(cfg.server.passwort, "geheim");
        assert!(!cfg.audio.aktiviert);
        assert_eq!(cfg.logging.format, "text");
    }

    #[test]
    fn fehlende_datei_ergibt_standardwerte() {
        let cfg = ClientConfig::laden("/nirgendwo/lauscher.toml").unwrap();
        assert_eq!(cfg.server.adresse, "127.0.0.1:9988");
    }
}
