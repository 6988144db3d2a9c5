//! Header-Dissektor – zerlegt rohe Link-Layer-Frames
//!
//! Laeuft die Header-Kette Ethernet -> IPv4 -> UDP -> Voice-Header ab und
//! extrahiert die Codec-Nutzdaten samt Session-ID. Reines Parsing auf einem
//! Byte-Slice, jede Laenge wird vor dem Zugriff gegen die Capture-Laenge
//! geprueft – ein geloggtes IP-Total-Length-Feld kann nie zu einem
//! Out-of-Bounds-Zugriff fuehren.
//!
//! ## Frame-Aufbau
//!
//! ```text
//! Offset  Len  Beschreibung
//! ------  ---  -----------
//!  0      14   Ethernet-Header (keine VLAN-Tags)
//! 14      20   IPv4-Header (keine Optionen – bekannte Einschraenkung)
//! 34       8   UDP-Header
//! 42      10   Voice-Header: Typ (1), opak (1), SessionId (8, big-endian)
//! 52       N   Opus-Nutzdaten
//! ```
//!
//! Am Frame-Ende kann Ethernet-Padding haengen (Frames unter 60 Bytes werden
//! vom Treiber aufgefuellt); die Nutzdaten-Laenge wird deshalb aus dem
//! IP-Total-Length-Feld abgeleitet, nicht aus der Capture-Laenge allein.

use std::net::Ipv4Addr;

use thiserror::Error;

use lauscher_core::SessionId;

/// Ethernet-Header-Laenge (ohne VLAN-Tags)
pub const ETHERNET_HEADER_LAENGE: usize = 14;
/// IPv4-Header-Laenge (ohne Optionen)
pub const IPV4_HEADER_LAENGE: usize = 20;
/// UDP-Header-Laenge
pub const UDP_HEADER_LAENGE: usize = 8;
/// Voice-Header-Laenge des fremden Protokolls
pub const VOICE_HEADER_LAENGE: usize = 10;

/// Minimale Capture-Laenge bis einschliesslich UDP-Header
pub const MIN_FRAME_LAENGE: usize =
    ETHERNET_HEADER_LAENGE + IPV4_HEADER_LAENGE + UDP_HEADER_LAENGE;

/// Pakettyp-Werte die als Voice-Frame gelten – alle anderen Typen
/// (Control, Ping, ...) werden still verworfen
pub const VOICE_TYP_STIMME: u8 = 0x01;
pub const VOICE_TYP_FLUESTERN: u8 = 0x02;

/// Fehlerhafte (nicht bloss fremde) Frames
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DissectFehler {
    #[error("Frame zu kurz: {laenge} Bytes (Minimum {MIN_FRAME_LAENGE})")]
    FrameZuKurz { laenge: usize },

    #[error("IP-Total-Length {ip_total} passt nicht zur Capture-Laenge {caplen}")]
    IpLaengeUngueltig { ip_total: usize, caplen: usize },

    #[error("IP-Total-Length {ip_total} kuerzer als IP- plus UDP-Header")]
    UdpNutzlastUngueltig { ip_total: usize },
}

/// Ergebnis einer erfolgreichen Dissektion: Sicht auf die Nutzdaten
/// innerhalb des Original-Frames (kein Kopieren)
#[derive(Debug, PartialEq, Eq)]
pub struct VoiceFrame<'a> {
    /// Session-ID aus dem Voice-Header
    pub session_id: SessionId,
    /// Quell-IP des mitgeschnittenen Pakets
    pub quelle: Ipv4Addr,
    /// Codec-Nutzdaten (kann leer sein)
    pub nutzdaten: &'a [u8],
}

/// Zerlegt einen rohen Frame
///
/// - `Ok(Some(frame))` – erkannter Voice-Frame
/// - `Ok(None)` – gueltiger, aber fremder Frame (anderer Pakettyp oder
///   UDP-Nutzlast kuerzer als der Voice-Header)
/// - `Err(..)` – beschaedigter oder abgeschnittener Frame
///
/// Der Capture-Filter (`udp port N`) garantiert bereits UDP; hier wird nur
/// noch die Geometrie geprueft.
pub fn zerlegen(frame: &[u8]) -> Result<Option<VoiceFrame<'_>>, DissectFehler> {
    let caplen = frame.len();

    if caplen < MIN_FRAME_LAENGE {
        return Err(DissectFehler::FrameZuKurz { laenge: caplen });
    }

    // IP-Total-Length (Offset 16..18) bestimmt zusammen mit der
    // Capture-Laenge das Ethernet-Padding am Frame-Ende
    let ip_total = u16::from_be_bytes([frame[16], frame[17]]) as usize;

    // Ein zu grosses (oder verlogenes) Total-Length-Feld wuerde die
    // Padding-Rechnung negativ machen – hier explizit abfangen
    if ip_total + ETHERNET_HEADER_LAENGE > caplen {
        return Err(DissectFehler::IpLaengeUngueltig { ip_total, caplen });
    }

    if ip_total < IPV4_HEADER_LAENGE + UDP_HEADER_LAENGE {
        return Err(DissectFehler::UdpNutzlastUngueltig { ip_total });
    }

    // UDP-Nutzlast = IP-Total-Length minus IP- und UDP-Header; entspricht
    // caplen - eth - ip - udp - padding aus der urspruenglichen Rechnung
    let udp_nutzlast = ip_total - IPV4_HEADER_LAENGE - UDP_HEADER_LAENGE;

    if udp_nutzlast < VOICE_HEADER_LAENGE {
        // Zu kurz fuer einen Voice-Header -> kein Voice-Frame
        return Ok(None);
    }

    let voice_start = MIN_FRAME_LAENGE;
    let voice_ende = voice_start + udp_nutzlast;
    // Durch die Pruefung oben gilt voice_ende <= caplen; get() statt
    // Indexing haelt das auch bei kuenftigen Aenderungen speichersicher
    let voice = match frame.get(voice_start..voice_ende) {
        Some(v) => v,
        None => {
            return Err(DissectFehler::IpLaengeUngueltig { ip_total, caplen });
        }
    };

    let typ = voice[0];
    if typ != VOICE_TYP_STIMME && typ != VOICE_TYP_FLUESTERN {
        return Ok(None);
    }

    let session_id = u64::from_be_bytes([
        voice[2], voice[3], voice[4], voice[5], voice[6], voice[7], voice[8], voice[9],
    ]);

    let quelle = Ipv4Addr::new(frame[26], frame[27], frame[28], frame[29]);

    Ok(Some(VoiceFrame {
        session_id: SessionId(session_id),
        quelle,
        nutzdaten: &voice[VOICE_HEADER_LAENGE..],
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Baut einen synthetischen Ethernet/IPv4/UDP-Frame mit Voice-Header
    fn frame_bauen(typ: u8, session_id: u64, nutzdaten: &[u8], padding: usize) -> Vec<u8> {
        let udp_nutzlast = VOICE_HEADER_LAENGE + nutzdaten.len();
        let ip_total = IPV4_HEADER_LAENGE + UDP_HEADER_LAENGE + udp_nutzlast;

        let mut frame = Vec::new();
        // Ethernet: MACs + EtherType IPv4
        frame.extend_from_slice(&[0x02; 6]);
        frame.extend_from_slice(&[0x04; 6]);
        frame.extend_from_slice(&[0x08, 0x00]);
        // IPv4
        frame.push(0x45); // Version + IHL
        frame.push(0x00);
        frame.extend_from_slice(&(ip_total as u16).to_be_bytes());
        frame.extend_from_slice(&[0x00; 4]); // Identifikation + Flags/Fragment-Offset
        frame.push(64); // TTL
        frame.push(17); // Protokoll UDP
        frame.extend_from_slice(&[0x00, 0x00]); // Checksumme
        frame.extend_from_slice(&[192, 168, 1, 10]); // Quelle
        frame.extend_from_slice(&[192, 168, 1, 20]); // Ziel
        // UDP
        frame.extend_from_slice(&9987u16.to_be_bytes());
        frame.extend_from_slice(&9987u16.to_be_bytes());
        frame.extend_from_slice(&((UDP_HEADER_LAENGE + udp_nutzlast) as u16).to_be_bytes());
        frame.extend_from_slice(&[0x00, 0x00]);
        // Voice-Header
        frame.push(typ);
        frame.push(0x00); // opak
        frame.extend_from_slice(&session_id.to_be_bytes());
        frame.extend_from_slice(nutzdaten);
        // Ethernet-Padding hinter der IP-Nutzlast
        frame.extend(std::iter::repeat(0u8).take(padding));
        frame
    }

    #[test]
    fn voice_frame_wird_extrahiert() {
        let nutzdaten = vec![0xAB; 60];
        let frame = frame_bauen(VOICE_TYP_STIMME, 0xCAFE_BABE, &nutzdaten, 0);

        let ergebnis = zerlegen(&frame).expect("Frame ist wohlgeformt");
        let voice = ergebnis.expect("muss als Voice-Frame erkannt werden");
        assert_eq!(voice.session_id, SessionId(0xCAFE_BABE));
        assert_eq!(voice.nutzdaten, &nutzdaten[..]);
        assert_eq!(voice.quelle, Ipv4Addr::new(192, 168, 1, 10));
    }

    #[test]
    fn fluester_typ_wird_ebenfalls_erkannt() {
        let frame = frame_bauen(VOICE_TYP_FLUESTERN, 7, &[1, 2, 3], 0);
        let voice = zerlegen(&frame).unwrap().expect("Fluester-Frame ist Voice");
        assert_eq!(voice.session_id, SessionId(7));
        assert_eq!(voice.nutzdaten, &[1, 2, 3]);
    }

    #[test]
    fn fremder_pakettyp_wird_ignoriert() {
        // Typ 0x05 ist kein Voice-Typ (z.B. Control/Ping)
        let frame = frame_bauen(0x05, 1, &[0xAA; 20], 0);
        assert_eq!(zerlegen(&frame).unwrap(), None);
    }

    #[test]
    fn ethernet_padding_wird_abgezogen() {
        // Kurzer Frame, vom Treiber auf 60 Bytes aufgefuellt
        let frame = frame_bauen(VOICE_TYP_STIMME, 3, &[], 8);
        let voice = zerlegen(&frame).unwrap().expect("Voice-Frame trotz Padding");
        assert_eq!(voice.session_id, SessionId(3));
        assert!(voice.nutzdaten.is_empty(), "Padding darf nicht als Nutzdaten gelten");
    }

    #[test]
    fn ip_total_68_ergibt_30_byte_nutzdaten() {
        // IP-Total 68 => minus IP- (20) und UDP-Header (8) bleiben 40 Byte
        // UDP-Nutzlast => minus Voice-Header (10) bleiben 30 Byte Nutzdaten
        let nutzdaten: Vec<u8> = (0..30).collect();
        let frame = frame_bauen(VOICE_TYP_STIMME, 99, &nutzdaten, 0);
        assert_eq!(u16::from_be_bytes([frame[16], frame[17]]), 68);

        let voice = zerlegen(&frame).unwrap().expect("Voice-Frame");
        assert_eq!(voice.nutzdaten.len(), 30);
        assert_eq!(voice.nutzdaten, &nutzdaten[..]);
    }

    #[test]
    fn abgeschnittene_frames_werden_abgelehnt() {
        let frame = frame_bauen(VOICE_TYP_STIMME, 1, &[0xAB; 30], 0);
        for laenge in 0..MIN_FRAME_LAENGE {
            let ergebnis = zerlegen(&frame[..laenge]);
            assert_eq!(
                ergebnis,
                Err(DissectFehler::FrameZuKurz { laenge }),
                "Laenge {} muss abgelehnt werden",
                laenge
            );
        }
    }

    #[test]
    fn verlogenes_ip_total_length_wird_abgefangen() {
        // Capture kuerzer als das IP-Total-Length-Feld behauptet – die
        // Padding-Rechnung wuerde sonst negativ
        let mut frame = frame_bauen(VOICE_TYP_STIMME, 1, &[0xAB; 10], 0);
        let caplen = frame.len();
        frame[16..18].copy_from_slice(&u16::MAX.to_be_bytes());

        let ergebnis = zerlegen(&frame);
        assert_eq!(
            ergebnis,
            Err(DissectFehler::IpLaengeUngueltig {
                ip_total: u16::MAX as usize,
                caplen,
            })
        );
    }

    #[test]
    fn ip_total_kuerzer_als_header_wird_abgefangen() {
        let mut frame = frame_bauen(VOICE_TYP_STIMME, 1, &[0xAB; 10], 0);
        frame[16..18].copy_from_slice(&10u16.to_be_bytes());
        assert_eq!(
            zerlegen(&frame),
            Err(DissectFehler::UdpNutzlastUngueltig { ip_total: 10 })
        );
    }

    #[test]
    fn udp_nutzlast_kuerzer_als_voice_header_ist_kein_voice_frame() {
        // 4 Byte UDP-Nutzlast, der Frame selbst ist wohlgeformt
        let mut frame = frame_bauen(VOICE_TYP_STIMME, 1, &[], 0);
        frame.truncate(MIN_FRAME_LAENGE + 4);
        let ip_total = IPV4_HEADER_LAENGE + UDP_HEADER_LAENGE + 4;
        frame[16..18].copy_from_slice(&(ip_total as u16).to_be_bytes());

        assert_eq!(zerlegen(&frame), Ok(None));
    }

    #[test]
    fn leere_nutzdaten_sind_gueltig() {
        let frame = frame_bauen(VOICE_TYP_STIMME, 11, &[], 0);
        let voice = zerlegen(&frame).unwrap().expect("Voice-Frame ohne Nutzdaten");
        assert!(voice.nutzdaten.is_empty());
    }

    #[test]
    fn session_id_ist_big_endian() {
        let frame = frame_bauen(VOICE_TYP_STIMME, 0x0102_0304_0506_0708, &[0xFF], 0);
        // SessionId liegt bei Offset 44..52
        assert_eq!(frame[44], 0x01);
        assert_eq!(frame[51], 0x08);
        let voice = zerlegen(&frame).unwrap().unwrap();
        assert_eq!(voice.session_id.inner(), 0x0102_0304_0506_0708);
    }
}
