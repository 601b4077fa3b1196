//! SSID announcements.

use super::extensions::Extensions;
use super::kinds::{Encryption, Security};
use super::records::SignalRecord;
use super::time::Timestamp;
use serde::Serialize;
use std::collections::BTreeSet;

/// One SSID sighting of a network or one probed SSID of a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SsidRecord {
    /// Broadcast name. `None` when empty or cloaked and not decoded.
    pub essid: Option<String>,
    pub cloaked: Option<bool>,
    pub encryption: BTreeSet<Encryption>,
    pub signal: Option<SignalRecord>,
    pub first_seen: Option<Timestamp>,
    pub last_seen: Option<Timestamp>,
    /// Frame type the SSID came from, e.g. `Beacon` or `Probe Response`.
    pub frame_type: Option<String>,
    pub max_rate: Option<f64>,
    pub packets: Option<u64>,
    pub beacon_rate: Option<u64>,
    pub wpa_version: Option<String>,
    pub info: Option<String>,
    pub wps: Option<String>,
    pub wps_manuf: Option<String>,
    pub device_name: Option<String>,
    pub model_name: Option<String>,
    pub model_number: Option<String>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl SsidRecord {
    /// A record announcing `essid`. An empty name leaves the ESSID absent.
    pub fn with_essid(essid: impl Into<String>) -> Self {
        let essid = essid.into();
        Self {
            essid: (!essid.is_empty()).then_some(essid),
            ..Default::default()
        }
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloaked.unwrap_or(false)
    }

    /// Privacy, cipher and authentication derived from the encryption tags.
    pub fn security(&self) -> Security {
        Security::classify(&self.encryption, self.wpa_version.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::kinds::{Cipher, Privacy};

    #[test]
    fn test_security_uses_wpa_version() {
        let mut ssid = SsidRecord::with_essid("corp");
        ssid.encryption.insert(Encryption::WpaTkip);
        ssid.wpa_version = Some("WPA+WPA2".into());

        let sec = ssid.security();
        assert_eq!(sec.privacy, Privacy::Wpa("WPA+WPA2".into()));
        assert_eq!(sec.cipher, Cipher::Tkip);
    }

    #[test]
    fn test_cloaked_defaults_to_false() {
        let ssid = SsidRecord::default();
        assert!(!ssid.is_cloaked());
        assert_eq!(ssid.security().privacy, Privacy::Unknown);
    }

    #[test]
    fn test_with_essid_keeps_whitespace_but_not_empty() {
        assert_eq!(SsidRecord::with_essid("").essid, None);
        assert_eq!(SsidRecord::with_essid(" ").essid.as_deref(), Some(" "));
    }
}
