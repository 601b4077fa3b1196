//! Closed vocabularies with a verbatim fallback.
//!
//! Every enum here parses case-insensitively into a known member and keeps
//! anything else in an `Other(raw)` member, so values from newer capture
//! tools survive a round trip unchanged.

use serde::{Serialize, Serializer};
use std::fmt;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant,)+
            /// Value outside the known set, kept verbatim.
            Other(String),
        }

        impl $name {
            /// Parse a schema value. Never fails.
            pub fn parse(raw: &str) -> Self {
                let trimmed = raw.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($text) $(|| trimmed.eq_ignore_ascii_case($alias))* {
                        return Self::$variant;
                    }
                )+
                Self::Other(trimmed.to_string())
            }

            /// Canonical schema spelling.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(raw) => raw,
                }
            }

            pub fn is_other(&self) -> bool {
                matches!(self, Self::Other(_))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

vocabulary! {
    /// Kind of network a BSSID belongs to.
    NetworkType {
        Infrastructure => "infrastructure",
        AdHoc => "ad-hoc" | "adhoc",
        Probe => "probe",
        Data => "data",
    }
}

vocabulary! {
    /// How a client was observed relative to its network.
    ClientType {
        Established => "established",
        Probe => "probe",
        FromDs => "fromds",
        ToDs => "tods",
        InterDs => "interds",
    }
}

vocabulary! {
    /// One encryption tag as reported in an `<encryption>` element.
    Encryption {
        None => "None" | "open",
        Wep => "WEP",
        Wep40 => "WEP40",
        Wep104 => "WEP104",
        Layer3 => "Layer3",
        WpaPsk => "WPA+PSK",
        WpaTkip => "WPA+TKIP",
        WpaAesCcm => "WPA+AES-CCM",
        WpaAesOcb => "WPA+AES-OCB",
        WpaMgt => "WPA+MGT",
        WpaPeap => "WPA+PEAP",
        WpaTtls => "WPA+TTLS",
        WpaTls => "WPA+TLS",
        WpaLeap => "WPA+LEAP",
    }
}

impl Encryption {
    /// Split an attribute-form list such as `"WPA+PSK WPA+AES-CCM"`.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Network privacy as derived from the encryption tags and WPA version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Privacy {
    Open,
    Wep,
    /// WPA family, carrying the reported `wpa-version` text (e.g. `WPA+WPA2`).
    Wpa(String),
    Unknown,
}

impl fmt::Display for Privacy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Privacy::Open => f.write_str("OPEN"),
            Privacy::Wep => f.write_str("WEP"),
            Privacy::Wpa(version) => f.write_str(version),
            Privacy::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cipher {
    #[serde(rename = "AES-OCB")]
    AesOcb,
    #[serde(rename = "AES-CCMP")]
    AesCcmp,
    #[serde(rename = "TKIP")]
    Tkip,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cipher::AesOcb => "AES-OCB",
            Cipher::AesCcmp => "AES-CCMP",
            Cipher::Tkip => "TKIP",
            Cipher::Wep => "WEP",
            Cipher::Open => "OPEN",
            Cipher::Unknown => "UNKNOWN",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Authentication {
    #[serde(rename = "PSK")]
    Psk,
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl fmt::Display for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Authentication::Psk => "PSK",
            Authentication::None => "NONE",
            Authentication::Unknown => "UNKNOWN",
        })
    }
}

/// Privacy, cipher and authentication of one SSID announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Security {
    pub privacy: Privacy,
    pub cipher: Cipher,
    /// `None` when the cipher does not imply an authentication scheme (AES-OCB).
    pub authentication: Option<Authentication>,
}

impl Security {
    /// Classify a set of encryption tags.
    ///
    /// Matching is by substring over the canonical spellings, so fallback
    /// values such as `WPA+AES-CCM-256` still classify.
    pub fn classify<'a, I>(tags: I, wpa_version: Option<&str>) -> Self
    where
        I: IntoIterator<Item = &'a Encryption> + Clone,
    {
        let any = |needle: &str| tags.clone().into_iter().any(|t| t.as_str().contains(needle));

        let privacy = match wpa_version.filter(|v| !v.is_empty()) {
            Some(version) => Privacy::Wpa(version.to_string()),
            None if any("WEP") => Privacy::Wep,
            None if any("None") => Privacy::Open,
            None => Privacy::Unknown,
        };

        let (cipher, authentication) = if any("AES-OCB") {
            (Cipher::AesOcb, None)
        } else if any("AES-CCM") {
            (Cipher::AesCcmp, Some(Authentication::Psk))
        } else if any("TKIP") || any("PSK") {
            (Cipher::Tkip, Some(Authentication::Psk))
        } else if any("WEP") {
            (Cipher::Wep, Some(Authentication::None))
        } else if any("None") {
            (Cipher::Open, Some(Authentication::None))
        } else {
            (Cipher::Unknown, Some(Authentication::Unknown))
        };

        Self {
            privacy,
            cipher,
            authentication,
        }
    }
}
