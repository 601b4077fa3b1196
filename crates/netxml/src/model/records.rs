//! Measurement records shared by networks, clients and SSIDs.

use super::extensions::Extensions;
use super::time::Timestamp;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One `freqmhz` entry: a frequency and how many packets were seen on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrequencyRecord {
    pub mhz: u32,
    pub packets: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid frequency record {0:?}: expected \"<mhz> [packets]\"")]
pub struct FrequencyParseError(pub String);

impl FromStr for FrequencyRecord {
    type Err = FrequencyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || FrequencyParseError(s.to_string());
        let mut parts = s.split_whitespace();
        let mhz = parts.next().ok_or_else(err)?.parse().map_err(|_| err())?;
        let packets = match parts.next() {
            Some(p) => Some(p.parse().map_err(|_| err())?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(err());
        }
        Ok(Self { mhz, packets })
    }
}

impl fmt::Display for FrequencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.packets {
            Some(packets) => write!(f, "{} {}", self.mhz, packets),
            None => write!(f, "{}", self.mhz),
        }
    }
}

impl Serialize for FrequencyRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Signal and noise levels from an `snr-info` block.
///
/// Each `min`/`last`/`max` triple satisfies `min <= last <= max` whenever
/// all three values are present; the parser rejects blocks that do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignalRecord {
    pub last_signal_dbm: Option<i32>,
    pub min_signal_dbm: Option<i32>,
    pub max_signal_dbm: Option<i32>,
    pub last_noise_dbm: Option<i32>,
    pub min_noise_dbm: Option<i32>,
    pub max_noise_dbm: Option<i32>,
    pub last_signal_rssi: Option<i32>,
    pub min_signal_rssi: Option<i32>,
    pub max_signal_rssi: Option<i32>,
    pub last_noise_rssi: Option<i32>,
    pub min_noise_rssi: Option<i32>,
    pub max_noise_rssi: Option<i32>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl SignalRecord {
    /// Returns the name of the first triple that breaks `min <= last <= max`.
    pub fn ordering_violation(&self) -> Option<&'static str> {
        let triples = [
            ("signal_dbm", self.min_signal_dbm, self.last_signal_dbm, self.max_signal_dbm),
            ("noise_dbm", self.min_noise_dbm, self.last_noise_dbm, self.max_noise_dbm),
            ("signal_rssi", self.min_signal_rssi, self.last_signal_rssi, self.max_signal_rssi),
            ("noise_rssi", self.min_noise_rssi, self.last_noise_rssi, self.max_noise_rssi),
        ];
        triples.into_iter().find_map(|(name, min, last, max)| match (min, last, max) {
            (Some(min), Some(last), Some(max)) if !(min <= last && last <= max) => Some(name),
            _ => None,
        })
    }
}

/// Packet counters from a `packets` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PacketCounts {
    pub llc: Option<u64>,
    pub data: Option<u64>,
    pub crypt: Option<u64>,
    pub total: Option<u64>,
    pub fragments: Option<u64>,
    pub retries: Option<u64>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// Position bounds from a `gps-info` block.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GpsInfo {
    pub min_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub min_alt: Option<f64>,
    pub min_spd: Option<f64>,
    pub max_lat: Option<f64>,
    pub max_lon: Option<f64>,
    pub max_alt: Option<f64>,
    pub max_spd: Option<f64>,
    pub peak_lat: Option<f64>,
    pub peak_lon: Option<f64>,
    pub peak_alt: Option<f64>,
    pub avg_lat: Option<f64>,
    pub avg_lon: Option<f64>,
    pub avg_alt: Option<f64>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

impl GpsInfo {
    /// Best single location estimate: the peak-signal fix, else the average.
    pub fn best_fix(&self) -> Option<(f64, f64)> {
        match (self.peak_lat, self.peak_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => self.avg_lat.zip(self.avg_lon),
        }
    }
}

/// Which capture card saw a network or client, and how much.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeenCard {
    pub uuid: Option<String>,
    pub time: Option<Timestamp>,
    pub packets: Option<u64>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// A capture source declared in the document header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardSource {
    pub uuid: Option<String>,
    pub source: Option<String>,
    pub name: Option<String>,
    pub interface: Option<String>,
    pub card_type: Option<String>,
    pub packets: Option<u64>,
    pub hop: Option<bool>,
    pub channels: Option<String>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_record_forms() {
        let full: FrequencyRecord = "2437 12".parse().unwrap();
        assert_eq!(full, FrequencyRecord { mhz: 2437, packets: Some(12) });
        assert_eq!(full.to_string(), "2437 12");

        let bare: FrequencyRecord = "5180".parse().unwrap();
        assert_eq!(bare.packets, None);
        assert_eq!(bare.to_string(), "5180");

        assert!("2437 12 9".parse::<FrequencyRecord>().is_err());
        assert!("ghz".parse::<FrequencyRecord>().is_err());
    }

    #[test]
    fn test_signal_ordering() {
        let ok = SignalRecord {
            min_signal_dbm: Some(-90),
            last_signal_dbm: Some(-70),
            max_signal_dbm: Some(-60),
            ..Default::default()
        };
        assert_eq!(ok.ordering_violation(), None);

        let partial = SignalRecord {
            min_signal_dbm: Some(-50),
            last_signal_dbm: Some(-70),
            ..Default::default()
        };
        assert_eq!(partial.ordering_violation(), None);

        let bad = SignalRecord {
            min_noise_dbm: Some(-50),
            last_noise_dbm: Some(-70),
            max_noise_dbm: Some(-40),
            ..Default::default()
        };
        assert_eq!(bad.ordering_violation(), Some("noise_dbm"));
    }

    #[test]
    fn test_gps_best_fix_prefers_peak() {
        let gps = GpsInfo {
            peak_lat: Some(-36.8),
            peak_lon: Some(174.7),
            avg_lat: Some(-36.9),
            avg_lon: Some(174.8),
            ..Default::default()
        };
        assert_eq!(gps.best_fix(), Some((-36.8, 174.7)));

        let avg_only = GpsInfo {
            avg_lat: Some(1.0),
            avg_lon: Some(2.0),
            ..Default::default()
        };
        assert_eq!(avg_only.best_fix(), Some((1.0, 2.0)));
    }
}
