//! Discovered wireless networks.

use super::client::{AssociatedClient, WirelessClient};
use super::extensions::Extensions;
use super::kinds::{Encryption, NetworkType};
use super::mac::MacAddress;
use super::records::{FrequencyRecord, GpsInfo, PacketCounts, SeenCard, SignalRecord};
use super::ssid::SsidRecord;
use super::time::Timestamp;
use serde::Serialize;
use std::collections::BTreeSet;

/// A `wireless-network` entry with everything nested under it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WirelessNetwork {
    pub bssid: MacAddress,
    pub number: Option<u64>,
    pub network_type: Option<NetworkType>,
    pub first_seen: Option<Timestamp>,
    pub last_seen: Option<Timestamp>,
    pub channel: Option<u32>,
    /// SSID announcements in document order.
    pub ssid_records: Vec<SsidRecord>,
    pub manuf: Option<String>,
    pub frequencies: Vec<FrequencyRecord>,
    pub max_seen_rate: Option<u64>,
    pub carrier: Option<String>,
    pub encoding: Option<String>,
    pub data_size: Option<u64>,
    pub bss_timestamp: Option<u64>,
    pub cdp_device: Option<String>,
    pub cdp_port_id: Option<String>,
    pub packets: Option<PacketCounts>,
    pub signal: Option<SignalRecord>,
    pub gps: Option<GpsInfo>,
    pub seen_cards: Vec<SeenCard>,
    /// Clients in document order.
    pub clients: Vec<WirelessClient>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// Identity of a network: its BSSID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NetworkKey(pub MacAddress);

impl WirelessNetwork {
    pub fn new(bssid: MacAddress) -> Self {
        Self {
            bssid,
            number: None,
            network_type: None,
            first_seen: None,
            last_seen: None,
            channel: None,
            ssid_records: Vec::new(),
            manuf: None,
            frequencies: Vec::new(),
            max_seen_rate: None,
            carrier: None,
            encoding: None,
            data_size: None,
            bss_timestamp: None,
            cdp_device: None,
            cdp_port_id: None,
            packets: None,
            signal: None,
            gps: None,
            seen_cards: Vec::new(),
            clients: Vec::new(),
            extensions: Extensions::default(),
        }
    }

    pub fn identity(&self) -> NetworkKey {
        NetworkKey(self.bssid)
    }

    pub fn same_network(&self, other: &WirelessNetwork) -> bool {
        self.bssid == other.bssid
    }

    /// The most recently announced SSID (last in document order).
    pub fn latest_ssid(&self) -> Option<&SsidRecord> {
        self.ssid_records.last()
    }

    /// Every decoded ESSID, in document order.
    pub fn essids(&self) -> impl Iterator<Item = &str> + '_ {
        self.ssid_records.iter().filter_map(|s| s.essid.as_deref())
    }

    /// Union of encryption tags across all SSID records.
    pub fn encryption(&self) -> BTreeSet<Encryption> {
        self.ssid_records
            .iter()
            .flat_map(|s| s.encryption.iter().cloned())
            .collect()
    }

    /// Clients paired with this network.
    pub fn clients(&self) -> impl Iterator<Item = AssociatedClient<'_>> + '_ {
        self.clients.iter().map(move |client| AssociatedClient {
            network: self,
            client,
        })
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_identity_ignores_other_fields() {
        let mut a = WirelessNetwork::new(mac("00:11:22:33:44:55"));
        let mut b = a.clone();
        a.channel = Some(1);
        b.channel = Some(11);
        assert!(a.same_network(&b));
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a, b);
    }

    #[test]
    fn test_latest_ssid_is_last_in_document_order() {
        let mut net = WirelessNetwork::new(mac("00:11:22:33:44:55"));
        net.ssid_records.push(SsidRecord::with_essid("old"));
        net.ssid_records.push(SsidRecord::default());
        net.ssid_records.push(SsidRecord::with_essid("new"));

        assert_eq!(net.latest_ssid().and_then(|s| s.essid.as_deref()), Some("new"));
        assert_eq!(net.essids().collect::<Vec<_>>(), vec!["old", "new"]);
    }

    #[test]
    fn test_clients_carry_network_back_reference() {
        let mut net = WirelessNetwork::new(mac("00:11:22:33:44:55"));
        net.clients.push(WirelessClient::new(mac("66:77:88:99:AA:BB")));

        let pairs: Vec<_> = net.clients().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].network_bssid().to_string(), "00:11:22:33:44:55");
        assert_eq!(pairs[0].mac.to_string(), "66:77:88:99:AA:BB");
    }

    #[test]
    fn test_encryption_union() {
        let mut net = WirelessNetwork::new(mac("00:11:22:33:44:55"));
        let mut a = SsidRecord::default();
        a.encryption.insert(Encryption::WpaPsk);
        let mut b = SsidRecord::default();
        b.encryption.insert(Encryption::WpaPsk);
        b.encryption.insert(Encryption::WpaAesCcm);
        net.ssid_records = vec![a, b];

        assert_eq!(net.encryption().len(), 2);
    }
}
