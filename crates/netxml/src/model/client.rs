//! Client devices seen talking to (or probing for) a network.

use super::extensions::Extensions;
use super::kinds::ClientType;
use super::mac::MacAddress;
use super::network::WirelessNetwork;
use super::records::{FrequencyRecord, GpsInfo, PacketCounts, SeenCard, SignalRecord};
use super::ssid::SsidRecord;
use super::time::Timestamp;
use serde::Serialize;
use std::ops::Deref;

/// A `wireless-client` entry. Owned by its network's client list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WirelessClient {
    pub mac: MacAddress,
    pub number: Option<u64>,
    pub client_type: Option<ClientType>,
    pub first_seen: Option<Timestamp>,
    pub last_seen: Option<Timestamp>,
    pub manuf: Option<String>,
    pub channel: Option<u32>,
    pub frequencies: Vec<FrequencyRecord>,
    pub max_seen_rate: Option<u64>,
    pub carrier: Option<String>,
    pub encoding: Option<String>,
    pub data_size: Option<u64>,
    pub packets: Option<PacketCounts>,
    pub signal: Option<SignalRecord>,
    pub gps: Option<GpsInfo>,
    pub seen_cards: Vec<SeenCard>,
    /// SSIDs the client probed for, in document order.
    pub ssid_records: Vec<SsidRecord>,
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// Identity of a client: its MAC plus when it was first seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientKey {
    pub mac: MacAddress,
    pub first_seen: Option<Timestamp>,
}

impl WirelessClient {
    pub fn new(mac: MacAddress) -> Self {
        Self {
            mac,
            number: None,
            client_type: None,
            first_seen: None,
            last_seen: None,
            manuf: None,
            channel: None,
            frequencies: Vec::new(),
            max_seen_rate: None,
            carrier: None,
            encoding: None,
            data_size: None,
            packets: None,
            signal: None,
            gps: None,
            seen_cards: Vec::new(),
            ssid_records: Vec::new(),
            extensions: Extensions::default(),
        }
    }

    pub fn identity(&self) -> ClientKey {
        ClientKey {
            mac: self.mac,
            first_seen: self.first_seen,
        }
    }

    /// Same device sighting, regardless of the other recorded fields.
    pub fn same_client(&self, other: &WirelessClient) -> bool {
        self.identity() == other.identity()
    }
}

/// A client borrowed together with the network that owns it.
#[derive(Debug, Clone, Copy)]
pub struct AssociatedClient<'a> {
    pub network: &'a WirelessNetwork,
    pub client: &'a WirelessClient,
}

impl<'a> AssociatedClient<'a> {
    pub fn network_bssid(&self) -> MacAddress {
        self.network.bssid
    }
}

impl Deref for AssociatedClient<'_> {
    type Target = WirelessClient;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}
