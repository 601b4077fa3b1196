//! The `detection-run` root container.

use super::client::AssociatedClient;
use super::extensions::Extensions;
use super::network::WirelessNetwork;
use super::records::CardSource;
use super::time::Timestamp;
use serde::Serialize;

/// Document-level metadata that precedes the network list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentHeader {
    pub kismet_version: Option<String>,
    pub start_time: Option<Timestamp>,
    pub card_sources: Vec<CardSource>,
    /// Unknown root attributes and unknown top-level elements.
    #[serde(skip_serializing_if = "Extensions::is_empty")]
    pub extensions: Extensions,
}

/// A whole NetXML document held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetXmlDocument {
    #[serde(flatten)]
    pub header: DocumentHeader,
    pub networks: Vec<WirelessNetwork>,
}

impl NetXmlDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, network: WirelessNetwork) {
        self.networks.push(network);
    }

    pub fn networks(&self) -> &[WirelessNetwork] {
        &self.networks
    }

    /// Every client of every network, in document order.
    pub fn clients(&self) -> impl Iterator<Item = AssociatedClient<'_>> + '_ {
        self.networks.iter().flat_map(|n| n.clients())
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl IntoIterator for NetXmlDocument {
    type Item = WirelessNetwork;
    type IntoIter = std::vec::IntoIter<WirelessNetwork>;

    fn into_iter(self) -> Self::IntoIter {
        self.networks.into_iter()
    }
}

impl<'a> IntoIterator for &'a NetXmlDocument {
    type Item = &'a WirelessNetwork;
    type IntoIter = std::slice::Iter<'a, WirelessNetwork>;

    fn into_iter(self) -> Self::IntoIter {
        self.networks.iter()
    }
}
