//! NetXML writer, the inverse of the parser.
//!
//! Names and placements come from the registry, so anything the parser reads
//! through a rule is written back through the same rule. Extensions follow
//! the known fields of their owner.

use crate::error::SerializeError;
use crate::model::{
    CardSource, Extensions, GpsInfo, NetXmlDocument, PacketCounts, RawElement, SeenCard,
    SignalRecord, SsidRecord, WirelessClient, WirelessNetwork,
};
use crate::registry::{self, ElementKind, Field, Placement};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt::Display;
use std::io::Write;

/// DOCTYPE written by Kismet.
pub const KISMET_DOCTYPE: &str = r#"detection-run SYSTEM "http://kismetwireless.net/kismet-3.1.0.dtd""#;

/// Serialize a whole document to bytes.
pub fn serialize(document: &NetXmlDocument) -> Result<Vec<u8>, SerializeError> {
    let mut out = Vec::new();
    write_document(&mut out, document)?;
    Ok(out)
}

/// Write a whole document, declaration and DOCTYPE included.
pub fn write_document<W: Write>(writer: W, document: &NetXmlDocument) -> Result<(), SerializeError> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::DocType(BytesText::from_escaped(KISMET_DOCTYPE)))?;

    let header = &document.header;
    let root = Element::new(ElementKind::Document, &header.extensions)
        .field(Field::KismetVersion, header.kismet_version.as_ref())
        .field(Field::StartTime, header.start_time);
    root.open(&mut xml)?;
    for source in &header.card_sources {
        card_source(&mut xml, source)?;
    }
    for network in &document.networks {
        write_network_to(&mut xml, network)?;
    }
    root.close(&mut xml)?;

    xml.into_inner().flush()?;
    Ok(())
}

/// Write a single `wireless-network` element without a document around it.
pub fn write_network<W: Write>(writer: W, network: &WirelessNetwork) -> Result<(), SerializeError> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);
    write_network_to(&mut xml, network)?;
    xml.into_inner().flush()?;
    Ok(())
}

/// Attributes and leaf fields of one element, in the order they are written.
struct Element<'a> {
    kind: ElementKind,
    attributes: Vec<(&'static str, String)>,
    leaves: Vec<(&'static str, String)>,
    /// Known fields written as attributes of a leaf: leaf, name, value.
    on_leaves: Vec<(Field, &'static str, String)>,
    extensions: &'a Extensions,
}

/// One leaf element ready to be written.
struct Leaf<'b> {
    name: &'b str,
    text: Option<&'b str>,
    attributes: Vec<(&'b str, &'b str)>,
}

impl<'b> Leaf<'b> {
    fn attribute(&mut self, name: &'b str, value: &'b str) {
        if !self.attributes.iter().any(|(written, _)| *written == name) {
            self.attributes.push((name, value));
        }
    }
}

/// The `index`-th leaf called `name`, padded with empty leaves if the
/// element has fewer.
fn leaf_slot<'l, 'b>(leaves: &'l mut Vec<Leaf<'b>>, name: &'b str, index: usize) -> &'l mut Leaf<'b> {
    let mut count = 0;
    let mut found = None;
    for (at, leaf) in leaves.iter().enumerate() {
        if leaf.name == name {
            if count == index {
                found = Some(at);
                break;
            }
            count += 1;
        }
    }
    let at = match found {
        Some(at) => at,
        None => {
            for _ in count..=index {
                leaves.push(Leaf {
                    name,
                    text: None,
                    attributes: Vec::new(),
                });
            }
            leaves.len() - 1
        }
    };
    &mut leaves[at]
}

impl<'a> Element<'a> {
    fn new(kind: ElementKind, extensions: &'a Extensions) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            leaves: Vec::new(),
            on_leaves: Vec::new(),
            extensions,
        }
    }

    fn field<T: Display>(mut self, field: Field, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.push(field, value.to_string());
        }
        self
    }

    fn fields<T: Display>(mut self, field: Field, values: impl IntoIterator<Item = T>) -> Self {
        for value in values {
            self.push(field, value.to_string());
        }
        self
    }

    fn push(&mut self, field: Field, text: String) {
        let Some(rule) = registry::rule_for(self.kind, field) else {
            return;
        };
        match rule.placement {
            Placement::Attribute => self.attributes.push((rule.name, text)),
            Placement::Element => self.leaves.push((rule.name, text)),
            Placement::OnLeaf(leaf) => self.on_leaves.push((leaf, rule.name, text)),
        }
    }

    /// Leaves in field order, each carrying its own attributes. Leaf
    /// attributes without a leaf to sit on get an empty one.
    fn leaves(&self) -> Vec<Leaf<'_>> {
        let mut leaves: Vec<Leaf<'_>> = self
            .leaves
            .iter()
            .map(|(name, text)| Leaf {
                name: *name,
                text: Some(text.as_str()),
                attributes: Vec::new(),
            })
            .collect();
        for (leaf, name, value) in &self.on_leaves {
            let leaf = registry::field_name(self.kind, *leaf);
            leaf_slot(&mut leaves, leaf, 0).attribute(name, value);
        }
        for extra in &self.extensions.leaf_attributes {
            leaf_slot(&mut leaves, &extra.leaf, extra.index).attribute(&extra.name, &extra.value);
        }
        leaves
    }

    /// Start tag and leaf fields. Composite children go between `open` and
    /// `close`.
    fn open<W: Write>(&self, xml: &mut Writer<W>) -> Result<(), SerializeError> {
        let mut start = BytesStart::new(registry::tag_name(self.kind));
        let known = self.attributes.iter().map(|(name, value)| (*name, value.as_str()));
        let unknown = self
            .extensions
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()));
        let mut written: Vec<&str> = Vec::new();
        for (name, value) in known.chain(unknown) {
            if written.contains(&name) {
                tracing::debug!(attribute = name, "dropping repeated attribute");
                continue;
            }
            written.push(name);
            start.push_attribute((name, value));
        }
        xml.write_event(Event::Start(start))?;

        for leaf in self.leaves() {
            let element = xml
                .create_element(leaf.name)
                .with_attributes(leaf.attributes.iter().copied());
            match leaf.text {
                Some(text) => element.write_text_content(BytesText::new(text))?,
                None => element.write_empty()?,
            };
        }
        Ok(())
    }

    fn close<W: Write>(self, xml: &mut Writer<W>) -> Result<(), SerializeError> {
        for raw in &self.extensions.elements {
            raw_element(xml, raw)?;
        }
        xml.write_event(Event::End(BytesEnd::new(registry::tag_name(self.kind))))?;
        Ok(())
    }
}

fn write_network_to<W: Write>(xml: &mut Writer<W>, network: &WirelessNetwork) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::Network, &network.extensions)
        .field(Field::Number, network.number)
        .field(Field::Type, network.network_type.as_ref())
        .field(Field::FirstTime, network.first_seen)
        .field(Field::LastTime, network.last_seen)
        .field(Field::Bssid, Some(network.bssid))
        .field(Field::Manuf, network.manuf.as_ref())
        .field(Field::Channel, network.channel)
        .fields(Field::FreqMhz, &network.frequencies)
        .field(Field::MaxSeenRate, network.max_seen_rate)
        .field(Field::Carrier, network.carrier.as_ref())
        .field(Field::Encoding, network.encoding.as_ref())
        .field(Field::DataSize, network.data_size)
        .field(Field::BssTimestamp, network.bss_timestamp)
        .field(Field::CdpDevice, network.cdp_device.as_ref())
        .field(Field::CdpPortId, network.cdp_port_id.as_ref());

    element.open(xml)?;
    for record in &network.ssid_records {
        ssid(xml, record)?;
    }
    if let Some(counts) = &network.packets {
        packets(xml, counts)?;
    }
    if let Some(record) = &network.signal {
        signal(xml, record)?;
    }
    if let Some(info) = &network.gps {
        gps(xml, info)?;
    }
    for card in &network.seen_cards {
        seen_card(xml, card)?;
    }
    for client in &network.clients {
        wireless_client(xml, client)?;
    }
    element.close(xml)
}

fn wireless_client<W: Write>(xml: &mut Writer<W>, client: &WirelessClient) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::Client, &client.extensions)
        .field(Field::Number, client.number)
        .field(Field::Type, client.client_type.as_ref())
        .field(Field::FirstTime, client.first_seen)
        .field(Field::LastTime, client.last_seen)
        .field(Field::ClientMac, Some(client.mac))
        .field(Field::Manuf, client.manuf.as_ref())
        .field(Field::Channel, client.channel)
        .fields(Field::FreqMhz, &client.frequencies)
        .field(Field::MaxSeenRate, client.max_seen_rate)
        .field(Field::Carrier, client.carrier.as_ref())
        .field(Field::Encoding, client.encoding.as_ref())
        .field(Field::DataSize, client.data_size);

    element.open(xml)?;
    for record in &client.ssid_records {
        ssid(xml, record)?;
    }
    if let Some(counts) = &client.packets {
        packets(xml, counts)?;
    }
    if let Some(record) = &client.signal {
        signal(xml, record)?;
    }
    if let Some(info) = &client.gps {
        gps(xml, info)?;
    }
    for card in &client.seen_cards {
        seen_card(xml, card)?;
    }
    element.close(xml)
}

fn ssid<W: Write>(xml: &mut Writer<W>, record: &SsidRecord) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::Ssid, &record.extensions)
        .field(Field::FirstTime, record.first_seen)
        .field(Field::LastTime, record.last_seen)
        .field(Field::Cloaked, record.cloaked)
        .field(Field::FrameType, record.frame_type.as_ref())
        .field(Field::MaxRate, record.max_rate)
        .field(Field::PacketCount, record.packets)
        .field(Field::BeaconRate, record.beacon_rate)
        .fields(Field::Encryption, &record.encryption)
        .field(Field::WpaVersion, record.wpa_version.as_ref())
        .field(Field::Wps, record.wps.as_ref())
        .field(Field::WpsManuf, record.wps_manuf.as_ref())
        .field(Field::DeviceName, record.device_name.as_ref())
        .field(Field::ModelName, record.model_name.as_ref())
        .field(Field::ModelNumber, record.model_number.as_ref())
        .field(Field::Info, record.info.as_ref())
        .field(Field::Essid, record.essid.as_ref());

    element.open(xml)?;
    if let Some(levels) = &record.signal {
        signal(xml, levels)?;
    }
    element.close(xml)
}

fn packets<W: Write>(xml: &mut Writer<W>, counts: &PacketCounts) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::Packets, &counts.extensions)
        .field(Field::Llc, counts.llc)
        .field(Field::Data, counts.data)
        .field(Field::Crypt, counts.crypt)
        .field(Field::Total, counts.total)
        .field(Field::Fragments, counts.fragments)
        .field(Field::Retries, counts.retries);
    element.open(xml)?;
    element.close(xml)
}

fn signal<W: Write>(xml: &mut Writer<W>, record: &SignalRecord) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::Signal, &record.extensions)
        .field(Field::LastSignalDbm, record.last_signal_dbm)
        .field(Field::LastNoiseDbm, record.last_noise_dbm)
        .field(Field::LastSignalRssi, record.last_signal_rssi)
        .field(Field::LastNoiseRssi, record.last_noise_rssi)
        .field(Field::MinSignalDbm, record.min_signal_dbm)
        .field(Field::MinNoiseDbm, record.min_noise_dbm)
        .field(Field::MinSignalRssi, record.min_signal_rssi)
        .field(Field::MinNoiseRssi, record.min_noise_rssi)
        .field(Field::MaxSignalDbm, record.max_signal_dbm)
        .field(Field::MaxNoiseDbm, record.max_noise_dbm)
        .field(Field::MaxSignalRssi, record.max_signal_rssi)
        .field(Field::MaxNoiseRssi, record.max_noise_rssi);
    element.open(xml)?;
    element.close(xml)
}

fn gps<W: Write>(xml: &mut Writer<W>, info: &GpsInfo) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::Gps, &info.extensions)
        .field(Field::MinLat, info.min_lat)
        .field(Field::MinLon, info.min_lon)
        .field(Field::MinAlt, info.min_alt)
        .field(Field::MinSpd, info.min_spd)
        .field(Field::MaxLat, info.max_lat)
        .field(Field::MaxLon, info.max_lon)
        .field(Field::MaxAlt, info.max_alt)
        .field(Field::MaxSpd, info.max_spd)
        .field(Field::PeakLat, info.peak_lat)
        .field(Field::PeakLon, info.peak_lon)
        .field(Field::PeakAlt, info.peak_alt)
        .field(Field::AvgLat, info.avg_lat)
        .field(Field::AvgLon, info.avg_lon)
        .field(Field::AvgAlt, info.avg_alt);
    element.open(xml)?;
    element.close(xml)
}

fn seen_card<W: Write>(xml: &mut Writer<W>, card: &SeenCard) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::SeenCard, &card.extensions)
        .field(Field::SeenUuid, card.uuid.as_ref())
        .field(Field::SeenTime, card.time)
        .field(Field::SeenPackets, card.packets);
    element.open(xml)?;
    element.close(xml)
}

fn card_source<W: Write>(xml: &mut Writer<W>, source: &CardSource) -> Result<(), SerializeError> {
    let element = Element::new(ElementKind::CardSource, &source.extensions)
        .field(Field::Uuid, source.uuid.as_ref())
        .field(Field::SourceName, source.source.as_ref())
        .field(Field::CardName, source.name.as_ref())
        .field(Field::CardInterface, source.interface.as_ref())
        .field(Field::CardType, source.card_type.as_ref())
        .field(Field::CardPackets, source.packets)
        .field(Field::CardHop, source.hop)
        .field(Field::CardChannels, source.channels.as_ref());
    element.open(xml)?;
    element.close(xml)
}

fn raw_element<W: Write>(xml: &mut Writer<W>, raw: &RawElement) -> Result<(), SerializeError> {
    let mut start = BytesStart::new(raw.name.as_str());
    for (name, value) in &raw.attributes {
        start.push_attribute((name.as_str(), value.as_str()));
    }

    match (&raw.text, raw.children.is_empty()) {
        (None, true) => {
            xml.write_event(Event::Empty(start))?;
        }
        (Some(text), true) => {
            xml.write_event(Event::Start(start))?;
            xml.write_event(Event::Text(BytesText::new(text)))?;
            xml.write_event(Event::End(BytesEnd::new(raw.name.as_str())))?;
        }
        (text, false) => {
            xml.write_event(Event::Start(start))?;
            if let Some(text) = text {
                xml.write_event(Event::Text(BytesText::new(text)))?;
            }
            for child in &raw.children {
                raw_element(xml, child)?;
            }
            xml.write_event(Event::End(BytesEnd::new(raw.name.as_str())))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Encryption, MacAddress, NetworkType};

    fn sample() -> NetXmlDocument {
        let mut network = WirelessNetwork::new("00:11:22:33:44:55".parse().unwrap());
        network.number = Some(1);
        network.network_type = Some(NetworkType::Infrastructure);
        network.channel = Some(6);
        let mut record = SsidRecord::with_essid("home & away");
        record.encryption.insert(Encryption::Wep);
        network.ssid_records.push(record);
        let mut document = NetXmlDocument::new();
        document.push(network);
        document
    }

    #[test]
    fn test_document_preamble() {
        let xml = String::from_utf8(serialize(&sample()).unwrap()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<!DOCTYPE detection-run SYSTEM"));
        assert!(xml.contains("<detection-run>"));
        assert!(xml.trim_end().ends_with("</detection-run>"));
    }

    #[test]
    fn test_uses_canonical_placement() {
        let xml = String::from_utf8(serialize(&sample()).unwrap()).unwrap();
        assert!(xml.contains(r#"<wireless-network number="1" type="infrastructure">"#));
        assert!(xml.contains("<BSSID>00:11:22:33:44:55</BSSID>"));
        assert!(xml.contains("<channel>6</channel>"));
        assert!(xml.contains("<encryption>WEP</encryption>"));
        assert!(xml.contains("<essid>home &amp; away</essid>"));
    }

    #[test]
    fn test_single_network() {
        let mut out = Vec::new();
        let network = WirelessNetwork::new(MacAddress::new([0xde, 0xad, 0xbe, 0xef, 0, 1]));
        write_network(&mut out, &network).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.starts_with("<wireless-network>"));
        assert!(xml.contains("<BSSID>DE:AD:BE:EF:00:01</BSSID>"));
    }

    #[test]
    fn test_extensions_written_after_fields() {
        let mut network = WirelessNetwork::new(MacAddress::new([2, 0, 0, 0, 0, 1]));
        network.extensions.attributes.push(("vendor".into(), "acme".into()));
        let mut blob = RawElement::new("vendor-blob");
        blob.text = Some("opaque".into());
        network.extensions.elements.push(blob);

        let mut out = Vec::new();
        write_network(&mut out, &network).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains(r#"<wireless-network vendor="acme">"#));
        let bssid = xml.find("<BSSID>").unwrap();
        let blob = xml.find("<vendor-blob>opaque</vendor-blob>").unwrap();
        assert!(bssid < blob);
    }
}
