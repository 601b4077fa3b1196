//! Turning a closed frame into its finished model object.
//!
//! Attributes and leaf children are decoded through the registry into a bag
//! of typed values; each constructor then takes the values it owns and
//! checks the invariants of its entity.

use super::frame::{Frame, Leaf, Node};
use super::position::Position;
use super::warning::{ParseWarning, WarningKind};
use crate::error::ValidationError;
use crate::model::{
    CardSource, ClientType, DocumentHeader, Encryption, Extensions, FrequencyRecord, GpsInfo,
    LeafAttribute, MacAddress, NetworkType, PacketCounts, SeenCard, SignalRecord, SsidRecord, Timestamp,
    WirelessClient, WirelessNetwork,
};
use crate::registry::{self, ElementKind, Field, FieldRule, Value};
use std::collections::BTreeSet;

/// Decoded fields and children of one element.
struct Collected {
    kind: ElementKind,
    element: String,
    position: Position,
    values: Vec<(Field, Value)>,
    nodes: Vec<Node>,
    extensions: Extensions,
}

impl Collected {
    fn gather(
        kind: ElementKind,
        element: String,
        position: Position,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<Self, ValidationError> {
        let mut collected = Self {
            kind,
            element,
            position,
            values: Vec::new(),
            nodes: Vec::new(),
            extensions: Extensions::default(),
        };

        for (name, raw) in attributes {
            collected.attribute(name, raw, position, warnings)?;
        }

        let mut seen = Vec::new();
        for child in children {
            match child {
                Node::Field(leaf) => {
                    let index = seen.iter().filter(|field| **field == leaf.field).count();
                    seen.push(leaf.field);
                    collected.leaf(leaf, index, warnings)?;
                }
                Node::Raw(raw) => collected.extensions.elements.push(raw),
                other => collected.nodes.push(other),
            }
        }
        collected
            .extensions
            .leaf_attributes
            .sort_by(|a, b| (&a.leaf, a.index).cmp(&(&b.leaf, b.index)));

        Ok(collected)
    }

    fn from_frame(frame: Frame, warnings: &mut Vec<ParseWarning>) -> Result<Self, ValidationError> {
        Self::gather(
            frame.kind,
            frame.name,
            frame.position,
            frame.attributes,
            frame.children,
            warnings,
        )
    }

    fn attribute(
        &mut self,
        name: String,
        raw: String,
        position: Position,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), ValidationError> {
        match registry::field_rule(self.kind, &name) {
            Some(rule) => self.decode(rule, &raw, position, warnings),
            None => {
                unknown_attribute(&name, &self.element, position, warnings);
                self.extensions.attributes.push((name, raw));
                Ok(())
            }
        }
    }

    /// Decode the `index`-th leaf of its field. Known attributes on the leaf
    /// address this element's fields; unknown ones stay with the leaf.
    fn leaf(&mut self, leaf: Leaf, index: usize, warnings: &mut Vec<ParseWarning>) -> Result<(), ValidationError> {
        let Some(rule) = registry::rule_for(self.kind, leaf.field) else {
            self.extensions.elements.push(leaf.into_raw());
            return Ok(());
        };
        self.decode(rule, &leaf.text, leaf.position, warnings)?;

        for (name, raw) in leaf.attributes {
            match registry::field_rule(self.kind, &name) {
                Some(known) => self.decode(known, &raw, leaf.position, warnings)?,
                None => {
                    unknown_attribute(&name, &leaf.name, leaf.position, warnings);
                    self.extensions.leaf_attributes.push(LeafAttribute {
                        leaf: rule.name.to_string(),
                        index,
                        name,
                        value: raw,
                    });
                }
            }
        }
        self.extensions.elements.extend(leaf.stray);
        Ok(())
    }

    fn decode(
        &mut self,
        rule: &FieldRule,
        raw: &str,
        position: Position,
        warnings: &mut Vec<ParseWarning>,
    ) -> Result<(), ValidationError> {
        let value = rule
            .decode(raw)
            .map_err(|message| ValidationError::InvalidField {
                element: self.element.clone(),
                field: rule.name.to_string(),
                message,
                position,
            })?;
        let Some(value) = value else {
            return Ok(());
        };

        if !rule.repeated && self.values.iter().any(|(field, _)| *field == rule.field) {
            warnings.push(ParseWarning::new(
                WarningKind::DuplicateField,
                rule.name,
                Some(&self.element),
                position,
            ));
            return Ok(());
        }
        self.values.push((rule.field, value));
        Ok(())
    }

    fn missing(&self, field: &'static str) -> ValidationError {
        ValidationError::MissingField {
            element: self.element.clone(),
            field,
            position: self.position,
        }
    }

    /// Keep the first of a child that may appear once.
    fn single<T>(&self, slot: &mut Option<T>, value: T, name: &str, warnings: &mut Vec<ParseWarning>) {
        if slot.is_some() {
            warnings.push(ParseWarning::new(
                WarningKind::DuplicateField,
                name,
                Some(&self.element),
                self.position,
            ));
        } else {
            *slot = Some(value);
        }
    }

    fn take(&mut self, field: Field) -> Option<Value> {
        let index = self.values.iter().position(|(f, _)| *f == field)?;
        Some(self.values.remove(index).1)
    }

    fn take_all(&mut self, field: Field) -> Vec<Value> {
        let mut taken = Vec::new();
        self.values.retain(|(f, value)| {
            if *f == field {
                taken.push(value.clone());
                false
            } else {
                true
            }
        });
        taken
    }

    fn text(&mut self, field: Field) -> Option<String> {
        match self.take(field)? {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    fn uint(&mut self, field: Field) -> Option<u64> {
        match self.take(field)? {
            Value::UInt(n) => Some(n),
            _ => None,
        }
    }

    fn channel(&mut self) -> Option<u32> {
        self.uint(Field::Channel).and_then(|n| u32::try_from(n).ok())
    }

    fn level(&mut self, field: Field) -> Option<i32> {
        match self.take(field)? {
            Value::Int(n) => i32::try_from(n).ok(),
            _ => None,
        }
    }

    fn float(&mut self, field: Field) -> Option<f64> {
        match self.take(field)? {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    fn flag(&mut self, field: Field) -> Option<bool> {
        match self.take(field)? {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    fn time(&mut self, field: Field) -> Option<Timestamp> {
        match self.take(field)? {
            Value::Time(t) => Some(t),
            _ => None,
        }
    }

    fn mac(&mut self, field: Field) -> Option<MacAddress> {
        match self.take(field)? {
            Value::Mac(mac) => Some(mac),
            _ => None,
        }
    }

    fn frequencies(&mut self) -> Vec<FrequencyRecord> {
        self.take_all(Field::FreqMhz)
            .into_iter()
            .filter_map(|value| match value {
                Value::Frequency(record) => Some(record),
                _ => None,
            })
            .collect()
    }

    fn encryption(&mut self) -> BTreeSet<Encryption> {
        self.take_all(Field::Encryption)
            .into_iter()
            .flat_map(|value| match value {
                Value::Encryption(tags) => tags,
                _ => Vec::new(),
            })
            .collect()
    }

    fn network_type(&mut self) -> Option<NetworkType> {
        match self.take(Field::Type)? {
            Value::NetworkType(t) => Some(t),
            _ => None,
        }
    }

    fn client_type(&mut self) -> Option<ClientType> {
        match self.take(Field::Type)? {
            Value::ClientType(t) => Some(t),
            _ => None,
        }
    }
}

fn unknown_attribute(name: &str, element: &str, position: Position, warnings: &mut Vec<ParseWarning>) {
    tracing::debug!(attribute = %name, element = %element, "keeping unknown attribute");
    warnings.push(ParseWarning::new(
        WarningKind::UnknownAttribute,
        name,
        Some(element),
        position,
    ));
}

/// Build the object for a closed composite frame.
pub(crate) fn composite(frame: Frame, warnings: &mut Vec<ParseWarning>) -> Result<Node, ValidationError> {
    let kind = frame.kind;
    let collected = Collected::from_frame(frame, warnings)?;
    let node = match kind {
        ElementKind::Network => Node::Network(Box::new(network(collected, warnings)?)),
        ElementKind::Client => Node::Client(client(collected, warnings)?),
        ElementKind::Ssid => Node::Ssid(ssid(collected, warnings)?),
        ElementKind::Packets => Node::Packets(packets(collected)),
        ElementKind::Signal => Node::Signal(signal(collected)?),
        ElementKind::Gps => Node::Gps(gps(collected)),
        ElementKind::SeenCard => Node::SeenCard(seen_card(collected)),
        ElementKind::CardSource => Node::CardSource(card_source(collected)),
        ElementKind::Document | ElementKind::Field(_) | ElementKind::Unrecognized => {
            return Err(ValidationError::Invariant {
                element: collected.element,
                message: "not an entity element".to_string(),
                position: collected.position,
            })
        }
    };
    Ok(node)
}

/// Apply the attributes of an opening `detection-run` to the header.
///
/// Each attribute is decoded on its own: the invalid ones are returned and
/// every other attribute is still applied.
pub(crate) fn document_attributes(
    header: &mut DocumentHeader,
    element: &str,
    position: Position,
    attributes: Vec<(String, String)>,
    warnings: &mut Vec<ParseWarning>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for attribute in attributes {
        let collected = Collected::gather(
            ElementKind::Document,
            element.to_string(),
            position,
            vec![attribute],
            Vec::new(),
            warnings,
        );
        match collected {
            Ok(collected) => apply_header(header, collected),
            Err(err) => errors.push(err),
        }
    }
    errors
}

/// Apply the leaf and unknown children of a closing `detection-run`.
pub(crate) fn document_children(
    header: &mut DocumentHeader,
    frame: Frame,
    warnings: &mut Vec<ParseWarning>,
) -> Result<(), ValidationError> {
    let collected = Collected::from_frame(frame, warnings)?;
    apply_header(header, collected);
    Ok(())
}

fn apply_header(header: &mut DocumentHeader, mut c: Collected) {
    if let Some(version) = c.text(Field::KismetVersion) {
        header.kismet_version.get_or_insert(version);
    }
    if let Some(start) = c.time(Field::StartTime) {
        header.start_time.get_or_insert(start);
    }
    header.extensions.attributes.append(&mut c.extensions.attributes);
    header.extensions.leaf_attributes.append(&mut c.extensions.leaf_attributes);
    header.extensions.elements.append(&mut c.extensions.elements);
}

fn network(mut c: Collected, warnings: &mut Vec<ParseWarning>) -> Result<WirelessNetwork, ValidationError> {
    let bssid = c.mac(Field::Bssid).ok_or_else(|| c.missing("BSSID"))?;
    let mut network = WirelessNetwork::new(bssid);
    network.number = c.uint(Field::Number);
    network.network_type = c.network_type();
    network.first_seen = c.time(Field::FirstTime);
    network.last_seen = c.time(Field::LastTime);
    network.channel = c.channel();
    network.manuf = c.text(Field::Manuf);
    network.frequencies = c.frequencies();
    network.max_seen_rate = c.uint(Field::MaxSeenRate);
    network.carrier = c.text(Field::Carrier);
    network.encoding = c.text(Field::Encoding);
    network.data_size = c.uint(Field::DataSize);
    network.bss_timestamp = c.uint(Field::BssTimestamp);
    network.cdp_device = c.text(Field::CdpDevice);
    network.cdp_port_id = c.text(Field::CdpPortId);

    for node in std::mem::take(&mut c.nodes) {
        match node {
            Node::Ssid(record) => network.ssid_records.push(record),
            Node::Client(client) => network.clients.push(client),
            Node::SeenCard(card) => network.seen_cards.push(card),
            Node::Packets(packets) => c.single(&mut network.packets, packets, "packets", warnings),
            Node::Signal(signal) => c.single(&mut network.signal, signal, "snr-info", warnings),
            Node::Gps(gps) => c.single(&mut network.gps, gps, "gps-info", warnings),
            // The registry never nests these under a network.
            Node::Network(_) | Node::CardSource(_) | Node::Field(_) | Node::Raw(_) => {}
        }
    }

    network.extensions = c.extensions;
    Ok(network)
}

fn client(mut c: Collected, warnings: &mut Vec<ParseWarning>) -> Result<WirelessClient, ValidationError> {
    let mac = c.mac(Field::ClientMac).ok_or_else(|| c.missing("client-mac"))?;
    let mut client = WirelessClient::new(mac);
    client.number = c.uint(Field::Number);
    client.client_type = c.client_type();
    client.first_seen = c.time(Field::FirstTime);
    client.last_seen = c.time(Field::LastTime);
    client.manuf = c.text(Field::Manuf);
    client.channel = c.channel();
    client.frequencies = c.frequencies();
    client.max_seen_rate = c.uint(Field::MaxSeenRate);
    client.carrier = c.text(Field::Carrier);
    client.encoding = c.text(Field::Encoding);
    client.data_size = c.uint(Field::DataSize);

    for node in std::mem::take(&mut c.nodes) {
        match node {
            Node::Ssid(record) => client.ssid_records.push(record),
            Node::SeenCard(card) => client.seen_cards.push(card),
            Node::Packets(packets) => c.single(&mut client.packets, packets, "packets", warnings),
            Node::Signal(signal) => c.single(&mut client.signal, signal, "snr-info", warnings),
            Node::Gps(gps) => c.single(&mut client.gps, gps, "gps-info", warnings),
            Node::Network(_) | Node::Client(_) | Node::CardSource(_) | Node::Field(_) | Node::Raw(_) => {}
        }
    }

    client.extensions = c.extensions;
    Ok(client)
}

fn ssid(mut c: Collected, warnings: &mut Vec<ParseWarning>) -> Result<SsidRecord, ValidationError> {
    let mut record = SsidRecord {
        essid: c.text(Field::Essid),
        cloaked: c.flag(Field::Cloaked),
        encryption: c.encryption(),
        first_seen: c.time(Field::FirstTime),
        last_seen: c.time(Field::LastTime),
        frame_type: c.text(Field::FrameType),
        max_rate: c.float(Field::MaxRate),
        packets: c.uint(Field::PacketCount),
        beacon_rate: c.uint(Field::BeaconRate),
        wpa_version: c.text(Field::WpaVersion),
        info: c.text(Field::Info),
        wps: c.text(Field::Wps),
        wps_manuf: c.text(Field::WpsManuf),
        device_name: c.text(Field::DeviceName),
        model_name: c.text(Field::ModelName),
        model_number: c.text(Field::ModelNumber),
        ..Default::default()
    };

    for node in std::mem::take(&mut c.nodes) {
        if let Node::Signal(signal) = node {
            c.single(&mut record.signal, signal, "snr-info", warnings);
        }
    }

    record.extensions = c.extensions;
    Ok(record)
}

fn packets(mut c: Collected) -> PacketCounts {
    PacketCounts {
        llc: c.uint(Field::Llc),
        data: c.uint(Field::Data),
        crypt: c.uint(Field::Crypt),
        total: c.uint(Field::Total),
        fragments: c.uint(Field::Fragments),
        retries: c.uint(Field::Retries),
        extensions: c.extensions,
    }
}

fn signal(mut c: Collected) -> Result<SignalRecord, ValidationError> {
    let record = SignalRecord {
        last_signal_dbm: c.level(Field::LastSignalDbm),
        min_signal_dbm: c.level(Field::MinSignalDbm),
        max_signal_dbm: c.level(Field::MaxSignalDbm),
        last_noise_dbm: c.level(Field::LastNoiseDbm),
        min_noise_dbm: c.level(Field::MinNoiseDbm),
        max_noise_dbm: c.level(Field::MaxNoiseDbm),
        last_signal_rssi: c.level(Field::LastSignalRssi),
        min_signal_rssi: c.level(Field::MinSignalRssi),
        max_signal_rssi: c.level(Field::MaxSignalRssi),
        last_noise_rssi: c.level(Field::LastNoiseRssi),
        min_noise_rssi: c.level(Field::MinNoiseRssi),
        max_noise_rssi: c.level(Field::MaxNoiseRssi),
        extensions: std::mem::take(&mut c.extensions),
    };

    if let Some(triple) = record.ordering_violation() {
        return Err(ValidationError::Invariant {
            element: c.element,
            message: format!("{triple} breaks min <= last <= max"),
            position: c.position,
        });
    }
    Ok(record)
}

fn gps(mut c: Collected) -> GpsInfo {
    GpsInfo {
        min_lat: c.float(Field::MinLat),
        min_lon: c.float(Field::MinLon),
        min_alt: c.float(Field::MinAlt),
        min_spd: c.float(Field::MinSpd),
        max_lat: c.float(Field::MaxLat),
        max_lon: c.float(Field::MaxLon),
        max_alt: c.float(Field::MaxAlt),
        max_spd: c.float(Field::MaxSpd),
        peak_lat: c.float(Field::PeakLat),
        peak_lon: c.float(Field::PeakLon),
        peak_alt: c.float(Field::PeakAlt),
        avg_lat: c.float(Field::AvgLat),
        avg_lon: c.float(Field::AvgLon),
        avg_alt: c.float(Field::AvgAlt),
        extensions: c.extensions,
    }
}

fn seen_card(mut c: Collected) -> SeenCard {
    SeenCard {
        uuid: c.text(Field::SeenUuid),
        time: c.time(Field::SeenTime),
        packets: c.uint(Field::SeenPackets),
        extensions: c.extensions,
    }
}

fn card_source(mut c: Collected) -> CardSource {
    CardSource {
        uuid: c.text(Field::Uuid),
        source: c.text(Field::SourceName),
        name: c.text(Field::CardName),
        interface: c.text(Field::CardInterface),
        card_type: c.text(Field::CardType),
        packets: c.uint(Field::CardPackets),
        hop: c.flag(Field::CardHop),
        channels: c.text(Field::CardChannels),
        extensions: c.extensions,
    }
}
