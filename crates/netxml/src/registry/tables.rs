//! The NetXML schema as static tables.
//!
//! Canonical names follow what Kismet writes. Every field may appear either as
//! an attribute or as a leaf element when reading; `Placement` only decides
//! how the serializer writes it.

use super::codec::{self, Codec};
use super::{ElementKind, Field, FieldRule};

pub mod tag {
    pub const DETECTION_RUN: &str = "detection-run";
    pub const CARD_SOURCE: &str = "card-source";
    pub const WIRELESS_NETWORK: &str = "wireless-network";
    pub const WIRELESS_CLIENT: &str = "wireless-client";
    pub const SSID: &str = "SSID";
    pub const PACKETS: &str = "packets";
    pub const SNR_INFO: &str = "snr-info";
    pub const GPS_INFO: &str = "gps-info";
    pub const SEEN_CARD: &str = "seen-card";
}

/// Variants allowed at the document root.
pub static ROOT_CHILDREN: &[(&str, ElementKind)] = &[
    (tag::DETECTION_RUN, ElementKind::Document),
    (tag::WIRELESS_NETWORK, ElementKind::Network),
];

static DOCUMENT_CHILDREN: &[(&str, ElementKind)] = &[
    (tag::CARD_SOURCE, ElementKind::CardSource),
    (tag::WIRELESS_NETWORK, ElementKind::Network),
];

static NETWORK_CHILDREN: &[(&str, ElementKind)] = &[
    (tag::SSID, ElementKind::Ssid),
    (tag::PACKETS, ElementKind::Packets),
    (tag::SNR_INFO, ElementKind::Signal),
    (tag::GPS_INFO, ElementKind::Gps),
    (tag::SEEN_CARD, ElementKind::SeenCard),
    (tag::WIRELESS_CLIENT, ElementKind::Client),
];

static CLIENT_CHILDREN: &[(&str, ElementKind)] = &[
    (tag::SSID, ElementKind::Ssid),
    (tag::PACKETS, ElementKind::Packets),
    (tag::SNR_INFO, ElementKind::Signal),
    (tag::GPS_INFO, ElementKind::Gps),
    (tag::SEEN_CARD, ElementKind::SeenCard),
];

static SSID_CHILDREN: &[(&str, ElementKind)] = &[(tag::SNR_INFO, ElementKind::Signal)];

/// Composite children of `parent`, by tag.
pub fn children(parent: ElementKind) -> &'static [(&'static str, ElementKind)] {
    match parent {
        ElementKind::Document => DOCUMENT_CHILDREN,
        ElementKind::Network => NETWORK_CHILDREN,
        ElementKind::Client => CLIENT_CHILDREN,
        ElementKind::Ssid => SSID_CHILDREN,
        _ => &[],
    }
}

const CHANNEL: &str = "a channel number from 0 to 255";
const LEVEL: &str = "a 32-bit signal level";
const LAT: &str = "a latitude in degrees";
const LON: &str = "a longitude in degrees";
const FINITE: &str = "a finite number";

static DOCUMENT_FIELDS: &[FieldRule] = &[
    FieldRule::attr(Field::KismetVersion, "kismet-version", Codec::Text),
    FieldRule::attr(Field::StartTime, "start-time", Codec::Time),
];

static CARD_SOURCE_FIELDS: &[FieldRule] = &[
    FieldRule::attr(Field::Uuid, "uuid", Codec::Text),
    FieldRule::elem(Field::SourceName, "card-source", Codec::Text),
    FieldRule::elem(Field::CardName, "card-name", Codec::Text),
    FieldRule::elem(Field::CardInterface, "card-interface", Codec::Text),
    FieldRule::elem(Field::CardType, "card-type", Codec::Text),
    FieldRule::elem(Field::CardPackets, "card-packets", Codec::UInt),
    FieldRule::elem(Field::CardHop, "card-hop", Codec::Bool),
    FieldRule::elem(Field::CardChannels, "card-channels", Codec::Text),
];

static NETWORK_FIELDS: &[FieldRule] = &[
    FieldRule::attr(Field::Number, "number", Codec::UInt),
    FieldRule::attr(Field::Type, "type", Codec::NetworkType),
    FieldRule::attr(Field::FirstTime, "first-time", Codec::Time),
    FieldRule::attr(Field::LastTime, "last-time", Codec::Time),
    FieldRule::elem(Field::Bssid, "BSSID", Codec::Mac),
    FieldRule::elem(Field::Manuf, "manuf", Codec::Text),
    FieldRule::elem(Field::Channel, "channel", Codec::UInt)
        .checked(codec::channel_number, CHANNEL),
    FieldRule::elem(Field::FreqMhz, "freqmhz", Codec::Frequency).repeated(),
    FieldRule::elem(Field::MaxSeenRate, "maxseenrate", Codec::UInt),
    FieldRule::elem(Field::Carrier, "carrier", Codec::Text),
    FieldRule::elem(Field::Encoding, "encoding", Codec::Text),
    FieldRule::elem(Field::DataSize, "datasize", Codec::UInt),
    FieldRule::elem(Field::BssTimestamp, "bsstimestamp", Codec::UInt),
    FieldRule::elem(Field::CdpDevice, "cdp-device", Codec::Text),
    FieldRule::elem(Field::CdpPortId, "cdp-portid", Codec::Text),
];

static CLIENT_FIELDS: &[FieldRule] = &[
    FieldRule::attr(Field::Number, "number", Codec::UInt),
    FieldRule::attr(Field::Type, "type", Codec::ClientType),
    FieldRule::attr(Field::FirstTime, "first-time", Codec::Time),
    FieldRule::attr(Field::LastTime, "last-time", Codec::Time),
    FieldRule::elem(Field::ClientMac, "client-mac", Codec::Mac).aliases(&["mac"]),
    FieldRule::elem(Field::Manuf, "client-manuf", Codec::Text),
    FieldRule::elem(Field::Channel, "channel", Codec::UInt)
        .checked(codec::channel_number, CHANNEL),
    FieldRule::elem(Field::FreqMhz, "freqmhz", Codec::Frequency).repeated(),
    FieldRule::elem(Field::MaxSeenRate, "maxseenrate", Codec::UInt),
    FieldRule::elem(Field::Carrier, "carrier", Codec::Text),
    FieldRule::elem(Field::Encoding, "encoding", Codec::Text),
    FieldRule::elem(Field::DataSize, "datasize", Codec::UInt),
];

static SSID_FIELDS: &[FieldRule] = &[
    FieldRule::attr(Field::FirstTime, "first-time", Codec::Time),
    FieldRule::attr(Field::LastTime, "last-time", Codec::Time),
    FieldRule::elem(Field::FrameType, "type", Codec::Text),
    FieldRule::elem(Field::MaxRate, "max-rate", Codec::Float).checked(codec::finite, FINITE),
    FieldRule::elem(Field::PacketCount, "packets", Codec::UInt),
    FieldRule::elem(Field::BeaconRate, "beaconrate", Codec::UInt),
    FieldRule::elem(Field::Encryption, "encryption", Codec::Encryption).repeated(),
    FieldRule::elem(Field::WpaVersion, "wpa-version", Codec::Text),
    FieldRule::elem(Field::Wps, "wps", Codec::Text),
    FieldRule::elem(Field::WpsManuf, "wps-manuf", Codec::Text),
    FieldRule::elem(Field::DeviceName, "dev-name", Codec::Text),
    FieldRule::elem(Field::ModelName, "model-name", Codec::Text),
    FieldRule::elem(Field::ModelNumber, "model-num", Codec::Text),
    FieldRule::elem(Field::Info, "info", Codec::Text),
    // Known attributes of a leaf address the owning SSID's fields.
    FieldRule::attr(Field::Cloaked, "cloaked", Codec::Bool).on_leaf(Field::Essid),
    FieldRule::elem(Field::Essid, "essid", Codec::Verbatim).aliases(&["ssid"]),
];

static PACKET_FIELDS: &[FieldRule] = &[
    FieldRule::elem(Field::Llc, "LLC", Codec::UInt),
    FieldRule::elem(Field::Data, "data", Codec::UInt),
    FieldRule::elem(Field::Crypt, "crypt", Codec::UInt),
    FieldRule::elem(Field::Total, "total", Codec::UInt),
    FieldRule::elem(Field::Fragments, "fragments", Codec::UInt),
    FieldRule::elem(Field::Retries, "retries", Codec::UInt),
];

const fn level(field: Field, name: &'static str) -> FieldRule {
    FieldRule::elem(field, name, Codec::Int).checked(codec::signal_level, LEVEL)
}

static SIGNAL_FIELDS: &[FieldRule] = &[
    level(Field::LastSignalDbm, "last_signal_dbm"),
    level(Field::LastNoiseDbm, "last_noise_dbm"),
    level(Field::LastSignalRssi, "last_signal_rssi"),
    level(Field::LastNoiseRssi, "last_noise_rssi"),
    level(Field::MinSignalDbm, "min_signal_dbm"),
    level(Field::MinNoiseDbm, "min_noise_dbm"),
    level(Field::MinSignalRssi, "min_signal_rssi"),
    level(Field::MinNoiseRssi, "min_noise_rssi"),
    level(Field::MaxSignalDbm, "max_signal_dbm"),
    level(Field::MaxNoiseDbm, "max_noise_dbm"),
    level(Field::MaxSignalRssi, "max_signal_rssi"),
    level(Field::MaxNoiseRssi, "max_noise_rssi"),
];

const fn lat(field: Field, name: &'static str) -> FieldRule {
    FieldRule::elem(field, name, Codec::Float).checked(codec::latitude, LAT)
}

const fn lon(field: Field, name: &'static str) -> FieldRule {
    FieldRule::elem(field, name, Codec::Float).checked(codec::longitude, LON)
}

const fn float(field: Field, name: &'static str) -> FieldRule {
    FieldRule::elem(field, name, Codec::Float).checked(codec::finite, FINITE)
}

static GPS_FIELDS: &[FieldRule] = &[
    lat(Field::MinLat, "min-lat"),
    lon(Field::MinLon, "min-lon"),
    float(Field::MinAlt, "min-alt"),
    float(Field::MinSpd, "min-spd"),
    lat(Field::MaxLat, "max-lat"),
    lon(Field::MaxLon, "max-lon"),
    float(Field::MaxAlt, "max-alt"),
    float(Field::MaxSpd, "max-spd"),
    lat(Field::PeakLat, "peak-lat"),
    lon(Field::PeakLon, "peak-lon"),
    float(Field::PeakAlt, "peak-alt"),
    lat(Field::AvgLat, "avg-lat"),
    lon(Field::AvgLon, "avg-lon"),
    float(Field::AvgAlt, "avg-alt"),
];

static SEEN_CARD_FIELDS: &[FieldRule] = &[
    FieldRule::elem(Field::SeenUuid, "seen-uuid", Codec::Text),
    FieldRule::elem(Field::SeenTime, "seen-time", Codec::Time),
    FieldRule::elem(Field::SeenPackets, "seen-packets", Codec::UInt),
];

/// Field rules of a composite variant; empty for leaves and unknowns.
pub fn rules(kind: ElementKind) -> &'static [FieldRule] {
    match kind {
        ElementKind::Document => DOCUMENT_FIELDS,
        ElementKind::CardSource => CARD_SOURCE_FIELDS,
        ElementKind::Network => NETWORK_FIELDS,
        ElementKind::Client => CLIENT_FIELDS,
        ElementKind::Ssid => SSID_FIELDS,
        ElementKind::Packets => PACKET_FIELDS,
        ElementKind::Signal => SIGNAL_FIELDS,
        ElementKind::Gps => GPS_FIELDS,
        ElementKind::SeenCard => SEEN_CARD_FIELDS,
        ElementKind::Field(_) | ElementKind::Unrecognized => &[],
    }
}
