//! Element type registry.
//!
//! A static table decides, for every tag the parser opens, which object
//! variant it builds given the enclosing element, and which typed fields the
//! element's attributes and leaf children decode into. Nothing is resolved by
//! inspecting the model types at runtime; the tables in [`tables`] are the
//! whole schema.

pub mod codec;
pub mod tables;

pub use codec::{Codec, Value};

/// Object variant produced by an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// `detection-run`
    Document,
    /// `card-source` under the document
    CardSource,
    /// `wireless-network`
    Network,
    /// `wireless-client`
    Client,
    /// `SSID`
    Ssid,
    /// `packets` block
    Packets,
    /// `snr-info`
    Signal,
    /// `gps-info`
    Gps,
    /// `seen-card`
    SeenCard,
    /// Leaf element whose text is a field of the enclosing element.
    Field(Field),
    /// Anything else; preserved verbatim.
    Unrecognized,
}

impl ElementKind {
    /// Composite variants own a rule set and build a model object.
    pub fn is_composite(self) -> bool {
        !matches!(self, ElementKind::Field(_) | ElementKind::Unrecognized)
    }
}

/// Typed fields addressable by attributes or leaf elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    // document
    KismetVersion,
    StartTime,
    // card source
    Uuid,
    SourceName,
    CardName,
    CardInterface,
    CardType,
    CardPackets,
    CardHop,
    CardChannels,
    // network and client
    Number,
    Type,
    FirstTime,
    LastTime,
    Bssid,
    ClientMac,
    Manuf,
    Channel,
    FreqMhz,
    MaxSeenRate,
    Carrier,
    Encoding,
    DataSize,
    BssTimestamp,
    CdpDevice,
    CdpPortId,
    // ssid
    Essid,
    Cloaked,
    FrameType,
    MaxRate,
    PacketCount,
    BeaconRate,
    Encryption,
    WpaVersion,
    Info,
    Wps,
    WpsManuf,
    DeviceName,
    ModelName,
    ModelNumber,
    // packets
    Llc,
    Data,
    Crypt,
    Total,
    Fragments,
    Retries,
    // snr-info
    LastSignalDbm,
    MinSignalDbm,
    MaxSignalDbm,
    LastNoiseDbm,
    MinNoiseDbm,
    MaxNoiseDbm,
    LastSignalRssi,
    MinSignalRssi,
    MaxSignalRssi,
    LastNoiseRssi,
    MinNoiseRssi,
    MaxNoiseRssi,
    // gps-info
    MinLat,
    MinLon,
    MinAlt,
    MinSpd,
    MaxLat,
    MaxLon,
    MaxAlt,
    MaxSpd,
    PeakLat,
    PeakLon,
    PeakAlt,
    AvgLat,
    AvgLon,
    AvgAlt,
    // seen-card
    SeenUuid,
    SeenTime,
    SeenPackets,
}

/// Where the serializer writes a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Attribute,
    Element,
    /// An attribute of the given field's leaf element.
    OnLeaf(Field),
}

/// Decoding rule for one field of one element kind.
#[derive(Clone, Copy)]
pub struct FieldRule {
    pub field: Field,
    /// Canonical spelling, used when writing.
    pub name: &'static str,
    /// Other spellings accepted when reading.
    pub aliases: &'static [&'static str],
    pub placement: Placement,
    pub codec: Codec,
    /// Every occurrence is kept, in document order.
    pub repeated: bool,
    /// Validity predicate applied after decoding.
    pub valid: fn(&Value) -> bool,
    /// What `valid` expects, for error messages.
    pub expects: &'static str,
}

impl FieldRule {
    pub const fn attr(field: Field, name: &'static str, codec: Codec) -> Self {
        Self {
            field,
            name,
            aliases: &[],
            placement: Placement::Attribute,
            codec,
            repeated: false,
            valid: codec::any_value,
            expects: "",
        }
    }

    pub const fn elem(field: Field, name: &'static str, codec: Codec) -> Self {
        Self {
            placement: Placement::Element,
            ..Self::attr(field, name, codec)
        }
    }

    pub const fn on_leaf(mut self, leaf: Field) -> Self {
        self.placement = Placement::OnLeaf(leaf);
        self
    }

    pub const fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    pub const fn checked(mut self, valid: fn(&Value) -> bool, expects: &'static str) -> Self {
        self.valid = valid;
        self.expects = expects;
        self
    }

    /// Whether `name` (as written in a document) addresses this rule.
    pub fn matches(&self, name: &str) -> bool {
        names_equal(self.name, name) || self.aliases.iter().any(|alias| names_equal(alias, name))
    }

    /// Decode and validate raw text. `Ok(None)` means the field is absent.
    pub fn decode(&self, raw: &str) -> Result<Option<Value>, String> {
        match self.codec.decode(raw)? {
            Some(value) if !(self.valid)(&value) => Err(format!(
                "value {:?} out of range: expected {}",
                raw.trim(),
                self.expects
            )),
            other => Ok(other),
        }
    }
}

/// Schema names compare ASCII-case-insensitively with `-` and `_` equal.
///
/// Kismet mixes `SSID`, `LLC`, `first-time` and `last_signal_dbm`, and older
/// writers are not consistent about any of them.
pub fn names_equal(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes().zip(b.bytes()).all(|(x, y)| {
            let norm = |c: u8| if c == b'_' { b'-' } else { c.to_ascii_lowercase() };
            norm(x) == norm(y)
        })
}

/// Resolve the variant for `tag` opened inside `parent` (`None` at the root).
pub fn resolve(parent: Option<ElementKind>, tag: &str) -> ElementKind {
    let Some(parent) = parent else {
        return tables::ROOT_CHILDREN
            .iter()
            .find(|(name, _)| names_equal(name, tag))
            .map(|(_, kind)| *kind)
            .unwrap_or(ElementKind::Unrecognized);
    };

    if !parent.is_composite() {
        return ElementKind::Unrecognized;
    }

    if let Some((_, kind)) = tables::children(parent)
        .iter()
        .find(|(name, _)| names_equal(name, tag))
    {
        return *kind;
    }

    match field_rule(parent, tag) {
        Some(rule) => ElementKind::Field(rule.field),
        None => ElementKind::Unrecognized,
    }
}

/// Field rules of a composite variant.
pub fn rules(kind: ElementKind) -> &'static [FieldRule] {
    tables::rules(kind)
}

/// Rule addressed by an attribute or leaf element name within `kind`.
pub fn field_rule(kind: ElementKind, name: &str) -> Option<&'static FieldRule> {
    rules(kind).iter().find(|rule| rule.matches(name))
}

/// Rule for a known field of `kind`.
pub fn rule_for(kind: ElementKind, field: Field) -> Option<&'static FieldRule> {
    rules(kind).iter().find(|rule| rule.field == field)
}

/// Canonical tag of a composite variant.
pub fn tag_name(kind: ElementKind) -> &'static str {
    match kind {
        ElementKind::Document => tables::tag::DETECTION_RUN,
        ElementKind::CardSource => tables::tag::CARD_SOURCE,
        ElementKind::Network => tables::tag::WIRELESS_NETWORK,
        ElementKind::Client => tables::tag::WIRELESS_CLIENT,
        ElementKind::Ssid => tables::tag::SSID,
        ElementKind::Packets => tables::tag::PACKETS,
        ElementKind::Signal => tables::tag::SNR_INFO,
        ElementKind::Gps => tables::tag::GPS_INFO,
        ElementKind::SeenCard => tables::tag::SEEN_CARD,
        ElementKind::Field(_) | ElementKind::Unrecognized => "",
    }
}

/// Canonical name of `field` within `kind`.
pub fn field_name(kind: ElementKind, field: Field) -> &'static str {
    rule_for(kind, field).map(|rule| rule.name).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_equal_normalizes() {
        assert!(names_equal("last_signal_dbm", "last-signal-dbm"));
        assert!(names_equal("SSID", "ssid"));
        assert!(names_equal("LLC", "llc"));
        assert!(!names_equal("ssid", "essid"));
    }

    #[test]
    fn test_root_resolution() {
        assert_eq!(resolve(None, "detection-run"), ElementKind::Document);
        assert_eq!(resolve(None, "wireless-network"), ElementKind::Network);
        assert_eq!(resolve(None, "kml"), ElementKind::Unrecognized);
    }

    #[test]
    fn test_packets_depends_on_parent() {
        assert_eq!(
            resolve(Some(ElementKind::Network), "packets"),
            ElementKind::Packets
        );
        assert_eq!(
            resolve(Some(ElementKind::Ssid), "packets"),
            ElementKind::Field(Field::PacketCount)
        );
    }

    #[test]
    fn test_card_source_nests_a_field_of_the_same_name() {
        let outer = resolve(Some(ElementKind::Document), "card-source");
        assert_eq!(outer, ElementKind::CardSource);
        assert_eq!(
            resolve(Some(outer), "card-source"),
            ElementKind::Field(Field::SourceName)
        );
    }

    #[test]
    fn test_fields_and_unknowns() {
        assert_eq!(
            resolve(Some(ElementKind::Network), "BSSID"),
            ElementKind::Field(Field::Bssid)
        );
        assert_eq!(
            resolve(Some(ElementKind::Network), "vendor-blob"),
            ElementKind::Unrecognized
        );
        assert_eq!(
            resolve(Some(ElementKind::Field(Field::Channel)), "nested"),
            ElementKind::Unrecognized
        );
        assert_eq!(
            resolve(Some(ElementKind::Unrecognized), "SSID"),
            ElementKind::Unrecognized
        );
    }

    #[test]
    fn test_ssid_aliases() {
        assert_eq!(
            resolve(Some(ElementKind::Ssid), "ssid"),
            ElementKind::Field(Field::Essid)
        );
        assert_eq!(field_name(ElementKind::Ssid, Field::Essid), "essid");
    }

    #[test]
    fn test_cloaked_is_written_on_the_essid_leaf() {
        let rule = rule_for(ElementKind::Ssid, Field::Cloaked).unwrap();
        assert_eq!(rule.placement, Placement::OnLeaf(Field::Essid));
        assert_eq!(
            rule_for(ElementKind::Ssid, Field::Essid).map(|rule| rule.placement),
            Some(Placement::Element)
        );
        // Leaf attributes must name an element-placed field of the same owner.
        for kind in [ElementKind::Network, ElementKind::Client, ElementKind::Ssid] {
            for rule in rules(kind) {
                if let Placement::OnLeaf(leaf) = rule.placement {
                    let target = rule_for(kind, leaf).map(|rule| rule.placement);
                    assert_eq!(target, Some(Placement::Element), "{kind:?}: {}", rule.name);
                }
            }
        }
    }

    #[test]
    fn test_rule_decode_applies_predicate() {
        let rule = rule_for(ElementKind::Network, Field::Channel).unwrap();
        assert_eq!(rule.decode("11"), Ok(Some(Value::UInt(11))));
        assert!(rule.decode("4000").unwrap_err().contains("channel"));
    }

    #[test]
    fn test_every_composite_has_rules_and_a_tag() {
        for kind in [
            ElementKind::Document,
            ElementKind::CardSource,
            ElementKind::Network,
            ElementKind::Client,
            ElementKind::Ssid,
            ElementKind::Packets,
            ElementKind::Signal,
            ElementKind::Gps,
            ElementKind::SeenCard,
        ] {
            assert!(!rules(kind).is_empty(), "{kind:?} has no rules");
            assert!(!tag_name(kind).is_empty(), "{kind:?} has no tag");
        }
    }

    #[test]
    fn test_rule_names_are_unique_per_kind() {
        for kind in [ElementKind::Network, ElementKind::Client, ElementKind::Ssid] {
            let rules = rules(kind);
            for (i, a) in rules.iter().enumerate() {
                for b in &rules[i + 1..] {
                    assert!(!b.matches(a.name), "{kind:?}: {} shadows {}", a.name, b.name);
                }
            }
        }
    }
}
