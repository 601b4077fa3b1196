//! Open-element stack entries and the finished nodes they turn into.

use super::position::Position;
use crate::model::{
    CardSource, GpsInfo, PacketCounts, RawElement, SeenCard, SignalRecord, SsidRecord,
    WirelessClient, WirelessNetwork,
};
use crate::registry::{ElementKind, Field};

/// One open element.
#[derive(Debug)]
pub(crate) struct Frame {
    pub kind: ElementKind,
    pub name: String,
    pub position: Position,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<Node>,
}

impl Frame {
    pub fn new(
        kind: ElementKind,
        name: String,
        position: Position,
        attributes: Vec<(String, String)>,
    ) -> Self {
        Self {
            kind,
            name,
            position,
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Keep the element verbatim. Only raw children can occur below an
    /// unrecognized element.
    pub fn into_raw(self) -> RawElement {
        raw(self.name, self.attributes, &self.text, raw_children(self.children))
    }

    pub fn into_leaf(self, field: Field) -> Leaf {
        Leaf {
            field,
            name: self.name,
            text: self.text,
            attributes: self.attributes,
            stray: raw_children(self.children),
            position: self.position,
        }
    }
}

fn raw(name: String, attributes: Vec<(String, String)>, text: &str, children: Vec<RawElement>) -> RawElement {
    let text = text.trim();
    RawElement {
        name,
        attributes,
        text: (!text.is_empty()).then(|| text.to_string()),
        children,
    }
}

fn raw_children(children: Vec<Node>) -> Vec<RawElement> {
    children
        .into_iter()
        .filter_map(|node| match node {
            Node::Raw(raw) => Some(raw),
            _ => None,
        })
        .collect()
}

/// A closed field element, waiting for its owner to close.
#[derive(Debug)]
pub(crate) struct Leaf {
    pub field: Field,
    /// Tag as written in the document.
    pub name: String,
    pub text: String,
    pub attributes: Vec<(String, String)>,
    /// Unknown elements nested inside the leaf.
    pub stray: Vec<RawElement>,
    pub position: Position,
}

impl Leaf {
    /// Keep a leaf its owner has no rule for.
    pub fn into_raw(self) -> RawElement {
        raw(self.name, self.attributes, &self.text, self.stray)
    }
}

/// A closed element attached to its parent frame.
#[derive(Debug)]
pub(crate) enum Node {
    Field(Leaf),
    Network(Box<WirelessNetwork>),
    Client(WirelessClient),
    Ssid(SsidRecord),
    Packets(PacketCounts),
    Signal(SignalRecord),
    Gps(GpsInfo),
    SeenCard(SeenCard),
    CardSource(CardSource),
    Raw(RawElement),
}
