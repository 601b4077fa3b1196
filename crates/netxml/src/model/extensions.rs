//! Verbatim storage for content the registry does not recognize.

use serde::Serialize;

/// An element outside the known schema, kept as it appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawElement {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawElement>,
}

impl RawElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// An unknown attribute found on one of an entity's leaf elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafAttribute {
    /// Canonical name of the leaf, e.g. `essid`.
    pub leaf: String,
    /// Which occurrence of that leaf within the entity, from 0. Entries are
    /// kept ordered by leaf name, then occurrence.
    pub index: usize,
    pub name: String,
    pub value: String,
}

/// Unknown attributes and child elements attached to a model entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extensions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leaf_attributes: Vec<LeafAttribute>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub elements: Vec<RawElement>,
}

impl Extensions {
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.leaf_attributes.is_empty() && self.elements.is_empty()
    }

    /// Unknown attributes of occurrence `index` of the `leaf` element.
    pub fn on_leaf<'a>(
        &'a self,
        leaf: &'a str,
        index: usize,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.leaf_attributes
            .iter()
            .filter(move |attr| attr.leaf == leaf && attr.index == index)
            .map(|attr| (attr.name.as_str(), attr.value.as_str()))
    }
}
