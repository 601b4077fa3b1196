//! NetXML: streaming parser, typed model and serializer for Kismet-style
//! wireless survey documents.
//!
//! ```no_run
//! use netxml::iterparse_path;
//!
//! # fn main() -> Result<(), netxml::ParseError> {
//! for network in iterparse_path("survey.netxml")? {
//!     let network = network?;
//!     let essid = network.latest_ssid().and_then(|s| s.essid.as_deref());
//!     println!("{} {:?} {:?}", network.bssid, network.channel, essid);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Parsing is a single forward pass. Each `wireless-network` is handed out
//! as soon as its closing tag is read, so memory use is bounded by the
//! largest single network rather than by the document.

pub mod error;
pub mod model;
pub mod parser;
pub mod registry;
pub mod serializer;

pub use error::{ParseError, SerializeError, StructuralError, ValidationError};
pub use model::{
    AssociatedClient, Authentication, CardSource, Cipher, ClientKey, ClientType, DocumentHeader,
    Encryption, Extensions, FrequencyRecord, GpsInfo, LeafAttribute, MacAddress, MacParseError,
    NetXmlDocument, NetworkKey, NetworkType, Oui, PacketCounts, Privacy, RawElement, SeenCard,
    Security, SignalRecord, SsidRecord, Timestamp, WirelessClient, WirelessNetwork,
};
pub use parser::{
    iterparse, iterparse_path, iterparse_with, NetworkStream, ParseOptions, ParseWarning,
    ParsedDocument, Position, ValidationPolicy, WarningKind,
};
pub use serializer::{serialize, write_document, write_network};
