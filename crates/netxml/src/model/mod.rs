//! Typed object model for NetXML documents.
//!
//! Every entity is plain owned data. Optional schema fields are `Option`s and
//! are never filled with inferred defaults; repeated children are `Vec`s in
//! document order. Anything the registry does not know is kept in
//! [`Extensions`] so it can be written back out.

pub mod client;
pub mod document;
pub mod extensions;
pub mod kinds;
pub mod mac;
pub mod network;
pub mod records;
pub mod ssid;
pub mod time;

pub use client::{AssociatedClient, ClientKey, WirelessClient};
pub use document::{DocumentHeader, NetXmlDocument};
pub use extensions::{Extensions, LeafAttribute, RawElement};
pub use kinds::{Authentication, Cipher, ClientType, Encryption, NetworkType, Privacy, Security};
pub use mac::{MacAddress, MacParseError, Oui};
pub use network::{NetworkKey, WirelessNetwork};
pub use records::{CardSource, FrequencyRecord, GpsInfo, PacketCounts, SeenCard, SignalRecord};
pub use ssid::SsidRecord;
pub use time::{Timestamp, KISMET_TIME_FORMAT};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_model_can_cross_threads() {
        assert_send_sync::<NetXmlDocument>();
        assert_send_sync::<WirelessNetwork>();
        assert_send_sync::<WirelessClient>();
        assert_send_sync::<SsidRecord>();
        assert_send_sync::<SignalRecord>();
    }
}
