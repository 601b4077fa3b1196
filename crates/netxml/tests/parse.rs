use netxml::{
    iterparse, iterparse_path, ClientType, Cipher, Encryption, NetXmlDocument, NetworkStream,
    NetworkType, ParseError, Privacy, SsidRecord, WarningKind, WirelessNetwork,
};
use std::collections::BTreeSet;
use std::io::Write;

const SAMPLE: &str = include_str!("fixtures/kismet-sample.netxml");

fn parse_all(xml: &str) -> Vec<WirelessNetwork> {
    NetworkStream::from_str(xml)
        .collect::<Result<_, _>>()
        .expect("document should parse")
}

#[test]
fn test_sample_header() {
    let parsed = NetworkStream::from_str(SAMPLE).into_document().unwrap();
    let header = &parsed.document.header;

    assert_eq!(header.kismet_version.as_deref(), Some("2013.03.R1b"));
    assert_eq!(
        header.start_time.map(|t| t.to_string()),
        Some("Thu May  7 08:23:32 2015".to_string())
    );
    assert_eq!(header.card_sources.len(), 1);

    let card = &header.card_sources[0];
    assert_eq!(card.uuid.as_deref(), Some("c4d2e9a0-f4a8-11e4-9b3e-1b2bb0c25a01"));
    assert_eq!(card.source.as_deref(), Some("wlan0"));
    assert_eq!(card.card_type.as_deref(), Some("rt2800usb"));
    assert_eq!(card.packets, Some(4821));
    assert_eq!(card.hop, Some(true));
    assert!(parsed.warnings.is_empty(), "{:?}", parsed.warnings);
    assert!(parsed.rejected.is_empty());
}

#[test]
fn test_sample_networks() {
    let networks = parse_all(SAMPLE);
    assert_eq!(networks.len(), 3);

    let home = &networks[0];
    assert_eq!(home.bssid.to_string(), "00:1A:2B:3C:4D:5E");
    assert_eq!(home.bssid.oui().to_string(), "00:1A:2B");
    assert_eq!(home.number, Some(1));
    assert_eq!(home.network_type, Some(NetworkType::Infrastructure));
    assert_eq!(home.channel, Some(6));
    assert_eq!(home.manuf.as_deref(), Some("Netgear"));
    assert_eq!(home.frequencies.len(), 1);
    assert_eq!(home.frequencies[0].mhz, 2437);
    assert_eq!(home.frequencies[0].packets, Some(815));
    assert_eq!(home.max_seen_rate, Some(54000));
    assert_eq!(home.carrier.as_deref(), Some("IEEE 802.11g"));
    assert_eq!(home.data_size, Some(481920));
    assert_eq!(home.bss_timestamp, Some(1829374650));
    assert_eq!(home.cdp_device, None);
    assert_eq!(home.cdp_port_id, None);

    let packets = home.packets.as_ref().unwrap();
    assert_eq!(packets.total, Some(2019));
    assert_eq!(packets.retries, Some(12));

    let signal = home.signal.as_ref().unwrap();
    assert_eq!(signal.last_signal_dbm, Some(-63));
    assert_eq!(signal.min_signal_dbm, Some(-81));
    assert_eq!(signal.max_signal_dbm, Some(-55));

    let gps = home.gps.as_ref().unwrap();
    assert_eq!(gps.best_fix(), Some((-36.85102, 174.76412)));
    assert_eq!(gps.max_spd, Some(4.1));

    assert_eq!(home.seen_cards.len(), 1);
    assert_eq!(home.seen_cards[0].packets, Some(2019));
}

#[test]
fn test_sample_ssids_and_security() {
    let networks = parse_all(SAMPLE);
    let home = &networks[0];

    assert_eq!(home.essids().collect::<Vec<_>>(), vec!["HomeNet", "HomeNet-5G"]);
    assert_eq!(home.latest_ssid().and_then(|s| s.essid.as_deref()), Some("HomeNet-5G"));

    let beacon = &home.ssid_records[0];
    assert_eq!(beacon.frame_type.as_deref(), Some("Beacon"));
    assert_eq!(beacon.max_rate, Some(54.0));
    assert_eq!(beacon.packets, Some(812));
    assert_eq!(beacon.beacon_rate, Some(10));
    assert_eq!(beacon.cloaked, Some(false));
    assert_eq!(
        beacon.encryption,
        BTreeSet::from([Encryption::WpaPsk, Encryption::WpaAesCcm])
    );

    let security = beacon.security();
    assert_eq!(security.privacy, Privacy::Wpa("WPA2".into()));
    assert_eq!(security.cipher, Cipher::AesCcmp);

    let cafe = &networks[1];
    assert_eq!(cafe.encryption(), BTreeSet::from([Encryption::Wep]));
    assert_eq!(cafe.ssid_records[0].security().privacy, Privacy::Wep);
    assert_eq!(cafe.ssid_records[0].essid.as_deref(), Some("Cafe Corner"));
}

#[test]
fn test_sample_clients() {
    let document = NetXmlDocument::parse(SAMPLE.as_bytes()).unwrap();
    assert_eq!(document.clients().count(), 3);

    let home = &document.networks()[0];
    assert_eq!(home.client_count(), 2);
    let first = home.clients().next().unwrap();
    assert_eq!(first.mac.to_string(), "A4:5E:60:11:22:33");
    assert_eq!(first.network_bssid(), home.bssid);
    assert_eq!(first.client_type, Some(ClientType::Established));
    assert_eq!(first.manuf.as_deref(), Some("Apple"));
    assert_eq!(first.packets.as_ref().and_then(|p| p.data), Some(388));
    assert_eq!(first.signal.as_ref().and_then(|s| s.max_signal_dbm), Some(-51));

    let second = &home.clients[1];
    assert_eq!(second.client_type, Some(ClientType::FromDs));
    assert!(!first.same_client(second));

    let probe = &document.networks()[2];
    assert_eq!(probe.network_type, Some(NetworkType::Probe));
    assert_eq!(probe.channel, Some(0));
    let probed = &probe.clients[0].ssid_records[0];
    assert_eq!(probed.essid.as_deref(), Some("airport-free"));
    assert_eq!(probed.encryption, BTreeSet::from([Encryption::None]));
    assert_eq!(probed.security().privacy, Privacy::Open);
}

#[test]
fn test_scenario_with_attribute_channel() {
    let xml = r#"<wireless-network bssid="AA:BB:CC:DD:EE:FF" type="infrastructure" channel="6">
  <SSID essid="home-net" encryption="wep"/>
</wireless-network>"#;
    let networks = parse_all(xml);
    assert_eq!(networks.len(), 1);

    let network = &networks[0];
    assert_eq!(network.bssid.to_string(), "AA:BB:CC:DD:EE:FF");
    assert_eq!(network.network_type, Some(NetworkType::Infrastructure));
    assert_eq!(network.channel, Some(6));
    assert_eq!(
        network.ssid_records,
        vec![SsidRecord {
            essid: Some("home-net".into()),
            encryption: BTreeSet::from([Encryption::Wep]),
            ..Default::default()
        }]
    );
}

#[test]
fn test_scenario_with_element_channel() {
    let xml = r#"<detection-run>
  <wireless-network bssid="aa:bb:cc:dd:ee:ff" type="infrastructure">
    <SSID essid="home-net" encryption="wep"/>
    <channel>6</channel>
  </wireless-network>
</detection-run>"#;
    let networks = parse_all(xml);
    assert_eq!(networks[0].bssid.to_string(), "AA:BB:CC:DD:EE:FF");
    assert_eq!(networks[0].channel, Some(6));
    assert_eq!(networks[0].ssid_records[0].essid.as_deref(), Some("home-net"));
}

#[test]
fn test_order_is_preserved() {
    let mut xml = String::from("<detection-run>\n");
    for i in 0..25u8 {
        xml.push_str(&format!(
            "  <wireless-network number=\"{i}\" bssid=\"02:00:00:00:00:{i:02X}\"/>\n"
        ));
    }
    xml.push_str("</detection-run>\n");

    let networks = parse_all(&xml);
    assert_eq!(networks.len(), 25);
    for (i, network) in networks.iter().enumerate() {
        assert_eq!(network.number, Some(i as u64));
        assert_eq!(network.bssid.octets()[5] as usize, i);
    }
}

#[test]
fn test_repeated_ssids_are_all_kept() {
    let xml = r#"<wireless-network bssid="00:11:22:33:44:55">
  <SSID><packets>1</packets><essid>same</essid></SSID>
  <SSID><packets>2</packets><essid>same</essid></SSID>
  <SSID><packets>3</packets><essid cloaked="true"></essid></SSID>
  <SSID><packets>4</packets><essid>same</essid></SSID>
</wireless-network>"#;
    let networks = parse_all(xml);
    let records = &networks[0].ssid_records;
    assert_eq!(records.len(), 4);
    assert_eq!(
        records.iter().map(|r| r.packets).collect::<Vec<_>>(),
        vec![Some(1), Some(2), Some(3), Some(4)]
    );
    assert_eq!(records[2].essid, None);
    assert!(records[2].is_cloaked());
}

#[test]
fn test_unknown_sibling_is_tolerated() {
    let plain = r#"<detection-run>
  <wireless-network bssid="00:11:22:33:44:55"><channel>1</channel></wireless-network>
</detection-run>"#;
    let extended = r#"<detection-run>
  <wireless-network bssid="00:11:22:33:44:55"><channel>1</channel></wireless-network>
  <vendor-blob id="7"><payload>opaque</payload></vendor-blob>
</detection-run>"#;

    let expected = parse_all(plain);
    let parsed = NetworkStream::from_str(extended).into_document().unwrap();

    assert_eq!(parsed.document.networks, expected);
    assert_eq!(parsed.warnings.len(), 1);
    let warning = &parsed.warnings[0];
    assert_eq!(warning.kind, WarningKind::UnknownElement);
    assert_eq!(warning.name, "vendor-blob");
    assert_eq!(warning.parent.as_deref(), Some("detection-run"));
    assert_eq!(warning.position.line, 3);

    let blob = &parsed.document.header.extensions.elements[0];
    assert_eq!(blob.attribute("id"), Some("7"));
    assert_eq!(blob.children[0].text.as_deref(), Some("opaque"));
}

#[test]
fn test_unknown_child_of_network_is_kept_on_the_network() {
    let xml = r#"<wireless-network bssid="00:11:22:33:44:55" vendor="acme">
  <vendor-blob>opaque</vendor-blob>
</wireless-network>"#;
    let parsed = NetworkStream::from_str(xml).into_document().unwrap();
    let network = &parsed.document.networks[0];

    assert_eq!(network.extensions.elements[0].name, "vendor-blob");
    assert_eq!(network.extensions.elements[0].text.as_deref(), Some("opaque"));
    assert_eq!(
        network.extensions.attributes,
        vec![("vendor".to_string(), "acme".to_string())]
    );
    let kinds: Vec<_> = parsed.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(kinds, vec![WarningKind::UnknownElement, WarningKind::UnknownAttribute]);
}

#[test]
fn test_warnings_are_visible_during_iteration() {
    let xml = r#"<detection-run>
  <mystery/>
  <wireless-network bssid="00:11:22:33:44:55"/>
  <wireless-network bssid="00:11:22:33:44:56"/>
</detection-run>"#;
    let mut stream = NetworkStream::from_str(xml);
    assert!(stream.next().unwrap().is_ok());
    assert_eq!(stream.warnings().len(), 1);
    assert!(stream.next().unwrap().is_ok());
    assert!(stream.next().is_none());
}

#[test]
fn test_unclosed_tag_after_complete_network() {
    let xml = r#"<detection-run>
  <wireless-network bssid="00:11:22:33:44:55"></wireless-network>
  <wireless-network bssid="00:11:22:33:44:66">
    <SSID>
"#;
    let mut stream = NetworkStream::from_str(xml);

    let first = stream.next().unwrap().unwrap();
    assert_eq!(first.bssid.to_string(), "00:11:22:33:44:55");

    match stream.next() {
        Some(Err(ParseError::Structural(err))) => {
            assert!(err.message.contains("<SSID>"), "{}", err.message);
            assert_eq!(err.position.line, 5);
            assert_eq!(err.position.byte, xml.len() as u64);
        }
        other => panic!("expected a structural error, got {other:?}"),
    }
    assert!(stream.next().is_none());
}

#[test]
fn test_mismatched_end_tag_is_structural() {
    let xml = r#"<detection-run>
  <wireless-network bssid="00:11:22:33:44:55"><SSID></wireless-network>
</detection-run>"#;
    let results: Vec<_> = NetworkStream::from_str(xml).collect();
    assert_eq!(results.len(), 1);
    let err = results.into_iter().next().unwrap().unwrap_err();
    assert!(matches!(err, ParseError::Structural(_)));
    assert!(err.to_string().contains("line 2"), "{err}");
}

#[test]
fn test_parse_from_reader_and_path() {
    let from_reader: Vec<_> = iterparse(SAMPLE.as_bytes())
        .collect::<Result<_, _>>()
        .unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    file.flush().unwrap();

    let from_path: Vec<_> = iterparse_path(file.path())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(from_reader, from_path);

    let document = NetXmlDocument::from_path(file.path()).unwrap();
    assert_eq!(document.networks, from_path);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = iterparse_path(dir.path().join("absent.netxml")).err().unwrap();
    assert!(matches!(err, ParseError::Io(_)));
}

#[test]
fn test_networks_move_to_other_threads() {
    let networks = parse_all(SAMPLE);
    let handles: Vec<_> = networks
        .into_iter()
        .map(|network| std::thread::spawn(move || network.ssid_records.len()))
        .collect();
    let counts: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![2, 1, 0]);
}
