//! `netxml list`: one line per network, streamed as the file is read.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use netxml::{iterparse_with, AssociatedClient, ParseOptions, Privacy, Security, WirelessNetwork};
use std::fs::File;
use std::path::Path;

/// List the networks in `path`, optionally with their clients.
pub fn run(path: &Path, options: ParseOptions, clients: bool) -> Result<()> {
    let s = Styled::new();
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let stream = iterparse_with(file, options);

    let mut rows = Vec::new();
    let mut count = 0usize;
    for network in stream {
        let network = network.with_context(|| format!("failed to parse {}", path.display()))?;
        count += 1;
        if output::is_json() {
            rows.push(network_json(&network, clients));
            continue;
        }
        println!("{}", network_line(&s, &network));
        if clients {
            for client in network.clients() {
                println!("{}", client_line(&s, &client));
            }
        }
    }

    if output::is_json() {
        output::print_json(&serde_json::Value::Array(rows));
    } else if !output::is_quiet() {
        eprintln!();
        eprintln!("  {} {count} network(s) in {}", s.ok_sym(), path.display());
    }
    Ok(())
}

/// Privacy of a network across all its SSID announcements.
fn privacy(network: &WirelessNetwork) -> Privacy {
    let wpa_version = network
        .ssid_records
        .iter()
        .rev()
        .find_map(|ssid| ssid.wpa_version.as_deref());
    Security::classify(&network.encryption(), wpa_version).privacy
}

fn essid(network: &WirelessNetwork) -> String {
    match network.latest_ssid() {
        Some(ssid) => match &ssid.essid {
            Some(name) => name.clone(),
            None if ssid.is_cloaked() => "<cloaked>".to_string(),
            None => String::new(),
        },
        None => String::new(),
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn network_line(s: &Styled, network: &WirelessNetwork) -> String {
    let privacy = privacy(network);
    let label = format!("{:<10}", privacy.to_string());
    let label = match privacy {
        Privacy::Open => s.red(&label),
        Privacy::Wep => s.yellow(&label),
        Privacy::Wpa(_) => s.green(&label),
        Privacy::Unknown => s.dim(&label),
    };
    format!(
        "{:>4}  {}  ch{:<3}  {} {}",
        or_dash(network.number),
        s.cyan(&network.bssid.to_string()),
        or_dash(network.channel),
        label,
        essid(network)
    )
}

fn client_line(s: &Styled, client: &AssociatedClient<'_>) -> String {
    let kind = client.client_type.as_ref().map(|t| t.to_string());
    format!(
        "        {}  {:<12} {}",
        client.mac,
        or_dash(kind),
        s.dim(client.manuf.as_deref().unwrap_or(""))
    )
    .trim_end()
    .to_string()
}

fn network_json(network: &WirelessNetwork, clients: bool) -> serde_json::Value {
    let mut row = serde_json::json!({
        "number": network.number,
        "bssid": network.bssid,
        "channel": network.channel,
        "essid": network.latest_ssid().and_then(|ssid| ssid.essid.as_deref()),
        "privacy": privacy(network).to_string(),
    });
    if clients {
        row["clients"] = network
            .clients()
            .map(|client| {
                serde_json::json!({
                    "mac": client.mac,
                    "type": client.client_type,
                    "manuf": client.manuf,
                    "network": client.network_bssid(),
                })
            })
            .collect();
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::{assert_json_eq, assert_json_include};
    use netxml::NetXmlDocument;
    use serde_json::json;

    const SAMPLE: &str = include_str!("../../../netxml/tests/fixtures/kismet-sample.netxml");

    fn sample() -> NetXmlDocument {
        NetXmlDocument::parse(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_network_lines() {
        let document = sample();
        let s = Styled::plain();
        let lines: Vec<_> = document
            .networks()
            .iter()
            .map(|n| network_line(&s, n))
            .collect();
        assert_eq!(lines[0], "   1  00:1A:2B:3C:4D:5E  ch6    WPA2       HomeNet-5G");
        assert_eq!(lines[1], "   2  C8:3A:35:00:AB:CD  ch11   WEP        Cafe Corner");
        assert_eq!(lines[2].trim_end(), "   3  E0:CB:4E:77:88:99  ch0    UNKNOWN");
    }

    #[test]
    fn test_client_lines() {
        let document = sample();
        let s = Styled::plain();
        let lines: Vec<_> = document.clients().map(|c| client_line(&s, &c)).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "        A4:5E:60:11:22:33  established  Apple");
        assert_eq!(lines[2], "        E0:CB:4E:77:88:99  probe        Asustek");
    }

    #[test]
    fn test_network_json() {
        let document = sample();
        assert_json_eq!(
            network_json(&document.networks[1], false),
            json!({
                "number": 2,
                "bssid": "C8:3A:35:00:AB:CD",
                "channel": 11,
                "essid": "Cafe Corner",
                "privacy": "WEP",
            })
        );
    }

    #[test]
    fn test_network_json_with_clients() {
        let document = sample();
        assert_json_include!(
            actual: network_json(&document.networks[0], true),
            expected: json!({
                "bssid": "00:1A:2B:3C:4D:5E",
                "privacy": "WPA2",
                "clients": [
                    { "mac": "A4:5E:60:11:22:33", "type": "established", "network": "00:1A:2B:3C:4D:5E" },
                    { "mac": "00:1A:2B:3C:4D:5E", "type": "fromds" },
                ],
            })
        );
    }

    #[test]
    fn test_cloaked_essid_placeholder() {
        let xml = r#"<wireless-network bssid="00:11:22:33:44:55">
  <SSID><essid cloaked="true"></essid></SSID>
</wireless-network>"#;
        let document = NetXmlDocument::parse(xml.as_bytes()).unwrap();
        assert_eq!(essid(&document.networks[0]), "<cloaked>");
    }
}
