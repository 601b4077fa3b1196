//! `netxml check`: parse a whole file and report what it holds.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use netxml::{iterparse_with, ParseOptions, ParsedDocument};
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Counts gathered from one parsed document.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub networks: usize,
    pub clients: usize,
    /// SSID records of networks plus the SSIDs their clients probed for.
    pub ssid_records: usize,
    pub card_sources: usize,
    pub warnings: usize,
    pub rejected: usize,
}

impl Report {
    pub fn from_parsed(parsed: &ParsedDocument) -> Self {
        let document = &parsed.document;
        let ssid_records = document
            .networks()
            .iter()
            .map(|network| {
                network.ssid_records.len()
                    + network
                        .clients
                        .iter()
                        .map(|client| client.ssid_records.len())
                        .sum::<usize>()
            })
            .sum();
        Self {
            networks: document.len(),
            clients: document.clients().count(),
            ssid_records,
            card_sources: document.header.card_sources.len(),
            warnings: parsed.warnings.len(),
            rejected: parsed.rejected.len(),
        }
    }
}

/// Parse `path` to the end and print a summary.
pub fn run(path: &Path, options: ParseOptions) -> Result<()> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("cannot open {}", path.display()))?
        .len();
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let parsed = iterparse_with(file, options)
        .into_document()
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let report = Report::from_parsed(&parsed);

    if output::is_json() {
        output::print_json(&report_json(&report, &parsed));
        return Ok(());
    }
    if output::is_quiet() {
        return Ok(());
    }

    let s = Styled::new();
    output::print_header(&s);
    output::print_section(&s, &format!("{} ({})", path.display(), output::format_size(size)));
    if let Some(version) = &parsed.document.header.kismet_version {
        output::print_check(s.ok_sym(), "Kismet:", version);
    }
    output::print_check(s.ok_sym(), "Networks:", &report.networks.to_string());
    output::print_check(s.ok_sym(), "Clients:", &report.clients.to_string());
    output::print_check(s.ok_sym(), "SSID records:", &report.ssid_records.to_string());
    output::print_check(s.ok_sym(), "Card sources:", &report.card_sources.to_string());

    let warn = if report.warnings == 0 { s.ok_sym() } else { s.warn_sym() };
    output::print_check(warn, "Warnings:", &report.warnings.to_string());
    if output::is_verbose() {
        for warning in &parsed.warnings {
            output::print_detail(&warning.to_string());
        }
    }

    let rejected = if report.rejected == 0 { s.ok_sym() } else { s.fail_sym() };
    output::print_check(rejected, "Rejected:", &report.rejected.to_string());
    for error in &parsed.rejected {
        output::print_detail(&error.to_string());
    }

    let (status, msg) = match (report.warnings, report.rejected) {
        (0, 0) => (s.green("clean"), "every element understood".to_string()),
        (w, 0) => (s.yellow("warnings"), format!("{w} element(s) kept verbatim")),
        (_, r) => (s.red("incomplete"), format!("{r} element(s) skipped")),
    };
    output::print_status(&s, &status, &msg);
    Ok(())
}

fn report_json(report: &Report, parsed: &ParsedDocument) -> serde_json::Value {
    let mut value = serde_json::to_value(report).unwrap_or_default();
    value["kismet_version"] = serde_json::json!(parsed.document.header.kismet_version);
    value["warning_details"] = serde_json::json!(parsed.warnings);
    value["rejected_details"] = parsed
        .rejected
        .iter()
        .map(|error| {
            serde_json::json!({
                "element": error.element(),
                "position": error.position(),
                "message": error.to_string(),
            })
        })
        .collect();
    value
}
