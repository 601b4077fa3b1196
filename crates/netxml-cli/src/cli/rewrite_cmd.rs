//! `netxml rewrite`: parse a file and write it back out canonically.

use crate::cli::output::{self, Styled};
use anyhow::{Context, Result};
use netxml::{iterparse_with, write_document, NetXmlDocument, ParseOptions};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rewrite `input` to `out`, or to stdout when no output path is given.
pub fn run(input: &Path, out: Option<&Path>, options: ParseOptions) -> Result<()> {
    let file = File::open(input).with_context(|| format!("cannot open {}", input.display()))?;
    let parsed = iterparse_with(file, options)
        .into_document()
        .with_context(|| format!("failed to parse {}", input.display()))?;

    match out {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
            rewrite(&parsed.document, BufWriter::new(file))
                .with_context(|| format!("failed to write {}", path.display()))?;

            if output::is_json() {
                output::print_json(&serde_json::json!({
                    "input": input.display().to_string(),
                    "output": path.display().to_string(),
                    "networks": parsed.document.len(),
                    "rejected": parsed.rejected.len(),
                }));
            } else if !output::is_quiet() {
                let s = Styled::new();
                eprintln!(
                    "  {} Wrote {} network(s) to {}",
                    s.ok_sym(),
                    parsed.document.len(),
                    path.display()
                );
            }
        }
        None => {
            let stdout = std::io::stdout();
            rewrite(&parsed.document, stdout.lock()).context("failed to write to stdout")?;
        }
    }

    if !parsed.rejected.is_empty() && !output::is_quiet() && !output::is_json() {
        let s = Styled::new();
        eprintln!(
            "  {} {} invalid element(s) were left out",
            s.warn_sym(),
            parsed.rejected.len()
        );
    }
    Ok(())
}

fn rewrite<W: Write>(document: &NetXmlDocument, mut writer: W) -> Result<()> {
    write_document(&mut writer, document)?;
    writer.flush()?;
    Ok(())
}
