//! Classify command - show where sector labels land in the IPCC taxonomy.

use std::io::{self, BufRead, Write};

use clap::Args;
use emitscope::taxonomy::{Classification, Classifier};
use serde_json::json;

use super::common::OutputFormat;
use crate::error::CliError;

/// Arguments for the classify command.
#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Sector labels, e.g. road-transportation; read from stdin when omitted
    pub labels: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Run the classify command.
pub fn run(args: ClassifyArgs) -> Result<(), CliError> {
    let labels = if args.labels.is_empty() {
        read_labels(io::stdin().lock())?
    } else {
        args.labels
    };
    if labels.is_empty() {
        return Err(CliError::Config(
            "No labels given. Pass labels as arguments or on stdin.".to_string(),
        ));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_classifications(&mut out, &labels, args.format)
}

fn read_labels<R: BufRead>(input: R) -> Result<Vec<String>, CliError> {
    let mut labels = Vec::new();
    for line in input.lines() {
        let line = line?;
        let label = line.trim();
        if !label.is_empty() {
            labels.push(label.to_string());
        }
    }
    Ok(labels)
}

fn write_classifications<W: Write>(
    out: &mut W,
    labels: &[String],
    format: OutputFormat,
) -> Result<(), CliError> {
    let mut classifier = Classifier::new();
    let rows: Vec<(&str, Classification)> = labels
        .iter()
        .map(|label| (label.as_str(), classifier.classify(label)))
        .collect();

    match format {
        OutputFormat::Json => {
            let values: Vec<_> = rows
                .iter()
                .map(|(label, c)| {
                    json!({
                        "label": label,
                        "sector": c.node.sector.code(),
                        "sector_name": c.node.sector.name(),
                        "ipcc_code": c.node.subsector,
                        "group_code": c.node.group,
                        "name": c.node.name,
                        "tier": c.node.tier,
                        "source": c.node.source,
                        "flags": c.flags,
                    })
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &values)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for (label, c) in &rows {
                writeln!(
                    out,
                    "{:<36} {:<10} {}{}",
                    label,
                    c.node.subsector.unwrap_or(c.node.sector.code()),
                    c.node.name,
                    flag_suffix(c)
                )?;
            }
            let unmapped = classifier.unmapped();
            if !unmapped.is_empty() {
                writeln!(out)?;
                writeln!(out, "{} label(s) matched no rule", unmapped.len())?;
            }
        }
    }
    Ok(())
}

fn flag_suffix(c: &Classification) -> &'static str {
    if c.flags.is_international_bunker {
        " [memo: international bunker]"
    } else if c.flags.is_stock_change {
        " [stock change]"
    } else if c.flags.is_residual_category {
        " [unmapped]"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(labels: &[&str], format: OutputFormat) -> String {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let mut out = Vec::new();
        write_classifications(&mut out, &labels, format).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_output_marks_scope_flags() {
        let text = render(
            &["road-transportation", "international-shipping", "mystery"],
            OutputFormat::Text,
        );
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].contains("1.A.3.b"));
        assert!(lines[1].ends_with("[memo: international bunker]"));
        assert!(lines[2].ends_with("[unmapped]"));
        assert!(text.contains("1 label(s) matched no rule"));
    }

    #[test]
    fn test_json_output() {
        let text = render(&["cement"], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["ipcc_code"], "2.A.1");
        assert_eq!(value[0]["sector"], "2");
        assert_eq!(value[0]["flags"]["included_in_total"], true);
    }

    #[test]
    fn test_read_labels_skips_blank_lines() {
        let input = io::Cursor::new("cement\n\n  rice-cultivation \n");
        let labels = read_labels(input).unwrap();
        assert_eq!(labels, vec!["cement", "rice-cultivation"]);
    }
}
