//! Inventory command - build a region's emissions inventory.

use std::io::{self, IsTerminal, Write};

use clap::Args;
use console::style;
use emitscope::inventory::{InventoryResult, SubsectorTotal};
use emitscope::query::RawQuery;

use super::common::{resolve_api, resolve_service, OutputFormat, Overrides};
use crate::error::CliError;
use crate::progress::SpinnerReporter;
use crate::runner::CliRunner;

/// Arguments for the inventory command.
#[derive(Debug, Args)]
pub struct InventoryArgs {
    /// Region name, e.g. "Misiones"
    pub region: Option<String>,

    /// Admin unit identifier (e.g. ARG.14_1); used instead of the name
    #[arg(long)]
    pub admin_id: Option<String>,

    /// Admin level: province or department
    #[arg(long)]
    pub level: Option<String>,

    /// Inventory year (defaults to last year)
    #[arg(long)]
    pub year: Option<String>,

    /// Gas: co2, ch4, n2o, co2e_100yr or co2e_20yr
    #[arg(long)]
    pub gas: Option<String>,

    /// Inventory scope: ipcc or extended
    #[arg(long)]
    pub scope: Option<String>,

    /// ISO3 country whose assets are listed
    #[arg(long)]
    pub country: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Records requested per page
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Stop after this many in-region records
    #[arg(long)]
    pub max_assets: Option<usize>,

    /// Collection timeout in seconds (0 disables)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Remove the page and record limits
    #[arg(long)]
    pub unlimited: bool,

    /// Count international bunkers in the extended scope
    #[arg(long)]
    pub include_bunkers: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Hide the progress spinner
    #[arg(long, short)]
    pub quiet: bool,
}

impl InventoryArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            base_url: self.base_url.clone(),
            country: self.country.clone(),
            page_size: self.page_size,
            max_pages: self.max_pages,
            max_assets: self.max_assets,
            timeout: self.timeout,
            unlimited: self.unlimited,
            include_bunkers: self.include_bunkers,
        }
    }

    fn raw_query(&self) -> RawQuery<'_> {
        RawQuery {
            name: self.region.as_deref(),
            admin_id: self.admin_id.as_deref(),
            level: self.level.as_deref(),
            year: self.year.as_deref(),
            gas: self.gas.as_deref(),
            scope: self.scope.as_deref(),
        }
    }
}

/// Run the inventory command.
pub fn run(args: InventoryArgs, log_level: Option<String>) -> Result<(), CliError> {
    let runner = CliRunner::new(log_level)?;
    runner.log_startup("inventory");

    let overrides = args.overrides();
    let api = resolve_api(&overrides, runner.config());
    let service_config = resolve_service(&overrides, runner.config());
    let service = runner.create_service(api, service_config)?;
    let cancel = runner.cancel_on_ctrl_c()?;

    let show_progress = !args.quiet && io::stderr().is_terminal();
    let reporter = SpinnerReporter::new(show_progress);
    let result = runner.block_on(service.run_raw(&args.raw_query(), &cancel, &reporter));
    reporter.finish();
    let result = result?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &result)?;
            writeln!(out)?;
        }
        OutputFormat::Text => write_report(&mut out, &result)?,
    }
    Ok(())
}

/// Write the human-readable report.
pub fn write_report<W: Write>(out: &mut W, result: &InventoryResult) -> io::Result<()> {
    let region = &result.region;
    writeln!(
        out,
        "{}",
        style(format!("{} ({} {})", region.full_name, region.level, region.admin_id)).bold()
    )?;
    writeln!(
        out,
        "Year {} | {} | scope {}",
        result.year,
        result.unit,
        result.scope
    )?;
    writeln!(out, "{}", result.metadata.scope_description)?;
    writeln!(out)?;

    writeln!(out, "{:<12} {:<48} {:>18} {:>7}", "Code", "Category", "Total", "Share")?;
    for sector in &result.sectors {
        writeln!(
            out,
            "{}",
            style(format!(
                "{:<12} {:<48} {:>18} {:>7}",
                sector.ipcc_code,
                sector.name,
                format_quantity(sector.total),
                format_share(sector.share)
            ))
            .bold()
        )?;
        for sub in &sector.subsectors {
            write_subsector(out, sub)?;
        }
    }
    writeln!(
        out,
        "{:<12} {:<48} {:>18}",
        "",
        "Total",
        format_quantity(result.total)
    )?;

    if !result.memo_items.is_empty() {
        writeln!(out)?;
        writeln!(out, "Memo items (international bunkers)")?;
        for item in &result.memo_items {
            write_subsector(out, item)?;
        }
    }

    if !result.stock_change.is_empty() {
        writeln!(out)?;
        writeln!(out, "Carbon stock change (not in totals)")?;
        for item in &result.stock_change {
            write_subsector(out, item)?;
        }
        let afolu = &result.afolu;
        writeln!(out)?;
        writeln!(
            out,
            "AFOLU: gross {} | stock change {} | net {}",
            format_quantity(afolu.gross_emissions),
            format_quantity(afolu.net_stock_change),
            format_quantity(afolu.net)
        )?;
    }

    let report = &result.diagnostics.collection;
    writeln!(out)?;
    writeln!(
        out,
        "Pages {} | scanned {} | in region {} | aggregated {} | {} ms",
        report.pages_fetched,
        report.assets_scanned,
        report.in_region,
        report.aggregated,
        report.elapsed_ms
    )?;
    if report.swapped_coordinates > 0 || report.dropped_coordinates > 0 {
        writeln!(
            out,
            "Coordinates: {} swapped, {} unusable",
            report.swapped_coordinates, report.dropped_coordinates
        )?;
    }
    if let Some(reason) = report.stopped_by {
        writeln!(
            out,
            "{}",
            style(format!(
                "Partial result: collection stopped by {} limit",
                reason
            ))
            .yellow()
        )?;
    }
    if !result.diagnostics.unmapped_sectors.is_empty() {
        writeln!(
            out,
            "Unmapped sectors: {}",
            result.diagnostics.unmapped_sectors.join(", ")
        )?;
    }
    Ok(())
}

fn write_subsector<W: Write>(out: &mut W, sub: &SubsectorTotal) -> io::Result<()> {
    writeln!(
        out,
        "  {:<10} {:<48} {:>18} {:>7}",
        sub.ipcc_code.unwrap_or("-"),
        sub.name,
        format_quantity(sub.total),
        format_share(sub.share)
    )
}

/// Quantity with thousands separators and one decimal.
pub fn format_quantity(value: f64) -> String {
    let formatted = format!("{:.1}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "0"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.0" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

fn format_share(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}
